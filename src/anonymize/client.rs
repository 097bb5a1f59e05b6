// src/anonymize/client.rs
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::anonymize::PlotRewriter;
use crate::utils::error::AnonymizeError;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Asks the Messages API to strip identifying details from a plot.
pub struct AnthropicRewriter {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicRewriter {
    pub fn new(api_key: String, model: String) -> Result<Self, AnonymizeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self { http, api_key, model, max_tokens: DEFAULT_MAX_TOKENS })
    }
}

impl PlotRewriter for AnthropicRewriter {
    async fn rewrite(&self, plot: &str) -> Result<String, AnonymizeError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message { role: "user", content: build_prompt(plot) }],
        };

        let response = self.http.post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnonymizeError::Http(status, body));
        }

        let parsed: MessagesResponse = response.json().await?;
        first_text(parsed)
    }
}

fn first_text(response: MessagesResponse) -> Result<String, AnonymizeError> {
    let text = response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| AnonymizeError::MalformedResponse("no text content block".to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AnonymizeError::EmptyRewrite);
    }
    Ok(text.to_string())
}

pub fn build_prompt(plot: &str) -> String {
    format!(
        "Please rewrite the following movie plot by removing all unique proper nouns and identifying features, but keep the general plotline the same.

Rules:
- Replace character names with generic pseudonyms (e.g., \"John\", \"Sarah\", \"Detective Smith\")
- Replace specific place names with generic descriptions (e.g., \"Paris\" → \"a European city\", \"New York\" → \"a large city\")
- Keep time periods, general settings, and occupations/roles as long as they're generic enough
- Preserve the story structure and key plot points
- Do NOT mention the movie title or any uniquely identifying details
- Keep it natural and readable
- Only put the obfuscated plot, do not put any other text into the output as we use it in JSON later

Original plot:
{plot}

Obfuscated plot:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_plot() {
        let prompt = build_prompt("Rick runs a bar in Casablanca.");
        assert!(prompt.contains("Original plot:\nRick runs a bar in Casablanca.\n"));
        assert!(prompt.ends_with("Obfuscated plot:"));
    }

    #[test]
    fn first_text_block_is_trimmed() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "  A man runs a bar.\n"}]}"#,
        ).unwrap();
        assert_eq!(first_text(response).unwrap(), "A man runs a bar.");
    }

    #[test]
    fn empty_or_missing_text_is_an_error() {
        let empty: MessagesResponse = serde_json::from_str(r#"{"content": [{"text": "   "}]}"#).unwrap();
        assert!(matches!(first_text(empty), Err(AnonymizeError::EmptyRewrite)));

        let none: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(first_text(none), Err(AnonymizeError::MalformedResponse(_))));
    }
}
