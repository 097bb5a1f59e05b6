// src/utils/html_debug.rs
use std::fs;
use std::path::Path;
use regex::Regex;
use crate::extractors::rules::STOP_PHRASES;
use crate::utils::error::AppError;

/// Patterns highlighted in annotated pages: stop phrases, data tables and heading wrappers.
pub fn debug_patterns() -> Vec<(String, &'static str)> {
    let mut patterns: Vec<(String, &'static str)> = STOP_PHRASES
        .iter()
        .map(|phrase| (format!("(?i){}", regex::escape(phrase)), "stop"))
        .collect();
    patterns.push((r#"(?i)<table[^>]*class="[^"]*wikitable[^"]*"[^>]*>"#.to_string(), "table"));
    patterns.push((r#"(?i)<div[^>]*class="[^"]*mw-heading[^"]*"[^>]*>"#.to_string(), "heading"));
    patterns.push((r"(?i)<h2[^>]*>".to_string(), "heading"));
    patterns
}

/// Wraps each highlight range of `html` in a styled span.
/// Ranges overlapping an earlier highlight are dropped.
pub fn annotate_html(html: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-stop { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-table { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-heading { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "stop" => "highlight-stop",
            "table" => "highlight-table",
            "heading" => "highlight-heading",
            _ => "highlight-custom",
        };
        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }
    debug_html.push_str(&html[last_pos..]);
    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Creates a debug version of an HTML document with locations of specified regex patterns highlighted
pub fn create_debug_html<P: AsRef<Path>>(html: &str, path: P, patterns: &[(String, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    let path = path.as_ref();
    fs::write(path, annotate_html(html, &highlights))?;
    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}
