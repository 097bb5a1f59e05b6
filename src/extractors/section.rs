// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::rules;
use crate::extractors::text::stripped_text;

// --- CSS Selectors (Lazy Static) ---
// Heading wrappers (current skin) and bare headings (older markup)
static HEADING_CANDIDATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div, h2, h3").expect("Failed to compile HEADING_CANDIDATE_SELECTOR")
});

/// Labels tried in order when looking for a film's story.
pub const PLOT_LABELS: &[&str] = &["Plot", "Synopsis"];

// --- Main Extractor Structure ---
pub struct SectionExtractor;

impl SectionExtractor {
    pub fn new() -> Self { Self {} }

    /// Returns the paragraphs of the section headed by `label`, joined by single spaces.
    ///
    /// `None` when no heading matches or the section holds no paragraph text.
    pub fn extract_section(&self, document: &Html, label: &str) -> Option<String> {
        let heading = self.find_heading(document, label)?;
        tracing::debug!("Found '{}' heading: <{}>", label, heading.value().name());

        let paragraphs = self.collect_paragraphs(heading);
        if paragraphs.is_empty() {
            tracing::debug!("'{}' heading has no paragraph text", label);
            return None;
        }
        Some(paragraphs.join(" "))
    }

    /// Tries each label in order; returns the first label that produced text, with the text.
    pub fn extract_first<'l>(&self, document: &Html, labels: &[&'l str]) -> Option<(&'l str, String)> {
        labels
            .iter()
            .find_map(|label| self.extract_section(document, label).map(|text| (*label, text)))
    }

    /// First heading wrapper or h2/h3 in document order whose text contains `label`.
    fn find_heading<'a>(&self, document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
        let label_lower = label.to_lowercase();
        document
            .select(&HEADING_CANDIDATE_SELECTOR)
            .find(|el| rules::is_matching_heading(*el, &label_lower))
    }

    /// Paragraph texts among the siblings after `heading`, up to the next top-level heading.
    /// Sub-headings are passed over.
    fn collect_paragraphs(&self, heading: ElementRef) -> Vec<String> {
        let mut paragraphs = Vec::new();

        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            if rules::is_section_boundary(sibling) {
                tracing::trace!("Section ends at <{}>", sibling.value().name());
                break;
            }
            if sibling.value().name() == "p" {
                let text = stripped_text(sibling, " ");
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        paragraphs
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const MODERN_PAGE: &str = r#"
        <!DOCTYPE html>
        <html><head><title>Film</title></head><body>
        <div class="mw-content-ltr mw-parser-output">
            <p>Film is a 1990 film.</p>
            <div class="mw-heading mw-heading2"><h2 id="Plot">Plot</h2><span class="mw-editsection">[edit]</span></div>
            <p>A soldier is posted to the <a href="/wiki/Frontier">frontier</a>.</p>
            <div class="mw-heading mw-heading3"><h3>Prologue</h3></div>
            <p>
               He befriends a wolf.
            </p>
            <p> </p>
            <figure><figcaption>Not a paragraph</figcaption></figure>
            <div class="mw-heading mw-heading2"><h2 id="Cast">Cast</h2></div>
            <p>Kevin Costner as Dunbar</p>
        </div>
        </body></html>
    "#;

    #[test]
    fn plot_stops_at_next_top_level_heading() {
        let doc = Html::parse_document(MODERN_PAGE);
        let plot = SectionExtractor::new().extract_section(&doc, "Plot");
        assert_eq!(
            plot.as_deref(),
            Some("A soldier is posted to the frontier . He befriends a wolf.")
        );
    }

    #[test]
    fn bare_h2_headings_delimit_sections() {
        let html = r#"<body>
            <h2><span>Synopsis</span></h2>
            <p>First.</p>
            <h3>Detail</h3>
            <p>Second.</p>
            <h2>Reception</h2>
            <p>Third.</p>
        </body>"#;
        let doc = Html::parse_document(html);
        let text = SectionExtractor::new().extract_section(&doc, "synopsis");
        assert_eq!(text.as_deref(), Some("First. Second."));
    }

    #[test]
    fn missing_label_is_none() {
        let doc = Html::parse_document(MODERN_PAGE);
        assert_eq!(SectionExtractor::new().extract_section(&doc, "Soundtrack"), None);
    }

    #[test]
    fn heading_without_paragraphs_is_none() {
        let html = r#"<body><div class="mw-heading mw-heading2"><h2>Plot</h2></div>
            <div class="mw-heading mw-heading2"><h2>Cast</h2></div><p>Someone</p></body>"#;
        let doc = Html::parse_document(html);
        assert_eq!(SectionExtractor::new().extract_section(&doc, "Plot"), None);
    }

    #[test]
    fn falls_back_to_next_label() {
        let html = r#"<body><div class="mw-heading mw-heading2"><h2>Synopsis</h2></div>
            <p>The story.</p></body>"#;
        let doc = Html::parse_document(html);
        let found = SectionExtractor::new().extract_first(&doc, PLOT_LABELS);
        assert_eq!(found, Some(("Synopsis", "The story.".to_string())));
    }

    #[test]
    fn empty_plot_section_falls_through_to_synopsis() {
        let html = r#"<body><h2>Plot</h2><h2>Synopsis</h2><p>Told briefly.</p></body>"#;
        let doc = Html::parse_document(html);
        let found = SectionExtractor::new().extract_first(&doc, PLOT_LABELS);
        assert_eq!(found.map(|(label, _)| label), Some("Synopsis"));
    }

    #[test]
    fn extraction_is_repeatable() {
        let doc = Html::parse_document(MODERN_PAGE);
        let extractor = SectionExtractor::new();
        assert_eq!(extractor.extract_section(&doc, "Plot"), extractor.extract_section(&doc, "Plot"));
    }
}
