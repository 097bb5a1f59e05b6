// src/extractors/text.rs
//! Text access over `scraper` elements.

use scraper::node::Node;
use scraper::ElementRef;

// Elements whose text never renders
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript"];

/// Text nodes under `el` in document order, skipping script/style content.
pub fn text_pieces<'a>(el: ElementRef<'a>) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    push_pieces(el, &mut pieces);
    pieces
}

fn push_pieces<'a>(el: ElementRef<'a>, pieces: &mut Vec<&'a str>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => pieces.push(&**text),
            Node::Element(element) if INVISIBLE_TAGS.contains(&element.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_pieces(child_el, pieces);
                }
            }
            _ => {}
        }
    }
}

/// All visible text of `el`, unmodified.
pub fn raw_text(el: ElementRef) -> String {
    text_pieces(el).concat()
}

/// Visible text with every text node trimmed, empty nodes dropped and the rest joined by `sep`.
pub fn stripped_text(el: ElementRef, sep: &str) -> String {
    text_pieces(el)
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn has_class(el: ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}
