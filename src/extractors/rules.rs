// src/extractors/rules.rs
//! Named heuristics used by the extractors.
//!
//! Each rule is a plain predicate so it can be tested on its own. Block rules
//! are evaluated in order and the first one that applies decides whether a
//! table is scanned, skipped, or ends the whole scan.

use scraper::ElementRef;
use crate::extractors::text::{has_class, raw_text};

/// Phrases marking the switch from nomination tables to summary statistics.
pub const STOP_PHRASES: &[&str] = &[
    "Production companies and distributors with multiple nominations and wins",
    "production company",
    "distributor",
];

/// Number of preceding siblings inspected for stop phrases.
pub const CONTEXT_SIBLINGS: usize = 3;

pub const ARTICLE_PREFIX: &str = "/wiki/";
pub const HEADING_WRAPPER_CLASS: &str = "mw-heading";

// --- Block classification ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockVerdict {
    /// Scan the table's rows.
    Accept,
    /// Ignore this table, keep scanning later ones.
    Skip,
    /// Summary content reached; no later table is scanned.
    Stop,
}

/// Lowercased text surrounding a candidate table.
#[derive(Debug, Clone, Default)]
pub struct BlockContext {
    pub preceding: Vec<String>,
    pub caption: Option<String>,
    pub first_row: Option<String>,
}

pub struct BlockRule {
    pub name: &'static str,
    pub verdict: BlockVerdict,
    pub applies: fn(&BlockContext) -> bool,
}

pub static BLOCK_RULES: &[BlockRule] = &[
    BlockRule { name: "preceding-stop-phrase", verdict: BlockVerdict::Stop, applies: preceding_has_stop_phrase },
    BlockRule { name: "caption-stop-phrase", verdict: BlockVerdict::Stop, applies: caption_has_stop_phrase },
    BlockRule { name: "first-row-stop-phrase", verdict: BlockVerdict::Stop, applies: first_row_has_stop_phrase },
    BlockRule { name: "tally-header", verdict: BlockVerdict::Skip, applies: first_row_is_tally_header },
];

/// Returns the verdict of the first applicable rule, with its name.
pub fn classify_block(ctx: &BlockContext) -> (BlockVerdict, Option<&'static str>) {
    BLOCK_RULES
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .map(|rule| (rule.verdict, Some(rule.name)))
        .unwrap_or((BlockVerdict::Accept, None))
}

pub fn contains_stop_phrase(lowered: &str) -> bool {
    STOP_PHRASES
        .iter()
        .any(|phrase| lowered.contains(&phrase.to_lowercase()))
}

pub fn preceding_has_stop_phrase(ctx: &BlockContext) -> bool {
    ctx.preceding.iter().any(|text| contains_stop_phrase(text))
}

pub fn caption_has_stop_phrase(ctx: &BlockContext) -> bool {
    ctx.caption.as_deref().is_some_and(contains_stop_phrase)
}

pub fn first_row_has_stop_phrase(ctx: &BlockContext) -> bool {
    ctx.first_row.as_deref().is_some_and(contains_stop_phrase)
}

/// A header row counting both nominations and wins belongs to an aggregate table.
pub fn first_row_is_tally_header(ctx: &BlockContext) -> bool {
    ctx.first_row
        .as_deref()
        .is_some_and(|row| row.contains("nominations") && row.contains("wins"))
}

// --- Row and cell heuristics ---

/// Year carried by a header cell: the first four digits of its first line.
/// Only ASCII digits count; the source tables never use other numerals.
pub fn header_year(text: &str) -> Option<String> {
    let first_line = text.split('\n').next().unwrap_or_default();
    let digits: String = first_line.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 4 {
        Some(digits[..4].to_string())
    } else {
        None
    }
}

/// True for cells like `1995`, `1927/28` or `(1995)`. ASCII digits only.
pub fn is_year_marker(text: &str) -> bool {
    let rest: String = text.chars().filter(|c| !matches!(c, '/' | '(' | ')')).collect();
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Index of the data cell holding the film, given the row's cell count and first cell text.
///
/// Only rows with two or more cells can lead with a year column; a lone cell is always the film.
pub fn film_cell_index(cell_count: usize, first_cell_text: &str) -> Option<usize> {
    match cell_count {
        0 => None,
        1 => Some(0),
        _ if is_year_marker(first_cell_text) => Some(1),
        _ => Some(0),
    }
}

// --- Link filtering ---

pub struct LinkRule {
    pub name: &'static str,
    pub rejects: fn(&str) -> bool,
}

pub static LINK_RULES: &[LinkRule] = &[
    LinkRule { name: "empty-href", rejects: is_empty_href },
    LinkRule { name: "off-article-path", rejects: is_off_article_path },
    LinkRule { name: "namespaced-page", rejects: is_namespaced },
];

/// Name of the first rule rejecting `href`, or `None` for a plain article link.
pub fn link_rejection(href: &str) -> Option<&'static str> {
    LINK_RULES.iter().find(|rule| (rule.rejects)(href)).map(|rule| rule.name)
}

fn is_empty_href(href: &str) -> bool {
    href.is_empty()
}

fn is_off_article_path(href: &str) -> bool {
    !href.starts_with(ARTICLE_PREFIX)
}

// Category:, Talk:, File: and friends
fn is_namespaced(href: &str) -> bool {
    href.contains(':')
}

// --- Section headings ---

pub fn is_heading_wrapper(el: ElementRef) -> bool {
    el.value().name() == "div" && has_class(el, HEADING_WRAPPER_CLASS)
}

/// A heading wrapper or bare h2/h3 whose text contains `label_lower`.
pub fn is_matching_heading(el: ElementRef, label_lower: &str) -> bool {
    let is_heading = is_heading_wrapper(el) || matches!(el.value().name(), "h2" | "h3");
    is_heading && raw_text(el).to_lowercase().contains(label_lower)
}

/// Start of the next top-level section.
pub fn is_section_boundary(el: ElementRef) -> bool {
    match el.value().name() {
        "h2" => true,
        "div" if is_heading_wrapper(el) => el
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|d| d.value().name() == "h2"),
        _ => false,
    }
}
