// src/extractors/nominations.rs

// --- Imports ---
use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::extractors::rules::{self, BlockContext, BlockVerdict, CONTEXT_SIBLINGS};
use crate::extractors::text::{raw_text, stripped_text};

// --- CSS Selectors (Lazy Static) ---
// Nomination data lives in wikitable-styled tables; layout tables are ignored
static DATA_TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table.wikitable").expect("Failed to compile DATA_TABLE_SELECTOR")
});

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static HEADER_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("th").expect("Failed to compile HEADER_CELL_SELECTOR")
});

static DATA_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile DATA_CELL_SELECTOR")
});

static CAPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("caption").expect("Failed to compile CAPTION_SELECTOR")
});

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a").expect("Failed to compile LINK_SELECTOR")
});

// --- Data Structures ---
/// One nominated film as listed on the awards page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationRecord {
    pub year: Option<String>, // Ceremony year from the row-spanning header cell
    pub title: String,        // Link text of the film cell
    pub url: String,          // Absolute article URL
}

pub struct NominationExtractor {
    base_url: Url,
}

impl NominationExtractor {
    /// `base_url` resolves the site-relative article links found in film cells.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Scans every data table in document order and returns the nominations they list.
    ///
    /// A table whose surroundings carry a stop phrase ends the scan; later tables are never read.
    pub fn extract_nominations(&self, document: &Html) -> Vec<NominationRecord> {
        let mut records = Vec::new();
        let mut year: Option<String> = None;

        for (index, table) in document.select(&DATA_TABLE_SELECTOR).enumerate() {
            let context = block_context(table);
            match rules::classify_block(&context) {
                (BlockVerdict::Stop, rule) => {
                    tracing::info!("Stopping at table #{} ({}); summary section reached", index, rule.unwrap_or("?"));
                    break;
                }
                (BlockVerdict::Skip, rule) => {
                    tracing::debug!("Skipping table #{} ({})", index, rule.unwrap_or("?"));
                    continue;
                }
                (BlockVerdict::Accept, _) => {}
            }

            let before = records.len();
            year = self.scan_block(table, year, &mut records);
            tracing::debug!("Table #{} yielded {} nominations", index, records.len() - before);
        }

        tracing::info!("Extracted {} nominations", records.len());
        records
    }

    /// Folds the rows of one table, threading the current year through.
    /// Returns the year in effect after the last row.
    pub fn scan_block(
        &self,
        table: ElementRef,
        year: Option<String>,
        records: &mut Vec<NominationRecord>,
    ) -> Option<String> {
        table.select(&ROW_SELECTOR).fold(year, |year, row| {
            let (year, record) = self.scan_row(row, year);
            records.extend(record);
            year
        })
    }

    /// Reads one row: updates the year from a header cell, then looks for the film link.
    fn scan_row(&self, row: ElementRef, year: Option<String>) -> (Option<String>, Option<NominationRecord>) {
        let year = row
            .select(&HEADER_CELL_SELECTOR)
            .next()
            .and_then(|th| rules::header_year(&stripped_text(th, "")))
            .or(year);

        let cells: Vec<ElementRef> = row.select(&DATA_CELL_SELECTOR).collect();
        let first_text = cells.first().map(|c| stripped_text(*c, "")).unwrap_or_default();
        let Some(film_cell) = rules::film_cell_index(cells.len(), &first_text).map(|i| cells[i]) else {
            return (year, None);
        };

        let record = self.film_link(film_cell).map(|(title, url)| NominationRecord {
            year: year.clone(),
            title,
            url,
        });
        (year, record)
    }

    /// Title and absolute URL of the first link in the film cell, if it points at an article.
    fn film_link(&self, cell: ElementRef) -> Option<(String, String)> {
        let link = cell.select(&LINK_SELECTOR).next()?;
        let href = link.value().attr("href")?;

        if let Some(rule) = rules::link_rejection(href) {
            tracing::trace!("Rejected link '{}' ({})", href, rule);
            return None;
        }

        let title = stripped_text(link, "");
        if title.is_empty() {
            return None;
        }

        match self.base_url.join(href) {
            Ok(url) => Some((title, url.to_string())),
            Err(e) => {
                tracing::warn!("Could not resolve '{}' against {}: {}", href, self.base_url, e);
                None
            }
        }
    }
}

/// Collects the lowercased text around `table` used for the stop test.
fn block_context(table: ElementRef) -> BlockContext {
    let preceding = table
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .take(CONTEXT_SIBLINGS)
        .map(|el| raw_text(el).to_lowercase())
        .collect();
    let caption = table
        .select(&CAPTION_SELECTOR)
        .next()
        .map(|c| raw_text(c).to_lowercase());
    let first_row = table
        .select(&ROW_SELECTOR)
        .next()
        .map(|r| raw_text(r).to_lowercase());

    BlockContext { preceding, caption, first_row }
}
