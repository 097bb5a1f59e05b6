// src/wiki/models.rs
use serde::{Deserialize, Serialize};
use crate::extractors::NominationRecord;

/// Stored per-film document: `{year, name, plot, wiki}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub year: Option<String>,
    pub name: String,
    #[serde(default)]
    pub plot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
}

impl MovieRecord {
    pub fn from_nomination(nomination: &NominationRecord, plot: String) -> Self {
        Self {
            year: nomination.year.clone(),
            name: nomination.title.clone(),
            plot,
            wiki: Some(nomination.url.clone()),
        }
    }
}

/// Rewritten plot stored next to the original record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedPlot {
    pub obfuscated_plot: String,
}

/// Summary of one scrape run, written as `scrape_report.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub generated_at: String,
    pub nominations: usize,
    pub processed: usize,
    pub skipped: usize,
    pub no_plot_found: Vec<NominationRecord>,
}
