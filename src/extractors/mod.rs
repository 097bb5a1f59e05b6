// src/extractors/mod.rs
pub mod nominations;
pub mod rules;
pub mod section;
pub mod text;

// Re-export key extraction types for convenience
pub use nominations::{NominationExtractor, NominationRecord};
pub use section::{SectionExtractor, PLOT_LABELS};
