// src/wiki/mod.rs
pub mod client;
pub mod models;

pub use client::WikiClient;
pub use models::{AnonymizedPlot, MovieRecord, ScrapeReport};
