// src/anonymize/mod.rs
//! Rewrites stored plots so they no longer name people or places.

pub mod client;

use std::path::{Path, PathBuf};
use futures::stream::{self, StreamExt};
use crate::storage::StorageManager;
use crate::utils::error::{AnonymizeError, StorageError};
use crate::wiki::AnonymizedPlot;

pub use client::AnthropicRewriter;

pub const DEFAULT_WORKERS: usize = 10;

/// Turns plot text into an anonymized version.
#[allow(async_fn_in_trait)]
pub trait PlotRewriter {
    async fn rewrite(&self, plot: &str) -> Result<String, AnonymizeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Rewritten,
    Skipped, // output already exists
    NoPlot,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct AnonymizeSummary {
    pub rewritten: usize,
    pub skipped: usize,
    pub no_plot: usize,
    pub errors: Vec<String>,
}

/// Rewrites every stored plot that has no anonymized counterpart yet,
/// with at most `workers` requests in flight. Per-file failures are collected, not returned.
pub async fn anonymize_all<R: PlotRewriter>(
    storage: &StorageManager,
    rewriter: &R,
    workers: usize,
) -> Result<AnonymizeSummary, StorageError> {
    let files = storage.list_movie_files()?;
    let total = files.len();
    tracing::info!("Found {} JSON files to process using {} parallel workers", total, workers);

    let mut results = stream::iter(files)
        .map(|file| async move {
            let outcome = process_file(storage, rewriter, &file).await;
            (file, outcome)
        })
        .buffer_unordered(workers.max(1));

    let mut summary = AnonymizeSummary::default();
    let mut done = 0;
    while let Some((file, outcome)) = results.next().await {
        done += 1;
        let name = display_name(&file);
        match outcome {
            FileOutcome::Rewritten => {
                tracing::info!("[{}/{}] Processed {}", done, total, name);
                summary.rewritten += 1;
            }
            FileOutcome::Skipped => {
                tracing::info!("[{}/{}] Skipped {} (already exists)", done, total, name);
                summary.skipped += 1;
            }
            FileOutcome::NoPlot => {
                tracing::warn!("[{}/{}] Skipped {} (no plot)", done, total, name);
                summary.no_plot += 1;
            }
            FileOutcome::Failed(message) => {
                let message = format!("Error processing {}: {}", name, message);
                tracing::error!("[{}/{}] {}", done, total, message);
                summary.errors.push(message);
            }
        }
    }

    tracing::info!("Done! Processed {} files, skipped {} files", summary.rewritten, summary.skipped);
    if !summary.errors.is_empty() {
        tracing::warn!("Encountered {} errors", summary.errors.len());
    }
    Ok(summary)
}

/// Rewrites one movie file's plot into the anonymized directory.
pub async fn process_file<R: PlotRewriter>(storage: &StorageManager, rewriter: &R, file: &Path) -> FileOutcome {
    if storage.anonymized_path(file).exists() {
        return FileOutcome::Skipped;
    }

    let movie = match storage.load_movie(file) {
        Ok(movie) => movie,
        Err(e) => return FileOutcome::Failed(e.to_string()),
    };
    if movie.plot.trim().is_empty() {
        return FileOutcome::NoPlot;
    }

    let result = async {
        let obfuscated_plot = rewriter.rewrite(&movie.plot).await?;
        storage.save_anonymized(file, &AnonymizedPlot { obfuscated_plot })?;
        Ok::<PathBuf, AnonymizeError>(storage.anonymized_path(file))
    }
    .await;

    match result {
        Ok(path) => {
            tracing::debug!("Wrote {}", path.display());
            FileOutcome::Rewritten
        }
        Err(e) => FileOutcome::Failed(e.to_string()),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::extractors::NominationRecord;
    use crate::wiki::MovieRecord;

    struct UppercaseRewriter {
        calls: AtomicUsize,
    }

    impl PlotRewriter for UppercaseRewriter {
        async fn rewrite(&self, plot: &str) -> Result<String, AnonymizeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if plot.contains("fail") {
                return Err(AnonymizeError::EmptyRewrite);
            }
            Ok(plot.to_uppercase())
        }
    }

    fn save(storage: &StorageManager, title: &str, plot: &str) -> PathBuf {
        let nomination = NominationRecord {
            year: Some("2001".into()),
            title: title.into(),
            url: format!("https://en.wikipedia.org/wiki/{}", title),
        };
        storage.save_movie(&MovieRecord::from_nomination(&nomination, plot.into())).unwrap()
    }

    #[test]
    fn rewrites_pending_plots_and_reports_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("movies"), dir.path().join("anon")).unwrap();

        let a = save(&storage, "Alpha", "a plot");
        let done = save(&storage, "Done", "old");
        save(&storage, "Empty", "  ");
        save(&storage, "Broken", "will fail");
        fs::create_dir_all(dir.path().join("anon")).unwrap();
        fs::write(storage.anonymized_path(&done), r#"{"obfuscated_plot": "kept"}"#).unwrap();

        let rewriter = UppercaseRewriter { calls: AtomicUsize::new(0) };
        let summary = tokio_test::block_on(anonymize_all(&storage, &rewriter, 2)).unwrap();

        assert_eq!(summary.rewritten, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.no_plot, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(rewriter.calls.load(Ordering::SeqCst), 2);

        let written: AnonymizedPlot =
            serde_json::from_str(&fs::read_to_string(storage.anonymized_path(&a)).unwrap()).unwrap();
        assert_eq!(written.obfuscated_plot, "A PLOT");
        let kept = fs::read_to_string(storage.anonymized_path(&done)).unwrap();
        assert!(kept.contains("kept"));
    }
}
