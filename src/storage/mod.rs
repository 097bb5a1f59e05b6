// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use serde_json::{Map, Value};
use crate::extractors::NominationRecord;
use crate::utils::error::StorageError;
use crate::wiki::{AnonymizedPlot, MovieRecord, ScrapeReport};

pub const DEFAULT_MOVIES_DIR: &str = "movie_data";
pub const DEFAULT_ANONYMIZED_DIR: &str = "obfuscated_movie_plot";
pub const DEFAULT_COLLECTION_FILE: &str = "db.json";
const REPORT_FILE: &str = "scrape_report.json";

/// Result of merging per-film files into one collection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub merged: usize,
    pub missing: Vec<String>,    // movie files without an anonymized counterpart
    pub unreadable: Vec<String>, // pairs that could not be read or parsed
}

pub struct StorageManager {
    movies_dir: PathBuf,
    anonymized_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager, creating the records directory if it doesn't exist.
    /// The anonymized directory is created on first write.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(movies_dir: P, anonymized_dir: Q) -> Result<Self, StorageError> {
        let movies_dir = movies_dir.as_ref().to_path_buf();
        let anonymized_dir = anonymized_dir.as_ref().to_path_buf();
        fs::create_dir_all(&movies_dir)?;
        Ok(Self { movies_dir, anonymized_dir })
    }

    /// `<movies_dir>/<year>_<safe title>.json`
    pub fn movie_path(&self, title: &str, year: Option<&str>) -> PathBuf {
        self.movies_dir.join(movie_file_name(title, year))
    }

    /// Whether a record for this film was already written.
    pub fn is_scraped(&self, title: &str, year: Option<&str>) -> bool {
        self.movie_path(title, year).exists()
    }

    pub fn save_movie(&self, movie: &MovieRecord) -> Result<PathBuf, StorageError> {
        let path = self.movie_path(&movie.name, movie.year.as_deref());
        write_json(&path, movie)?;
        tracing::info!("Saved to {}", path.display());
        Ok(path)
    }

    pub fn load_movie(&self, path: &Path) -> Result<MovieRecord, StorageError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Adds the `wiki` link to existing records that lack one. Returns how many files changed.
    /// Files that cannot be read or rewritten are logged and left alone.
    pub fn backfill_wiki_links(&self, nominations: &[NominationRecord]) -> usize {
        let mut updated = 0;

        for nomination in nominations {
            let path = self.movie_path(&nomination.title, nomination.year.as_deref());
            if !path.exists() {
                continue;
            }

            match backfill_file(&path, &nomination.url) {
                Ok(true) => {
                    tracing::info!("Updated {}", path.display());
                    updated += 1;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Could not backfill {}: {}", path.display(), e),
            }
        }

        tracing::info!("Backfilled {} files with wiki links", updated);
        updated
    }

    /// Movie record files, sorted by file name.
    pub fn list_movie_files(&self) -> Result<Vec<PathBuf>, StorageError> {
        json_files_in(&self.movies_dir)
    }

    /// Anonymized counterpart of a movie file (same file name, other directory).
    pub fn anonymized_path(&self, movie_file: &Path) -> PathBuf {
        match movie_file.file_name() {
            Some(name) => self.anonymized_dir.join(name),
            None => self.anonymized_dir.join(movie_file),
        }
    }

    pub fn save_anonymized(&self, movie_file: &Path, plot: &AnonymizedPlot) -> Result<PathBuf, StorageError> {
        let path = self.anonymized_path(movie_file);
        write_json(&path, plot)?;
        Ok(path)
    }

    pub fn save_report(&self, report: &ScrapeReport) -> Result<PathBuf, StorageError> {
        let path = self.movies_dir.join(REPORT_FILE);
        write_json(&path, report)?;
        Ok(path)
    }

    /// Combines each movie file with its anonymized counterpart into one JSON array at `output`.
    /// Keys from the anonymized file win on conflict.
    pub fn merge_collection(&self, output: &Path) -> Result<MergeSummary, StorageError> {
        let mut movies = Vec::new();
        let mut summary = MergeSummary::default();

        for movie_file in self.list_movie_files()? {
            let file_name = movie_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let anonymized_file = self.anonymized_path(&movie_file);
            if !anonymized_file.exists() {
                tracing::warn!("No obfuscated file found for {}", file_name);
                summary.missing.push(file_name);
                continue;
            }

            match combine_pair(&movie_file, &anonymized_file) {
                Ok(combined) => {
                    movies.push(Value::Object(combined));
                    tracing::debug!("Processed: {}", file_name);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file_name, e);
                    summary.unreadable.push(file_name);
                }
            }
        }

        summary.merged = movies.len();
        write_json(output, &movies)?;
        tracing::info!("Created {} with {} movies", output.display(), summary.merged);
        Ok(summary)
    }
}

/// File name for a film: alphanumerics, spaces, `-` and `_` survive; spaces become `_`.
pub fn movie_file_name(title: &str, year: Option<&str>) -> String {
    let safe_title: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe_title = safe_title.trim().replace(' ', "_");
    format!("{}_{}.json", year.unwrap_or("unknown"), safe_title)
}

/// Sets `wiki` on one record file unless already present. `Ok(false)` when nothing changed.
fn backfill_file(path: &Path, url: &str) -> Result<bool, StorageError> {
    let mut object = read_object(path)?;
    if object.contains_key("wiki") {
        return Ok(false);
    }
    object.insert("wiki".to_string(), Value::String(url.to_string()));
    write_json(path, &object)?;
    Ok(true)
}

fn combine_pair(movie_file: &Path, anonymized_file: &Path) -> Result<Map<String, Value>, StorageError> {
    let mut combined = read_object(movie_file)?;
    combined.extend(read_object(anonymized_file)?);
    Ok(combined)
}

fn read_object(path: &Path) -> Result<Map<String, Value>, StorageError> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn json_files_in(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter(|path| path.file_name().is_some_and(|name| name != REPORT_FILE))
        .collect();
    files.sort();
    Ok(files)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, StorageManager) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("movies"), dir.path().join("anon")).unwrap();
        (dir, storage)
    }

    fn nomination(title: &str, year: &str) -> NominationRecord {
        NominationRecord {
            year: Some(year.to_string()),
            title: title.to_string(),
            url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(movie_file_name("Crouching Tiger, Hidden Dragon", Some("2000")), "2000_Crouching_Tiger_Hidden_Dragon.json");
        assert_eq!(movie_file_name(" M*A*S*H ", Some("1970")), "1970_MASH.json");
        assert_eq!(movie_file_name("Wings", None), "unknown_Wings.json");
    }

    #[test]
    fn saved_movie_counts_as_scraped() {
        let (_dir, storage) = storage();
        assert!(!storage.is_scraped("Wings", Some("1927")));

        let movie = MovieRecord::from_nomination(&nomination("Wings", "1927"), "Pilots.".into());
        let path = storage.save_movie(&movie).unwrap();

        assert!(storage.is_scraped("Wings", Some("1927")));
        assert_eq!(storage.load_movie(&path).unwrap(), movie);
    }

    #[test]
    fn backfill_only_touches_files_without_wiki() {
        let (_dir, storage) = storage();
        let legacy = storage.movie_path("Wings", Some("1927"));
        fs::write(&legacy, r#"{"year": "1927", "name": "Wings", "plot": "Pilots."}"#).unwrap();
        let current = MovieRecord::from_nomination(&nomination("Cimarron", "1931"), "Land rush.".into());
        storage.save_movie(&current).unwrap();

        let nominations = vec![nomination("Wings", "1927"), nomination("Cimarron", "1931"), nomination("Absent", "1932")];
        assert_eq!(storage.backfill_wiki_links(&nominations), 1);

        let wings = storage.load_movie(&legacy).unwrap();
        assert_eq!(wings.wiki.as_deref(), Some("https://en.wikipedia.org/wiki/Wings"));
        assert_eq!(wings.plot, "Pilots.");
    }

    #[test]
    fn merge_combines_pairs_and_reports_missing() {
        let (dir, storage) = storage();
        let a = storage.save_movie(&MovieRecord::from_nomination(&nomination("Alpha", "1990"), "A.".into())).unwrap();
        storage.save_movie(&MovieRecord::from_nomination(&nomination("Beta", "1991"), "B.".into())).unwrap();
        storage.save_anonymized(&a, &AnonymizedPlot { obfuscated_plot: "Someone.".into() }).unwrap();

        let output = dir.path().join("db.json");
        let summary = storage.merge_collection(&output).unwrap();

        assert_eq!(summary.merged, 1);
        assert_eq!(summary.missing, vec!["1991_Beta.json".to_string()]);

        let db: Vec<Value> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(db[0]["name"], "Alpha");
        assert_eq!(db[0]["plot"], "A.");
        assert_eq!(db[0]["obfuscated_plot"], "Someone.");
    }

    #[test]
    fn corrupt_record_does_not_stop_backfill() {
        let (_dir, storage) = storage();
        fs::write(storage.movie_path("Bad", Some("1927")), "{not json").unwrap();
        let good = storage.movie_path("Good", Some("1928"));
        fs::write(&good, r#"{"year": "1928", "name": "Good", "plot": "Fine."}"#).unwrap();

        let nominations = vec![nomination("Bad", "1927"), nomination("Good", "1928")];
        assert_eq!(storage.backfill_wiki_links(&nominations), 1);
        assert!(storage.load_movie(&good).unwrap().wiki.is_some());
    }

    #[test]
    fn backfill_without_nominations_changes_nothing() {
        let (_dir, storage) = storage();
        let movie = MovieRecord { wiki: None, ..MovieRecord::from_nomination(&nomination("Wings", "1927"), "P.".into()) };
        let path = storage.save_movie(&movie).unwrap();

        assert_eq!(storage.backfill_wiki_links(&[]), 0);
        assert_eq!(storage.load_movie(&path).unwrap().wiki, None);
    }

    #[test]
    fn corrupt_pair_is_reported_and_merge_continues() {
        let (dir, storage) = storage();
        let bad = storage.movie_path("Bad", Some("1990"));
        fs::write(&bad, "{not json").unwrap();
        storage.save_anonymized(&bad, &AnonymizedPlot { obfuscated_plot: "x".into() }).unwrap();
        let good = storage.save_movie(&MovieRecord::from_nomination(&nomination("Good", "1991"), "G.".into())).unwrap();
        storage.save_anonymized(&good, &AnonymizedPlot { obfuscated_plot: "Someone.".into() }).unwrap();

        let output = dir.path().join("db.json");
        let summary = storage.merge_collection(&output).unwrap();

        assert_eq!(summary.merged, 1);
        assert_eq!(summary.unreadable, vec!["1990_Bad.json".to_string()]);
        let db: Vec<Value> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(db[0]["name"], "Good");
    }

    #[test]
    fn report_is_not_listed_as_a_movie() {
        let (_dir, storage) = storage();
        storage.save_report(&ScrapeReport::default()).unwrap();
        assert!(storage.list_movie_files().unwrap().is_empty());
    }
}
