//! JSON import/export of posting collections.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::models::JobPosting;

/// Writes `postings` as pretty JSON into `dir`, creating it if needed.
/// Without a filename, uses `jobs_<YYYYmmdd_HHMMSS>.json`. Returns the written path.
pub fn save_jobs(postings: &[JobPosting], dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let filename = match filename {
        Some(name) => name.to_string(),
        None => format!("jobs_{}.json", Local::now().format("%Y%m%d_%H%M%S")),
    };
    let path = dir.join(filename);

    let json = serde_json::to_string_pretty(postings).context("Failed to serialize postings")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), postings = postings.len(), "Saved postings");
    Ok(path)
}

/// Reads postings written by [`save_jobs`]. Every record is re-validated.
pub fn load_jobs(path: &Path) -> Result<Vec<JobPosting>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let postings: Vec<JobPosting> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid posting data in {}", path.display()))?;

    info!(path = %path.display(), postings = postings.len(), "Loaded postings");
    Ok(postings)
}
