//! One adapter per external job source, each an isolated failure domain.
//!
//! Every adapter implements [`SourceAdapter::fetch`]. Failures are returned as a typed
//! [`SourceError`]; the aggregator downgrades them to an empty contribution plus a
//! [`SourceDiagnostic`] and never lets them abort a search.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{JobPosting, PostingError, SearchQuery, SourceTag};

pub mod job_board;
pub mod sample;

pub use job_board::JobBoardClient;
pub use sample::SampleSource;

/// Why a source could not contribute postings. Every variant means "source unavailable".
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("response could not be parsed: {0}")]
    Parse(String),

    #[error("invalid posting: {0}")]
    InvalidPosting(#[from] PostingError),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("adapter panicked")]
    Panicked,
}

/// Machine-readable failure category carried in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Http,
    RateLimited,
    Parse,
    InvalidPosting,
    Timeout,
    Panicked,
}

impl SourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SourceError::Network(_) => FailureKind::Network,
            SourceError::Http { .. } => FailureKind::Http,
            SourceError::RateLimited { .. } => FailureKind::RateLimited,
            SourceError::Parse(_) => FailureKind::Parse,
            SourceError::InvalidPosting(_) => FailureKind::InvalidPosting,
            SourceError::Timeout(_) => FailureKind::Timeout,
            SourceError::Panicked => FailureKind::Panicked,
        }
    }
}

/// One record per source that was dropped from a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDiagnostic {
    pub source: SourceTag,
    pub kind: FailureKind,
    pub reason: String,
}

impl SourceDiagnostic {
    pub fn new(source: SourceTag, error: &SourceError) -> Self {
        Self {
            source,
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// A job source. Implementations own their transport and parsing.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn tag(&self) -> SourceTag;

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<JobPosting>, SourceError>;
}

/// Builds one adapter per configured source, in configured order.
/// Sources with an API URL get a [`JobBoardClient`]; the rest fall back to [`SampleSource`].
pub fn build_sources(config: &Config) -> Result<Vec<Arc<dyn SourceAdapter>>, reqwest::Error> {
    let mut sources: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(config.sources.len());

    for tag in &config.sources {
        match config.source_urls.get(tag) {
            Some(base_url) => {
                info!(source = %tag, base_url = %base_url, "Using job board API");
                sources.push(Arc::new(JobBoardClient::new(*tag, base_url.clone())?));
            }
            None => {
                warn!(source = %tag, "No API URL configured, using sample listings");
                sources.push(Arc::new(SampleSource::new(*tag)));
            }
        }
    }

    Ok(sources)
}
