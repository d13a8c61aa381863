use std::sync::Arc;

use crate::config::Config;
use crate::matching::JobPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Aggregator + extractor + scorer, built once at startup.
    pub pipeline: Arc<JobPipeline>,
}
