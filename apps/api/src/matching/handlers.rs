//! Axum route handlers for job search, ranking and skill analysis.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::aggregation::AggregatedJobs;
use crate::config::Config;
use crate::errors::AppError;
use crate::export::save_jobs;
use crate::matching::scorer::MatchReport;
use crate::models::{JobPosting, SearchQuery, SkillSet};
use crate::sources::SourceDiagnostic;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Missing location and radius fall back to the configured defaults.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub title: String,
    pub location: Option<String>,
    pub radius: Option<f64>,
}

impl SearchRequest {
    fn into_query(self, config: &Config) -> SearchQuery {
        SearchQuery::new(
            self.title,
            self.location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| config.default_location.clone()),
            self.radius.unwrap_or(config.default_radius),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(flatten)]
    pub search: SearchRequest,
    #[serde(default)]
    pub candidate_skills: Vec<String>,
    pub resume_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankedEntry {
    pub posting: JobPosting,
    pub report: MatchReport,
    pub strong_match: bool,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub results: Vec<RankedEntry>,
    pub diagnostics: Vec<SourceDiagnostic>,
    /// Candidate skills that are not in the catalog and were ignored.
    pub unknown_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: PathBuf,
    pub exported: usize,
    pub diagnostics: Vec<SourceDiagnostic>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub skills: SkillSet,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub report: MatchReport,
    pub strong_match: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/search
///
/// Aggregates postings from every configured source. Failed sources are listed
/// in `diagnostics`; the request itself only fails on an invalid query.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<AggregatedJobs>, AppError> {
    let query = request.into_query(&state.config);
    let aggregated = state.pipeline.aggregator().search_jobs(&query).await?;
    Ok(Json(aggregated))
}

/// POST /api/v1/jobs/rank
///
/// Candidate skills come from `candidate_skills`, `resume_text`, or both (unioned).
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let resume_text = request
        .resume_text
        .filter(|text| !text.trim().is_empty());
    if request.candidate_skills.is_empty() && resume_text.is_none() {
        return Err(AppError::Validation(
            "provide candidate_skills or resume_text".to_string(),
        ));
    }

    let extractor = state.pipeline.extractor();
    let (listed, unknown_skills) = extractor.catalog().resolve(&request.candidate_skills);
    let candidate = match &resume_text {
        Some(text) => listed.union(&extractor.extract_skills(text)),
        None => listed,
    };

    let query = request.search.into_query(&state.config);
    let ranked = state.pipeline.rank(&candidate, &query).await?;

    let threshold = state.config.skills_threshold;
    let results = ranked
        .results
        .into_iter()
        .map(|entry| RankedEntry {
            strong_match: entry.report.meets_threshold(threshold),
            posting: entry.posting,
            report: entry.report,
        })
        .collect();

    Ok(Json(RankResponse {
        results,
        diagnostics: ranked.diagnostics,
        unknown_skills,
    }))
}

/// POST /api/v1/jobs/export
///
/// Runs a search and writes the postings to a timestamped JSON file under `OUTPUT_PATH`.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    let query = request.into_query(&state.config);
    let aggregated = state.pipeline.aggregator().search_jobs(&query).await?;

    let output_dir = PathBuf::from(&state.config.output_path);
    let postings = aggregated.postings;
    let exported = postings.len();
    let path = tokio::task::spawn_blocking(move || save_jobs(&postings, Path::new(&output_dir), None))
        .await
        .context("Export task failed")??;

    Ok(Json(ExportResponse {
        path,
        exported,
        diagnostics: aggregated.diagnostics,
    }))
}

/// POST /api/v1/skills/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    Json(ExtractResponse {
        skills: state.pipeline.extractor().extract_skills(&request.text),
    })
}

/// POST /api/v1/skills/analyze
///
/// Resume analysis: resume skills, optionally scored against a job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let report = state
        .pipeline
        .analyze_resume(&request.resume_text, request.job_description.as_deref());
    let strong_match = report.meets_threshold(state.config.skills_threshold);

    Ok(Json(AnalyzeResponse {
        report,
        strong_match,
    }))
}
