//! Pipeline facade: search and rank jobs for a candidate.
//!
//! Aggregator → per-posting skill extraction → scoring → stable sort by match
//! percentage, highest first. Ties keep aggregation order. Nothing is truncated.

use std::future::Future;

use serde::Serialize;
use tracing::info;

use crate::aggregation::{Aggregator, SearchError};
use crate::matching::scorer::{score, MatchReport};
use crate::models::{JobPosting, SearchQuery, SkillSet};
use crate::skills::SkillExtractor;
use crate::sources::SourceDiagnostic;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedJob {
    pub posting: JobPosting,
    pub report: MatchReport,
}

/// Ranked postings plus the diagnostics of every source that was dropped.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSearch {
    pub results: Vec<RankedJob>,
    pub diagnostics: Vec<SourceDiagnostic>,
}

#[derive(Clone)]
pub struct JobPipeline {
    aggregator: Aggregator,
    extractor: SkillExtractor,
}

impl JobPipeline {
    pub fn new(aggregator: Aggregator, extractor: SkillExtractor) -> Self {
        Self {
            aggregator,
            extractor,
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub async fn rank(
        &self,
        candidate_skills: &SkillSet,
        query: &SearchQuery,
    ) -> Result<RankedSearch, SearchError> {
        self.rank_until(candidate_skills, query, std::future::pending())
            .await
    }

    /// Cancellable [`JobPipeline::rank`]; see [`Aggregator::search_jobs_until`].
    pub async fn rank_until<C>(
        &self,
        candidate_skills: &SkillSet,
        query: &SearchQuery,
        cancel: C,
    ) -> Result<RankedSearch, SearchError>
    where
        C: Future<Output = ()>,
    {
        let aggregated = self.aggregator.search_jobs_until(query, cancel).await?;
        let results = self.rank_postings(candidate_skills, aggregated.postings);

        info!(
            ranked = results.len(),
            candidate_skills = candidate_skills.len(),
            "Ranked postings for candidate"
        );

        Ok(RankedSearch {
            results,
            diagnostics: aggregated.diagnostics,
        })
    }

    /// Scores and sorts an already-fetched collection, e.g. one loaded from an export file.
    pub fn rank_postings(
        &self,
        candidate_skills: &SkillSet,
        postings: Vec<JobPosting>,
    ) -> Vec<RankedJob> {
        let mut ranked: Vec<RankedJob> = postings
            .into_iter()
            .map(|posting| {
                let job_skills = self.extractor.extract_skills(posting.description());
                let report = score(candidate_skills, &job_skills);
                RankedJob { posting, report }
            })
            .collect();

        // sort_by is stable, so equal percentages keep aggregation order.
        ranked.sort_by(|a, b| {
            b.report
                .match_percentage
                .total_cmp(&a.report.match_percentage)
        });
        ranked
    }

    /// Extracts the candidate's skills from resume text and, when a job description
    /// is given, scores them against it. Without a description the report has no
    /// job skills and a 0% match.
    pub fn analyze_resume(&self, resume_text: &str, job_description: Option<&str>) -> MatchReport {
        let resume_skills = self.extractor.extract_skills(resume_text);
        let job_skills = job_description
            .map(|text| self.extractor.extract_skills(text))
            .unwrap_or_default();
        score(&resume_skills, &job_skills)
    }
}
