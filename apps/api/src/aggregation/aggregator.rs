//! Aggregator: fans a query out to every configured source and merges the results.
//!
//! Each adapter runs in its own task under a per-source timeout. A failing, slow or
//! panicking adapter costs only its own contribution and is reported as a
//! `SourceDiagnostic`. Merge and dedup run once every task has settled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::aggregation::dedup::dedup_postings;
use crate::models::{JobPosting, SearchQuery, SourceTag};
use crate::sources::{SourceAdapter, SourceDiagnostic, SourceError};

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("search was cancelled")]
    Cancelled,
}

/// Deduplicated postings plus one diagnostic per source that contributed nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedJobs {
    pub postings: Vec<JobPosting>,
    pub diagnostics: Vec<SourceDiagnostic>,
}

type FetchOutcome = Result<Vec<JobPosting>, SourceError>;

/// Aborts every still-running adapter task when dropped.
struct InFlight(Vec<(SourceTag, JoinHandle<FetchOutcome>)>);

impl Drop for InFlight {
    fn drop(&mut self) {
        for (_, handle) in &self.0 {
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn SourceAdapter>>,
    per_source_timeout: Duration,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            sources,
            per_source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, per_source_timeout: Duration) -> Self {
        self.per_source_timeout = per_source_timeout;
        self
    }

    pub fn source_tags(&self) -> Vec<SourceTag> {
        self.sources.iter().map(|s| s.tag()).collect()
    }

    /// Queries every source and returns the merged, deduplicated postings.
    /// Only an invalid query is an error; source failures become diagnostics.
    pub async fn search_jobs(&self, query: &SearchQuery) -> Result<AggregatedJobs, SearchError> {
        self.search_jobs_until(query, std::future::pending()).await
    }

    /// Like [`Aggregator::search_jobs`], but gives up when `cancel` resolves first.
    /// Cancellation aborts all in-flight adapter tasks and discards every result.
    pub async fn search_jobs_until<C>(
        &self,
        query: &SearchQuery,
        cancel: C,
    ) -> Result<AggregatedJobs, SearchError>
    where
        C: Future<Output = ()>,
    {
        query.validate().map_err(SearchError::InvalidQuery)?;

        info!(
            title = %query.title,
            location = %query.location,
            radius = query.radius,
            sources = self.sources.len(),
            "Searching job sources"
        );

        let mut in_flight = self.spawn_fetches(query);

        let outcomes = tokio::select! {
            outcomes = collect_outcomes(&mut in_flight) => outcomes,
            _ = cancel => {
                warn!("Job search cancelled, aborting in-flight sources");
                return Err(SearchError::Cancelled);
            }
        };

        Ok(merge(outcomes))
    }

    fn spawn_fetches(&self, query: &SearchQuery) -> InFlight {
        let handles = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let query = query.clone();
                let timeout = self.per_source_timeout;
                let tag = source.tag();
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout(timeout, source.fetch(&query)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(SourceError::Timeout(timeout)),
                    }
                });
                (tag, handle)
            })
            .collect();

        InFlight(handles)
    }
}

/// Waits for every task in configured order. Tasks keep running concurrently;
/// awaiting in order only fixes the order results are read in.
async fn collect_outcomes(in_flight: &mut InFlight) -> Vec<(SourceTag, FetchOutcome)> {
    let mut outcomes = Vec::with_capacity(in_flight.0.len());

    for (tag, handle) in in_flight.0.iter_mut() {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            // Handles are only aborted when `InFlight` drops, so a join error here is a panic.
            Err(_) => Err(SourceError::Panicked),
        };
        outcomes.push((*tag, outcome));
    }

    outcomes
}

fn merge(outcomes: Vec<(SourceTag, FetchOutcome)>) -> AggregatedJobs {
    let mut merged = Vec::new();
    let mut diagnostics = Vec::new();

    for (tag, outcome) in outcomes {
        match outcome {
            Ok(postings) => {
                info!(source = %tag, found = postings.len(), "Source returned postings");
                merged.extend(postings);
            }
            Err(e) => {
                warn!(source = %tag, kind = ?e.kind(), error = %e, "Source unavailable");
                diagnostics.push(SourceDiagnostic::new(tag, &e));
            }
        }
    }

    let postings = dedup_postings(merged);
    info!(
        postings = postings.len(),
        failed_sources = diagnostics.len(),
        "Job search complete"
    );

    AggregatedJobs {
        postings,
        diagnostics,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::sources::FailureKind;

    /// Test adapter with a fixed outcome and optional delay.
    pub(crate) struct StubSource {
        pub tag: SourceTag,
        pub behaviour: Behaviour,
        pub delay: Duration,
        pub finished: Arc<AtomicBool>,
    }

    pub(crate) enum Behaviour {
        Postings(Vec<JobPosting>),
        Fail(fn() -> SourceError),
        Panic,
    }

    impl StubSource {
        pub fn returning(tag: SourceTag, postings: Vec<JobPosting>) -> Self {
            Self {
                tag,
                behaviour: Behaviour::Postings(postings),
                delay: Duration::ZERO,
                finished: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn failing(tag: SourceTag, error: fn() -> SourceError) -> Self {
            Self {
                behaviour: Behaviour::Fail(error),
                ..Self::returning(tag, vec![])
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl SourceAdapter for StubSource {
        fn tag(&self) -> SourceTag {
            self.tag
        }

        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<JobPosting>, SourceError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.finished.store(true, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Postings(postings) => Ok(postings.clone()),
                Behaviour::Fail(error) => Err(error()),
                Behaviour::Panic => panic!("adapter blew up"),
            }
        }
    }

    pub(crate) fn posting(source: SourceTag, id: &str, description: &str) -> JobPosting {
        JobPosting::builder(source, format!("Engineer {id}"))
            .native_id(id)
            .url(format!("https://{source}.example/jobs/{id}"))
            .company("Company")
            .location("Remote")
            .description(description)
            .build()
            .unwrap()
    }

    fn query() -> SearchQuery {
        SearchQuery::new("Engineer", "Remote", 50.0)
    }

    fn aggregator(sources: Vec<StubSource>) -> Aggregator {
        Aggregator::new(
            sources
                .into_iter()
                .map(|s| Arc::new(s) as Arc<dyn SourceAdapter>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_failing_sources_become_diagnostics() {
        let agg = aggregator(vec![
            StubSource::returning(SourceTag::Linkedin, vec![posting(SourceTag::Linkedin, "1", "")]),
            StubSource::failing(SourceTag::Indeed, || SourceError::Network("reset".into())),
            StubSource::failing(SourceTag::Stepstone, || SourceError::Parse("bad json".into())),
        ]);

        let result = agg.search_jobs(&query()).await.unwrap();
        assert_eq!(result.postings.len(), 1);
        assert_eq!(result.diagnostics.len(), 2);
        assert_eq!(result.diagnostics[0].source, SourceTag::Indeed);
        assert_eq!(result.diagnostics[0].kind, FailureKind::Network);
        assert_eq!(result.diagnostics[1].source, SourceTag::Stepstone);
        assert_eq!(result.diagnostics[1].kind, FailureKind::Parse);
    }

    #[tokio::test]
    async fn test_all_sources_failing_is_not_an_error() {
        let agg = aggregator(vec![
            StubSource::failing(SourceTag::Linkedin, || SourceError::RateLimited { attempts: 3 }),
            StubSource::failing(SourceTag::Indeed, || SourceError::Http {
                status: 503,
                message: String::new(),
            }),
        ]);

        let result = agg.search_jobs(&query()).await.unwrap();
        assert!(result.postings.is_empty());
        assert_eq!(result.diagnostics.len(), 2);
    }

    #[tokio::test]
    async fn test_no_sources_yields_empty_result() {
        let result = aggregator(vec![]).search_jobs(&query()).await.unwrap();
        assert!(result.postings.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_order_follows_sources_not_completion() {
        let agg = aggregator(vec![
            StubSource::returning(
                SourceTag::Linkedin,
                vec![
                    posting(SourceTag::Linkedin, "a", ""),
                    posting(SourceTag::Linkedin, "b", ""),
                ],
            )
            .delayed(Duration::from_millis(30)),
            StubSource::returning(SourceTag::Indeed, vec![posting(SourceTag::Indeed, "c", "")]),
        ]);

        let result = agg.search_jobs(&query()).await.unwrap();
        let ids: Vec<_> = result.postings.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_duplicates_first_seen_in_source_order_wins() {
        let first = JobPosting::builder(SourceTag::Linkedin, "Platform Engineer")
            .url("https://linkedin.com/jobs/1")
            .description("from primary")
            .build()
            .unwrap();
        let duplicate = JobPosting::builder(SourceTag::Linkedin, "Platform Engineer")
            .url("https://LinkedIn.com/jobs/1/")
            .description("from mirror")
            .build()
            .unwrap();

        let agg = aggregator(vec![
            StubSource::returning(SourceTag::Linkedin, vec![first.clone()])
                .delayed(Duration::from_millis(20)),
            StubSource::returning(SourceTag::Linkedin, vec![duplicate]),
        ]);

        let result = agg.search_jobs(&query()).await.unwrap();
        assert_eq!(result.postings, vec![first]);
    }

    #[tokio::test]
    async fn test_distinct_urls_with_identical_details_are_kept() {
        let opening = |url: &str| {
            JobPosting::builder(SourceTag::Linkedin, "Engineer")
                .url(url)
                .company("ACME")
                .location("Remote")
                .build()
                .unwrap()
        };

        let agg = aggregator(vec![StubSource::returning(
            SourceTag::Linkedin,
            vec![
                opening("https://linkedin.com/jobs/1"),
                opening("https://linkedin.com/jobs/2"),
            ],
        )]);

        let result = agg.search_jobs(&query()).await.unwrap();
        let urls: Vec<_> = result.postings.iter().map(|p| p.url()).collect();
        assert_eq!(
            urls,
            vec!["https://linkedin.com/jobs/1", "https://linkedin.com/jobs/2"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sources_are_fetched_concurrently() {
        let agg = aggregator(
            SourceTag::ALL
                .into_iter()
                .enumerate()
                .map(|(i, tag)| {
                    StubSource::returning(tag, vec![posting(tag, &i.to_string(), "")])
                        .delayed(Duration::from_secs(5))
                })
                .collect(),
        )
        .with_timeout(Duration::from_secs(6));

        let started = tokio::time::Instant::now();
        let result = agg.search_jobs(&query()).await.unwrap();

        assert_eq!(result.postings.len(), 3);
        assert!(result.diagnostics.is_empty());
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out_without_blocking_others() {
        let agg = aggregator(vec![
            StubSource::returning(SourceTag::Linkedin, vec![posting(SourceTag::Linkedin, "1", "")])
                .delayed(Duration::from_secs(60)),
            StubSource::returning(SourceTag::Indeed, vec![posting(SourceTag::Indeed, "2", "")]),
        ])
        .with_timeout(Duration::from_secs(2));

        let result = agg.search_jobs(&query()).await.unwrap();
        assert_eq!(result.postings.len(), 1);
        assert_eq!(result.postings[0].source(), SourceTag::Indeed);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].source, SourceTag::Linkedin);
        assert_eq!(result.diagnostics[0].kind, FailureKind::Timeout);
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let mut exploding = StubSource::returning(SourceTag::Stepstone, vec![]);
        exploding.behaviour = Behaviour::Panic;

        let agg = aggregator(vec![
            StubSource::returning(SourceTag::Linkedin, vec![posting(SourceTag::Linkedin, "1", "")]),
            exploding,
        ]);

        let result = agg.search_jobs(&query()).await.unwrap();
        assert_eq!(result.postings.len(), 1);
        assert_eq!(result.diagnostics[0].kind, FailureKind::Panicked);
    }

    #[tokio::test]
    async fn test_invalid_query_aborts_before_fan_out() {
        let source = StubSource::returning(SourceTag::Linkedin, vec![]);
        let finished = source.finished.clone();
        let agg = aggregator(vec![source]);

        let err = agg
            .search_jobs(&SearchQuery::new("Engineer", "Remote", -5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_discards_everything_and_stops_sources() {
        let fast = StubSource::returning(SourceTag::Indeed, vec![posting(SourceTag::Indeed, "1", "")]);
        let slow = StubSource::returning(SourceTag::Linkedin, vec![posting(SourceTag::Linkedin, "2", "")])
            .delayed(Duration::from_secs(5));
        let slow_finished = slow.finished.clone();

        let agg = aggregator(vec![slow, fast]).with_timeout(Duration::from_secs(30));

        let err = agg
            .search_jobs_until(&query(), tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert_eq!(err, SearchError::Cancelled);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!slow_finished.load(Ordering::SeqCst));
    }
}
