//! Fetches listings from a JSON job-search endpoint.
//!
//! Endpoint contract: `GET {base_url}/jobs?title=..&location=..&radius=..` returning
//! a JSON array of listing records. Retries on 429 and 5xx with exponential backoff.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{SourceAdapter, SourceError};
use crate::models::{JobPosting, SearchQuery, SourceTag};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One listing as returned by a job board API.
#[derive(Debug, Deserialize)]
struct ListingRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    title: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    posted_at: Option<DateTime<Utc>>,
}

impl ListingRecord {
    fn into_posting(self, source: SourceTag) -> Result<JobPosting, SourceError> {
        let mut builder = JobPosting::builder(source, self.title)
            .company(self.company)
            .location(self.location)
            .description(self.description)
            .posted_at(self.posted_at);
        if let Some(id) = self.id {
            builder = builder.native_id(id);
        }
        if let Some(url) = self.url {
            builder = builder.url(url);
        }
        Ok(builder.build()?)
    }
}

#[derive(Clone)]
pub struct JobBoardClient {
    tag: SourceTag,
    client: Client,
    base_url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl JobBoardClient {
    pub fn new(tag: SourceTag, base_url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("jobmatch/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            tag,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Overrides the retry policy. `max_attempts` is clamped to at least one.
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    /// Exponential backoff before retry `attempt`: 1x, 2x, 4x the base delay. Saturates
    /// instead of overflowing for large attempt counts.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff.saturating_mul(factor)
    }

    fn endpoint(&self) -> String {
        format!("{}/jobs", self.base_url)
    }

    async fn fetch_listings(&self, query: &SearchQuery) -> Result<Vec<ListingRecord>, SourceError> {
        let radius = query.radius.to_string();
        let params = [
            ("title", query.title.as_str()),
            ("location", query.location.as_str()),
            ("radius", radius.as_str()),
        ];

        let mut last_error: Option<SourceError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.retry_delay(attempt);
                warn!(
                    source = %self.tag,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Job board request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(self.endpoint()).query(&params).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SourceError::Network(e.to_string()));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 {
                last_error = Some(SourceError::RateLimited {
                    attempts: attempt + 1,
                });
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(SourceError::Http {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SourceError::Http {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| SourceError::Network(e.to_string()))?;
            let listings: Vec<ListingRecord> =
                serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;

            debug!(source = %self.tag, listings = listings.len(), "Job board responded");
            return Ok(listings);
        }

        Err(last_error.unwrap_or(SourceError::RateLimited {
            attempts: self.max_attempts,
        }))
    }
}

#[async_trait]
impl SourceAdapter for JobBoardClient {
    fn tag(&self) -> SourceTag {
        self.tag
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<JobPosting>, SourceError> {
        self.fetch_listings(query)
            .await?
            .into_iter()
            .map(|record| record.into_posting(self.tag))
            .collect()
    }
}
