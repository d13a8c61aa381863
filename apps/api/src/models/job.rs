use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The job sources this service knows how to query.
/// Order of declaration is the default configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Linkedin,
    Indeed,
    Stepstone,
}

impl SourceTag {
    pub const ALL: [SourceTag; 3] = [SourceTag::Linkedin, SourceTag::Indeed, SourceTag::Stepstone];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Linkedin => "linkedin",
            SourceTag::Indeed => "indeed",
            SourceTag::Stepstone => "stepstone",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(SourceTag::Linkedin),
            "indeed" => Ok(SourceTag::Indeed),
            "stepstone" => Ok(SourceTag::Stepstone),
            other => Err(format!("unknown job source '{other}'")),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PostingError {
    #[error("posting from {0} has neither a native id nor a URL")]
    MissingIdentity(SourceTag),

    #[error("posting from {0} has an empty title")]
    MissingTitle(SourceTag),
}

/// Identity used to recognise the same posting returned by more than one path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Source plus the id the source itself assigned.
    Native { source: SourceTag, id: String },
    /// Source plus the canonical URL, for postings the source assigned no id.
    Url { source: SourceTag, url: String },
}

/// A single job listing. Immutable once built; fields are read through accessors.
///
/// Serialises as plain structured data so collections can be exported and
/// re-imported; deserialisation re-checks the same invariants as [`JobPosting::builder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JobPostingRecord", into = "JobPostingRecord")]
pub struct JobPosting {
    source: SourceTag,
    native_id: Option<String>,
    url: String,
    title: String,
    company: String,
    location: String,
    description: String,
    posted_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    pub fn builder(source: SourceTag, title: impl Into<String>) -> JobPostingBuilder {
        JobPostingBuilder {
            source,
            title: title.into(),
            native_id: None,
            url: None,
            company: String::new(),
            location: String::new(),
            description: String::new(),
            posted_at: None,
        }
    }

    pub fn source(&self) -> SourceTag {
        self.source
    }

    /// The source-native id, or the canonical URL when the source assigns none.
    pub fn id(&self) -> &str {
        self.native_id.as_deref().unwrap_or(&self.url)
    }

    pub fn native_id(&self) -> Option<&str> {
        self.native_id.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.posted_at
    }

    pub fn dedup_key(&self) -> DedupKey {
        match &self.native_id {
            Some(id) => DedupKey::Native {
                source: self.source,
                id: id.clone(),
            },
            None => DedupKey::Url {
                source: self.source,
                url: self.url.clone(),
            },
        }
    }
}

pub struct JobPostingBuilder {
    source: SourceTag,
    title: String,
    native_id: Option<String>,
    url: Option<String>,
    company: String,
    location: String,
    description: String,
    posted_at: Option<DateTime<Utc>>,
}

impl JobPostingBuilder {
    pub fn native_id(mut self, id: impl Into<String>) -> Self {
        self.native_id = Some(id.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn posted_at(mut self, posted_at: Option<DateTime<Utc>>) -> Self {
        self.posted_at = posted_at;
        self
    }

    pub fn build(self) -> Result<JobPosting, PostingError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(PostingError::MissingTitle(self.source));
        }

        let native_id = self
            .native_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        let url = self
            .url
            .map(|u| canonical_url(&u))
            .filter(|u| !u.is_empty());

        // A posting without a URL falls back to its native id so the bot still has a handle.
        let url = match (url, &native_id) {
            (Some(url), _) => url,
            (None, Some(id)) => id.clone(),
            (None, None) => return Err(PostingError::MissingIdentity(self.source)),
        };

        Ok(JobPosting {
            source: self.source,
            native_id,
            url,
            title,
            company: self.company.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description,
            posted_at: self.posted_at,
        })
    }
}

/// Wire shape of a posting, used for import/export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPostingRecord {
    pub source: SourceTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobPostingRecord> for JobPosting {
    type Error = PostingError;

    fn try_from(record: JobPostingRecord) -> Result<Self, Self::Error> {
        let mut builder = JobPosting::builder(record.source, record.title)
            .url(record.url)
            .company(record.company)
            .location(record.location)
            .description(record.description)
            .posted_at(record.posted_at);
        if let Some(id) = record.id {
            builder = builder.native_id(id);
        }
        builder.build()
    }
}

impl From<JobPosting> for JobPostingRecord {
    fn from(posting: JobPosting) -> Self {
        JobPostingRecord {
            source: posting.source,
            id: posting.native_id,
            url: posting.url,
            title: posting.title,
            company: posting.company,
            location: posting.location,
            description: posting.description,
            posted_at: posting.posted_at,
        }
    }
}

/// A search request passed by value into the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub title: String,
    pub location: String,
    pub radius: f64,
}

impl SearchQuery {
    pub fn new(title: impl Into<String>, location: impl Into<String>, radius: f64) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            radius,
        }
    }

    /// Checks the query before any source is contacted.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title cannot be empty".to_string());
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(format!(
                "radius must be a non-negative number, got {}",
                self.radius
            ));
        }
        Ok(())
    }
}

/// Trims whitespace, drops any fragment and trailing slashes, and lowercases the
/// scheme and host. Path and query are kept verbatim.
fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or_default();

    let canonical = match without_fragment.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = match rest.find('/') {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            };
            format!(
                "{}://{}{}",
                scheme.to_lowercase(),
                host.to_lowercase(),
                path
            )
        }
        None => without_fragment.to_string(),
    };

    canonical.trim_end_matches('/').to_string()
}
