use async_trait::async_trait;

use super::{SourceAdapter, SourceError};
use crate::models::{JobPosting, SearchQuery, SourceTag};

/// Offline adapter returning one deterministic listing per query.
/// Used for sources that have no API endpoint configured.
pub struct SampleSource {
    tag: SourceTag,
}

impl SampleSource {
    pub fn new(tag: SourceTag) -> Self {
        Self { tag }
    }
}

#[async_trait]
impl SourceAdapter for SampleSource {
    fn tag(&self) -> SourceTag {
        self.tag
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<JobPosting>, SourceError> {
        let (title, company, url) = match self.tag {
            SourceTag::Linkedin => (
                format!("{} at Company A", query.title),
                "Company A",
                "https://linkedin.com/jobs/123",
            ),
            SourceTag::Indeed => (
                format!("Senior {} at Company B", query.title),
                "Company B",
                "https://indeed.com/jobs/456",
            ),
            SourceTag::Stepstone => (
                format!("Lead {} at Company C", query.title),
                "Company C",
                "https://stepstone.com/jobs/789",
            ),
        };

        let posting = JobPosting::builder(self.tag, title)
            .url(url)
            .company(company)
            .location(query.location.clone())
            .description(format!("Job description for {company}"))
            .build()?;

        Ok(vec![posting])
    }
}
