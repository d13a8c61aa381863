pub mod job;
pub mod skills;

pub use job::{DedupKey, JobPosting, JobPostingRecord, PostingError, SearchQuery, SourceTag};
pub use skills::SkillSet;
