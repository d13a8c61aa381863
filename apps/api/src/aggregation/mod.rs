// Job aggregation: concurrent fan-out to sources, merge, dedup.

pub mod aggregator;
pub mod dedup;

pub use aggregator::{AggregatedJobs, Aggregator, SearchError, DEFAULT_SOURCE_TIMEOUT};
pub use dedup::dedup_postings;
