// Skill matching and the search-and-rank facade.
// Scoring is pure; only `pipeline` touches the aggregator.

pub mod handlers;
pub mod pipeline;
pub mod scorer;

pub use pipeline::{JobPipeline, RankedJob, RankedSearch};
pub use scorer::{score, MatchReport};
