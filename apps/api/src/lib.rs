//! jobmatch: job aggregation and skill matching.
//!
//! Fetches listings from independent sources with per-source failure isolation,
//! deduplicates them, extracts skills from each description and ranks the
//! postings against a candidate's skills. The `jobmatch-api` binary exposes
//! this over HTTP; everything here is usable in-process.

pub mod aggregation;
pub mod config;
pub mod errors;
pub mod export;
pub mod matching;
pub mod models;
pub mod routes;
pub mod skills;
pub mod sources;
pub mod state;
