use std::collections::HashSet;

use tracing::debug;

use crate::models::JobPosting;

/// Drops postings whose dedup key was already seen. First occurrence wins and
/// relative order of the survivors is preserved.
pub fn dedup_postings<I>(postings: I) -> Vec<JobPosting>
where
    I: IntoIterator<Item = JobPosting>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut dropped = 0usize;

    for posting in postings {
        if seen.insert(posting.dedup_key()) {
            unique.push(posting);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = unique.len(), "Dropped duplicate postings");
    }

    unique
}
