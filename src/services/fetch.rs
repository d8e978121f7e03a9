//! Batch retrieval of raw movie records.
//!
//! Every identifier runs to a terminal outcome: either its record lands in the
//! success set or the identifier lands in the permanent-failure set. Transport
//! errors never abort the batch.

use crate::clients::MovieSource;
use crate::constants::fetch::{MAX_ATTEMPTS, RETRY_DELAY};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Terminal result of one batch: successfully fetched records (sorted by id)
/// plus the identifiers that exhausted their retries.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<Map<String, Value>>,
    pub failed: Vec<u64>,
}

/// Fetches one movie with the fixed retry policy: on failure of the first
/// attempt, wait [`RETRY_DELAY`] and try exactly once more. The delay blocks
/// only the task that owns this identifier.
pub async fn fetch_with_retry(
    source: &dyn MovieSource,
    movie_id: u64,
) -> Result<Map<String, Value>> {
    let mut last_error = anyhow::anyhow!("movie {movie_id}: no fetch attempt made");

    for attempt in 1..=MAX_ATTEMPTS {
        match source.fetch_movie(movie_id).await {
            Ok(record) => return Ok(record),
            Err(error) => {
                if attempt < MAX_ATTEMPTS {
                    warn!(
                        "Error fetching movie {} (attempt {}): {}. Retrying in {}s...",
                        movie_id,
                        attempt,
                        error,
                        RETRY_DELAY.as_secs()
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                last_error = error;
            }
        }
    }

    Err(last_error)
}

/// Fetches every identifier with a bounded worker pool.
///
/// Identifiers are deduplicated up front; each one's outcome is independent,
/// and the call returns only once all of them are terminal. The union of
/// fetched ids and failed ids always equals the submitted set.
pub async fn fetch_all(
    source: Arc<dyn MovieSource>,
    movie_ids: &[u64],
    workers: usize,
) -> FetchOutcome {
    let mut ids: Vec<u64> = movie_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    info!(
        "Fetching data for {} movies with {} workers",
        ids.len(),
        workers.max(1)
    );

    let outcomes: Vec<(u64, Result<Map<String, Value>>)> = stream::iter(ids)
        .map(|movie_id| {
            let source = Arc::clone(&source);
            async move { (movie_id, fetch_with_retry(source.as_ref(), movie_id).await) }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let mut fetched: Vec<(u64, Map<String, Value>)> = Vec::new();
    let mut failed: Vec<u64> = Vec::new();

    for (movie_id, outcome) in outcomes {
        match outcome {
            Ok(record) => fetched.push((movie_id, record)),
            Err(error) => {
                warn!("Failed to fetch movie {} after retry: {}", movie_id, error);
                failed.push(movie_id);
            }
        }
    }

    // Workers complete in arbitrary order; sort for stable persisted output.
    fetched.sort_by_key(|(movie_id, _)| *movie_id);
    failed.sort_unstable();

    info!(
        "Fetch complete: {} succeeded, {} failed permanently",
        fetched.len(),
        failed.len()
    );
    if !failed.is_empty() {
        warn!("Permanently failed movie ids: {:?}", failed);
    }

    FetchOutcome {
        records: fetched.into_iter().map(|(_, record)| record).collect(),
        failed,
    }
}
