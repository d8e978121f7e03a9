//! Integration tests for the batch fetcher.
//!
//! Exercises the retry policy and the batch completeness guarantee against
//! in-memory movie sources; no network is involved.

use anyhow::Result;
use async_trait::async_trait;
use cinetab::clients::MovieSource;
use cinetab::services::{fetch_all, fetch_with_retry};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn record(id: u64, title: &str) -> Map<String, Value> {
    json!({"id": id, "title": title}).as_object().unwrap().clone()
}

/// Serves a fixed set of records; everything else fails on every attempt.
struct FixtureSource {
    records: HashMap<u64, Map<String, Value>>,
    attempts: AtomicUsize,
}

impl FixtureSource {
    fn new(ids: &[u64]) -> Self {
        let records = ids
            .iter()
            .map(|&id| (id, record(id, &format!("Movie {id}"))))
            .collect();
        Self {
            records,
            attempts: AtomicUsize::new(0),
        }
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieSource for FixtureSource {
    async fn fetch_movie(&self, movie_id: u64) -> Result<Map<String, Value>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("movie {movie_id} not found"))
    }
}

/// Fails a configured number of times per id before succeeding.
struct FlakySource {
    failures_before_success: usize,
    attempts: AtomicUsize,
}

#[async_trait]
impl MovieSource for FlakySource {
    async fn fetch_movie(&self, movie_id: u64) -> Result<Map<String, Value>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures_before_success {
            anyhow::bail!("transient error for movie {movie_id}");
        }
        Ok(record(movie_id, "Recovered"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_after_one_failure() {
    let source = FlakySource {
        failures_before_success: 1,
        attempts: AtomicUsize::new(0),
    };

    let fetched = fetch_with_retry(&source, 42).await.unwrap();
    assert_eq!(fetched.get("id"), Some(&json!(42)));
    assert_eq!(source.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_retry_gives_up_after_second_failure() {
    let source = FlakySource {
        failures_before_success: 2,
        attempts: AtomicUsize::new(0),
    };

    let outcome = fetch_with_retry(&source, 42).await;
    assert!(outcome.is_err());
    // Exactly two attempts, never a third.
    assert_eq!(source.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_batch_reaches_terminal_outcome_for_every_id() {
    let source = Arc::new(FixtureSource::new(&[1, 3, 5]));
    let outcome = fetch_all(source, &[1, 2, 3, 4, 5], 3).await;

    let fetched_ids: Vec<u64> = outcome
        .records
        .iter()
        .map(|r| r.get("id").and_then(Value::as_u64).unwrap())
        .collect();

    assert_eq!(fetched_ids, vec![1, 3, 5]);
    assert_eq!(outcome.failed, vec![2, 4]);

    let mut all: Vec<u64> = fetched_ids.iter().chain(&outcome.failed).copied().collect();
    all.sort_unstable();
    assert_eq!(all, vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_ids_are_fetched_once() {
    let source = Arc::new(FixtureSource::new(&[7]));
    let outcome = fetch_all(Arc::<FixtureSource>::clone(&source), &[7, 7, 7], 2).await;

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.failed.is_empty());
    assert_eq!(source.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_one_bad_id_never_aborts_the_batch() {
    let source = Arc::new(FixtureSource::new(&[10, 30]));
    let outcome = fetch_all(source, &[10, 20, 30], 1).await;

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.failed, vec![20]);
}

#[tokio::test(start_paused = true)]
async fn test_worker_pool_smaller_than_batch() {
    let ids: Vec<u64> = (1..=20).collect();
    let source = Arc::new(FixtureSource::new(&ids));
    let outcome = fetch_all(source, &ids, 4).await;

    assert_eq!(outcome.records.len(), 20);
    assert!(outcome.failed.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_batch_is_a_noop() {
    let source = Arc::new(FixtureSource::new(&[]));
    let outcome = fetch_all(source, &[], 10).await;

    assert!(outcome.records.is_empty());
    assert!(outcome.failed.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_records_come_back_sorted_by_id() {
    let source = Arc::new(FixtureSource::new(&[9, 1, 5]));
    let outcome = fetch_all(source, &[9, 1, 5], 3).await;

    let ids: Vec<u64> = outcome
        .records
        .iter()
        .map(|r| r.get("id").and_then(Value::as_u64).unwrap())
        .collect();
    assert_eq!(ids, vec![1, 5, 9]);
}
