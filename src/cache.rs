// =============================================================================
// Figure Cache — TTL memoisation of rendered charts
// =============================================================================
//
// Keyed by the full request tuple (ticker, indicator selection, raw argument
// string). Only successful renders are stored. The lock is never held while
// a figure is being computed, so two concurrent misses for the same key both
// compute and the last writer wins.
//
// Capacity is bounded: once full, an insert of a new key evicts the entry
// closest to expiry.
//
// Time comes from `tokio::time::Instant` so tests can pause and advance the
// clock.
// =============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::chart::Figure;
use crate::types::Ticker;

/// Full input tuple of a graph request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: Ticker,
    pub indicators: Vec<String>,
    /// `None` and `""` are the same key.
    pub arglist: String,
}

impl CacheKey {
    pub fn new(ticker: &Ticker, indicators: &[String], arglist: Option<&str>) -> Self {
        Self {
            ticker: ticker.clone(),
            indicators: indicators.to_vec(),
            arglist: arglist.unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    figure: Arc<Figure>,
    expires_at: Instant,
}

/// Snapshot of cache counters for the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub ttl_secs: u64,
    pub max_entries: usize,
}

pub struct FigureCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FigureCache {
    /// `max_entries` is clamped to at least one.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Live entry for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Figure>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| Arc::clone(&e.figure))
    }

    /// Store `figure` under `key` for one TTL, sweeping expired entries and
    /// evicting the oldest when the cache is full.
    pub fn insert(&self, key: CacheKey, figure: Arc<Figure>) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.retain(|_, e| e.expires_at > now);

        if !entries.contains_key(&key) {
            while entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at)
                    .map(|(k, _)| k.clone());
                let Some(oldest) = oldest else { break };
                debug!(ticker = %oldest.ticker, "figure cache full, evicting oldest entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                figure,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Return the cached figure for `key`, or run `compute` and cache its
    /// result if it succeeds. Errors pass through uncached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: CacheKey, compute: F) -> Result<Arc<Figure>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Figure, E>>,
    {
        if let Some(figure) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(ticker = %key.ticker, "figure cache hit");
            return Ok(figure);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let figure = Arc::new(compute().await?);
        self.insert(key, Arc::clone(&figure));
        Ok(figure)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
            max_entries: self.max_entries,
        }
    }
}
