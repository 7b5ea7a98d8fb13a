//! Content loading metrics.
//!
//! Tracks how the bundle cache and the content source are used. Each
//! repository owns its own counters so independent pages (and tests) do
//! not share state.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one content repository.
#[derive(Debug, Default)]
pub struct ContentMetrics {
    /// Number of lookups answered from the bundle cache
    cache_hits: AtomicUsize,

    /// Number of lookups that had to go to the content source
    cache_misses: AtomicUsize,

    /// Number of fetches issued against the content source
    fetches: AtomicUsize,

    /// Number of fetches that ended without a usable payload
    fetch_failures: AtomicUsize,

    /// Number of payloads that were not valid bundles
    parse_failures: AtomicUsize,
}

impl ContentMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn parse_failures(&self) -> usize {
        self.parse_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_lookups = hits + misses;
        let cache_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let fetches = self.fetches();
        let failures = self.fetch_failures() + self.parse_failures();
        let fetch_success_rate = if fetches > 0 {
            (fetches.saturating_sub(failures) as f64 / fetches as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            fetches,
            fetch_failures: self.fetch_failures(),
            parse_failures: self.parse_failures(),
            fetch_success_rate,
        }
    }
}

/// Snapshot of the content loading counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub fetches: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,

    /// Share of fetches that produced a bundle, as a percentage (0-100)
    pub fetch_success_rate: f64,
}
