use crate::models::ToolKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory TTL cache for successful tool results
///
/// Only real API responses are stored; fallback data never is.
#[derive(Clone)]
pub struct ToolCache {
    entries: moka::future::Cache<String, Value>,
    enabled: bool,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl ToolCache {
    /// Create a new cache holding up to `max_entries` results for `ttl_secs`
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            entries,
            enabled: true,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        let mut cache = Self::new(1, 1);
        cache.enabled = false;
        cache
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        match self.entries.get(key).await {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Tool cache hit: {}", key);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Tool cache miss: {}", key);
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: Value) {
        if !self.enabled {
            return;
        }
        self.entries.insert(key.to_string(), value).await;
        tracing::trace!("Tool cache set: {}", key);
    }

    pub async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            size: self.entries.entry_count(),
            hit_count: hits,
            miss_count: misses,
            hit_rate: if total > 0 { hits as f64 / total as f64 } else { 0.0 },
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a tool call; parameter order does not matter
    pub fn tool_call(tool: ToolKind, params: &Map<String, Value>) -> String {
        let sorted: BTreeMap<&String, &Value> = params.iter().collect();
        let params = serde_json::to_string(&sorted).unwrap_or_default();
        format!("{}:{}", tool.as_str(), params)
    }
}
