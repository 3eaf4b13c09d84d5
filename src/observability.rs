//! Observability: metrics collection for lifecycle, session, and audit paths

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Metrics collector for tracking system health
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<RwLock<MetricsInner>>,
}

struct MetricsInner {
    counters: HashMap<String, u64>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsInner {
                counters: HashMap::new(),
                start_time: Instant::now(),
            })),
        }
    }

    /// Increment a counter
    pub async fn increment(&self, name: &str, value: u64) {
        let mut inner = self.inner.write().await;
        let counter = inner.counters.entry(name.to_string()).or_insert(0);
        *counter += value;
    }

    /// Get specific counter
    pub async fn get_counter(&self, name: &str) -> u64 {
        let inner = self.inner.read().await;
        inner.counters.get(name).copied().unwrap_or(0)
    }

    /// Get all metrics as JSON-serializable format
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.read().await;
        MetricsSnapshot {
            counters: inner.counters.clone(),
            uptime_secs: inner.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub counters: HashMap<String, u64>,
    pub uptime_secs: u64,
}

/// Predefined metric names
pub mod metrics {
    // Bot lifecycle
    pub const BOT_CREATED: &str = "bot_created_total";
    pub const BOT_UPDATED: &str = "bot_updated_total";
    pub const BOT_DELETED: &str = "bot_deleted_total";

    // Mirror propagation
    pub const MIRROR_WRITE_FAILED: &str = "mirror_write_failed_total";
    pub const MIRROR_DELETE_FAILED: &str = "mirror_delete_failed_total";

    // Session state
    pub const SESSION_PUBLISHED: &str = "session_published_total";

    // Audit trail
    pub const AUDIT_APPENDED: &str = "audit_appended_total";
    pub const AUDIT_QUERIES: &str = "audit_queries_total";
    pub const STREAK_ANALYSES: &str = "streak_analyses_total";
}
