use chrono::{DateTime, Utc};
use kvmon_storage::MetricStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetricStore>,
    /// Number of pollers started, reported by `/health`.
    pub target_count: usize,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<MetricStore>, target_count: usize) -> Self {
        Self {
            store,
            target_count,
            start_time: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
