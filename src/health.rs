use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// État opérationnel du bridge, servi sur /system/health
#[derive(Debug, Serialize, Deserialize)]
pub struct BridgeHealth {
    pub uptime_seconds: u64,
    pub started_at: String,
    pub node_refreshes: u32,
    pub fact_refreshes: u32,
    pub merge_rebuilds: u32,
    pub cache_ttl_seconds: u64,
    pub snapshot_age_seconds: Option<u64>,
    pub last_error: Option<String>,
}

/// Compteurs partagés entre l'agrégateur (qui marque les rafraîchissements
/// effectifs) et la couche HTTP (qui enregistre les erreurs servies).
#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    started_at: OffsetDateTime,
    node_refreshes: Arc<AtomicU32>,
    fact_refreshes: Arc<AtomicU32>,
    merge_rebuilds: Arc<AtomicU32>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            started_at: OffsetDateTime::now_utc(),
            node_refreshes: Arc::new(AtomicU32::new(0)),
            fact_refreshes: Arc::new(AtomicU32::new(0)),
            merge_rebuilds: Arc::new(AtomicU32::new(0)),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn mark_node_refresh(&self) {
        self.node_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_fact_refresh(&self) {
        self.fact_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_merge_rebuild(&self) {
        self.merge_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, message: String) {
        *self.last_error.lock() = Some(message);
    }

    pub fn get_health(&self, cache_ttl_seconds: u64, snapshot_age_seconds: Option<u64>) -> BridgeHealth {
        BridgeHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            started_at: self.started_at.format(&Rfc3339).unwrap_or_default(),
            node_refreshes: self.node_refreshes.load(Ordering::Relaxed),
            fact_refreshes: self.fact_refreshes.load(Ordering::Relaxed),
            merge_rebuilds: self.merge_rebuilds.load(Ordering::Relaxed),
            cache_ttl_seconds,
            snapshot_age_seconds,
            last_error: self.last_error.lock().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_last_error() {
        let tracker = HealthTracker::new();
        tracker.mark_node_refresh();
        tracker.mark_fact_refresh();
        tracker.mark_fact_refresh();
        tracker.mark_merge_rebuild();
        tracker.record_error("upstream down".into());

        let health = tracker.get_health(1800, Some(42));
        assert_eq!(health.node_refreshes, 1);
        assert_eq!(health.fact_refreshes, 2);
        assert_eq!(health.merge_rebuilds, 1);
        assert_eq!(health.cache_ttl_seconds, 1800);
        assert_eq!(health.snapshot_age_seconds, Some(42));
        assert_eq!(health.last_error.as_deref(), Some("upstream down"));
    }
}
