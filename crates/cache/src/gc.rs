//! Periodic eviction of idle cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::store::QueryCache;

/// Spawn a task that evicts entries unread for `gc_time`, checking every
/// `gc_time / 2`.
pub fn start_gc_sweeper(cache: Arc<QueryCache>, gc_time: Duration) -> JoinHandle<()> {
    let period = (gc_time / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = cache.evict_expired(gc_time).await;
            if evicted > 0 {
                let remaining = cache.len().await;
                tracing::debug!(evicted, remaining, "Cache sweep");
            }
        }
    })
}
