//! Background refetch service.
//!
//! [`Refetcher`] subscribes to the [`CacheEventBus`] and, whenever a kind of
//! entity is invalidated, refetches that kind's stale keys so optimistic
//! placeholders are replaced with server data. It shuts down when the bus
//! is dropped.

use std::sync::Arc;

use tasklists_core::types::EntityKind;
use tasklists_events::{CacheEvent, CacheEventBus};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::query::QueryService;
use crate::source::RemoteStore;

pub struct Refetcher;

impl Refetcher {
    /// Run the refetch loop until the channel closes.
    pub async fn run<S: RemoteStore>(
        query: Arc<QueryService<S>>,
        mut receiver: broadcast::Receiver<CacheEvent>,
    ) {
        loop {
            match receiver.recv().await {
                Ok(event) if event.is_invalidation() => {
                    let refreshed = query.refresh_stale(event.entity).await;
                    tracing::debug!(
                        entity = %event.entity,
                        refreshed,
                        "Refetched invalidated keys"
                    );
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Refetcher lagged, refreshing all stale keys"
                    );
                    for entity in [EntityKind::List, EntityKind::Task] {
                        query.refresh_stale(entity).await;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Cache event bus closed, refetcher shutting down");
                    break;
                }
            }
        }
    }

    /// Subscribe to `bus` and run the loop on a background task.
    pub fn spawn<S: RemoteStore>(
        query: Arc<QueryService<S>>,
        bus: &CacheEventBus,
    ) -> JoinHandle<()> {
        let receiver = bus.subscribe();
        tokio::spawn(Self::run(query, receiver))
    }
}
