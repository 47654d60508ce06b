//! Cached read path.
//!
//! Reads never merge partial data into the cache: they fetch a whole value
//! from the store and populate the key with it.

use std::sync::Arc;

use tasklists_core::filter::RecentLimit;
use tasklists_core::list::List;
use tasklists_core::task::{Task, TaskPriority, TaskStatus};
use tasklists_core::types::{DbId, EntityKind};

use crate::config::CacheConfig;
use crate::error::StoreError;
use crate::key::{CacheKey, CacheValue};
use crate::source::RemoteStore;
use crate::store::QueryCache;

pub struct QueryService<S> {
    cache: Arc<QueryCache>,
    store: Arc<S>,
    config: CacheConfig,
}

impl<S: RemoteStore> QueryService<S> {
    pub fn new(cache: Arc<QueryCache>, store: Arc<S>, config: CacheConfig) -> Self {
        Self {
            cache,
            store,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Fetch the value for `key` straight from the store.
    pub async fn load(&self, key: &CacheKey) -> Result<CacheValue, StoreError> {
        let store = &self.store;
        let value = match key {
            CacheKey::Lists => CacheValue::Lists(store.get_all_lists().await?),
            CacheKey::List(id) => CacheValue::List(store.get_list_by_id(*id).await?),
            CacheKey::ListSearch(term) => {
                CacheValue::Lists(store.search_lists_by_name(term).await?)
            }
            CacheKey::RecentLists(limit) => {
                CacheValue::Lists(store.get_recent_lists(*limit).await?)
            }
            CacheKey::Tasks => CacheValue::Tasks(store.get_all_tasks().await?),
            CacheKey::TasksByList(list_id) => {
                CacheValue::Tasks(store.get_tasks_by_list_id(*list_id).await?)
            }
            CacheKey::Task(id) => CacheValue::Task(store.get_task_by_id(*id).await?),
            CacheKey::TaskSearch(term) => {
                CacheValue::Tasks(store.search_tasks_by_name(term).await?)
            }
            CacheKey::TasksByStatus(status) => {
                CacheValue::Tasks(store.get_tasks_by_status(*status).await?)
            }
            CacheKey::TasksByPriority(priority) => {
                CacheValue::Tasks(store.get_tasks_by_priority(*priority).await?)
            }
            CacheKey::UpcomingTasks => CacheValue::Tasks(store.get_upcoming_tasks().await?),
            CacheKey::CompletedTasks => CacheValue::Tasks(store.get_completed_tasks().await?),
        };
        Ok(value)
    }

    async fn load_with_retry(&self, key: &CacheKey) -> Result<CacheValue, StoreError> {
        let mut attempt = 0;
        loop {
            match self.load(key).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.query_retries => {
                    attempt += 1;
                    tracing::warn!(%key, attempt, error = %e, "Query failed, retrying");
                }
                Err(e) => {
                    tracing::error!(%key, error = %e, "Query failed");
                    return Err(e);
                }
            }
        }
    }

    /// Serve `key` from the cache if fresh, otherwise fetch and populate.
    ///
    /// If a mutation held or invalidated the key while the fetch was in
    /// flight, the fetched value is discarded and the cached value is
    /// returned instead.
    pub async fn fetch(&self, key: CacheKey) -> Result<CacheValue, StoreError> {
        if self.cache.is_fresh(&key, self.config.stale_time).await {
            if let Some(value) = self.cache.get(&key).await {
                return Ok(value);
            }
        }

        let seen = self.cache.generation(&key).await;
        let value = self.load_with_retry(&key).await?;
        if !self.cache.populate(key.clone(), value.clone(), seen).await {
            if let Some(current) = self.cache.get(&key).await {
                return Ok(current);
            }
        }
        Ok(value)
    }

    /// Refetch `key` regardless of freshness. Returns whether the cache
    /// accepted the result.
    pub async fn refresh(&self, key: &CacheKey) -> Result<bool, StoreError> {
        let seen = self.cache.generation(key).await;
        let value = self.load_with_retry(key).await?;
        Ok(self.cache.populate(key.clone(), value, seen).await)
    }

    /// Refetch every stale, unpaused key of `entity`. Failures are logged
    /// and leave the key stale. Returns the number of keys refreshed.
    pub async fn refresh_stale(&self, entity: EntityKind) -> usize {
        let mut refreshed = 0;
        for key in self.cache.stale_keys(entity).await {
            match self.refresh(&key).await {
                Ok(true) => refreshed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(%key, error = %e, "Refetch failed, key stays stale");
                }
            }
        }
        refreshed
    }

    // -- lists --------------------------------------------------------------

    pub async fn lists(&self) -> Result<Vec<List>, StoreError> {
        Ok(self.fetch(CacheKey::Lists).await?.into_lists().unwrap_or_default())
    }

    /// `None` for a non-positive id without asking the store.
    pub async fn list(&self, id: DbId) -> Result<Option<List>, StoreError> {
        if id <= 0 {
            return Ok(None);
        }
        Ok(self.fetch(CacheKey::List(id)).await?.into_list())
    }

    /// Lists whose name contains `term`. A blank term yields nothing.
    pub async fn search_lists(&self, term: &str) -> Result<Vec<List>, StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let key = CacheKey::ListSearch(term.to_string());
        Ok(self.fetch(key).await?.into_lists().unwrap_or_default())
    }

    pub async fn recent_lists(&self, limit: RecentLimit) -> Result<Vec<List>, StoreError> {
        let key = CacheKey::RecentLists(limit.get());
        Ok(self.fetch(key).await?.into_lists().unwrap_or_default())
    }

    // -- tasks --------------------------------------------------------------

    pub async fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.fetch(CacheKey::Tasks).await?.into_tasks().unwrap_or_default())
    }

    pub async fn task(&self, id: DbId) -> Result<Option<Task>, StoreError> {
        if id <= 0 {
            return Ok(None);
        }
        Ok(self.fetch(CacheKey::Task(id)).await?.into_task())
    }

    pub async fn tasks_by_list(&self, list_id: DbId) -> Result<Vec<Task>, StoreError> {
        if list_id <= 0 {
            return Ok(Vec::new());
        }
        let key = CacheKey::TasksByList(list_id);
        Ok(self.fetch(key).await?.into_tasks().unwrap_or_default())
    }

    pub async fn search_tasks(&self, term: &str) -> Result<Vec<Task>, StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let key = CacheKey::TaskSearch(term.to_string());
        Ok(self.fetch(key).await?.into_tasks().unwrap_or_default())
    }

    pub async fn tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StoreError> {
        let key = CacheKey::TasksByStatus(status);
        Ok(self.fetch(key).await?.into_tasks().unwrap_or_default())
    }

    pub async fn tasks_by_priority(
        &self,
        priority: TaskPriority,
    ) -> Result<Vec<Task>, StoreError> {
        let key = CacheKey::TasksByPriority(priority);
        Ok(self.fetch(key).await?.into_tasks().unwrap_or_default())
    }

    pub async fn upcoming_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let key = CacheKey::UpcomingTasks;
        Ok(self.fetch(key).await?.into_tasks().unwrap_or_default())
    }

    pub async fn completed_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let key = CacheKey::CompletedTasks;
        Ok(self.fetch(key).await?.into_tasks().unwrap_or_default())
    }
}
