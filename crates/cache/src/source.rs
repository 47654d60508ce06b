//! The remote data access collaborator.
//!
//! [`RemoteStore`] is what the cache layer calls to read and write the
//! authoritative data. [`PgStore`] implements it over the Postgres
//! repositories; tests substitute an in-memory store.

use async_trait::async_trait;
use tasklists_core::list::{List, ListPatch, NewList};
use tasklists_core::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use tasklists_core::types::{DbId, EntityKind};
use tasklists_db::repositories::{ListRepo, TaskRepo};
use tasklists_db::DbPool;

use crate::error::StoreError;

#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    // -- lists --------------------------------------------------------------

    async fn get_all_lists(&self) -> Result<Vec<List>, StoreError>;
    async fn get_list_by_id(&self, id: DbId) -> Result<Option<List>, StoreError>;
    async fn create_list(&self, input: &NewList) -> Result<List, StoreError>;
    async fn update_list(&self, id: DbId, patch: &ListPatch) -> Result<List, StoreError>;
    async fn delete_list(&self, id: DbId) -> Result<(), StoreError>;
    async fn search_lists_by_name(&self, term: &str) -> Result<Vec<List>, StoreError>;
    async fn get_recent_lists(&self, limit: u32) -> Result<Vec<List>, StoreError>;

    // -- tasks --------------------------------------------------------------

    async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError>;
    async fn get_task_by_id(&self, id: DbId) -> Result<Option<Task>, StoreError>;
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError>;
    async fn update_task(&self, id: DbId, patch: &TaskPatch) -> Result<Task, StoreError>;
    async fn delete_task(&self, id: DbId) -> Result<(), StoreError>;
    async fn toggle_task_completion(&self, id: DbId, is_completed: bool)
        -> Result<Task, StoreError>;
    async fn search_tasks_by_name(&self, term: &str) -> Result<Vec<Task>, StoreError>;
    async fn get_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StoreError>;
    async fn get_tasks_by_priority(&self, priority: TaskPriority)
        -> Result<Vec<Task>, StoreError>;
    async fn get_upcoming_tasks(&self) -> Result<Vec<Task>, StoreError>;
    async fn get_completed_tasks(&self) -> Result<Vec<Task>, StoreError>;
    async fn get_tasks_by_list_id(&self, list_id: DbId) -> Result<Vec<Task>, StoreError>;
}

/// [`RemoteStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn list_not_found(id: DbId) -> StoreError {
    StoreError::NotFound {
        entity: EntityKind::List,
        id,
    }
}

fn task_not_found(id: DbId) -> StoreError {
    StoreError::NotFound {
        entity: EntityKind::Task,
        id,
    }
}

#[async_trait]
impl RemoteStore for PgStore {
    async fn get_all_lists(&self) -> Result<Vec<List>, StoreError> {
        Ok(ListRepo::list_all(&self.pool).await?)
    }

    async fn get_list_by_id(&self, id: DbId) -> Result<Option<List>, StoreError> {
        Ok(ListRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_list(&self, input: &NewList) -> Result<List, StoreError> {
        Ok(ListRepo::create(&self.pool, input).await?)
    }

    async fn update_list(&self, id: DbId, patch: &ListPatch) -> Result<List, StoreError> {
        ListRepo::update(&self.pool, id, patch)
            .await?
            .ok_or_else(|| list_not_found(id))
    }

    async fn delete_list(&self, id: DbId) -> Result<(), StoreError> {
        if ListRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(list_not_found(id))
        }
    }

    async fn search_lists_by_name(&self, term: &str) -> Result<Vec<List>, StoreError> {
        Ok(ListRepo::search_by_name(&self.pool, term).await?)
    }

    async fn get_recent_lists(&self, limit: u32) -> Result<Vec<List>, StoreError> {
        Ok(ListRepo::list_recent(&self.pool, i64::from(limit)).await?)
    }

    async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_all(&self.pool).await?)
    }

    async fn get_task_by_id(&self, id: DbId) -> Result<Option<Task>, StoreError> {
        Ok(TaskRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
        Ok(TaskRepo::create(&self.pool, input).await?)
    }

    async fn update_task(&self, id: DbId, patch: &TaskPatch) -> Result<Task, StoreError> {
        TaskRepo::update(&self.pool, id, patch)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    async fn delete_task(&self, id: DbId) -> Result<(), StoreError> {
        if TaskRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(task_not_found(id))
        }
    }

    async fn toggle_task_completion(
        &self,
        id: DbId,
        is_completed: bool,
    ) -> Result<Task, StoreError> {
        TaskRepo::set_completed(&self.pool, id, is_completed)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    async fn search_tasks_by_name(&self, term: &str) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::search_by_name(&self.pool, term).await?)
    }

    async fn get_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_by_status(&self.pool, status).await?)
    }

    async fn get_tasks_by_priority(
        &self,
        priority: TaskPriority,
    ) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_by_priority(&self.pool, priority).await?)
    }

    async fn get_upcoming_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_upcoming(&self.pool).await?)
    }

    async fn get_completed_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_completed(&self.pool).await?)
    }

    async fn get_tasks_by_list_id(&self, list_id: DbId) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_by_list(&self.pool, list_id).await?)
    }
}
