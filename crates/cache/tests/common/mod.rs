#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, MutexGuard};

use tasklists_cache::{
    CacheConfig, MutationController, NegativeCounter, QueryCache, QueryService, RemoteStore,
    StoreError,
};
use tasklists_core::list::{List, ListPatch, NewList};
use tasklists_core::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use tasklists_core::types::{DbId, EntityKind};
use tasklists_events::CacheEventBus;

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    lists: Vec<List>,
    tasks: Vec<Task>,
    next_id: DbId,
}

/// [`RemoteStore`] over two vectors.
///
/// Writes can be made to fail with [`fail_writes`](Self::fail_writes) or
/// [`fail_next_writes`](Self::fail_next_writes) and
/// held in flight with [`hold_writes`](Self::hold_writes).
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_writes: AtomicBool,
    failing_writes: AtomicUsize,
    fail_reads: AtomicBool,
    gate: Mutex<()>,
    reads: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_list(&self, name: &str) -> List {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let now = Utc::now();
        let list = List {
            id: state.next_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.lists.push(list.clone());
        list
    }

    pub async fn seed_task(&self, name: &str, list_id: DbId) -> Task {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let task = new_task_row(state.next_id, &NewTask::new(name, list_id));
        state.tasks.push(task.clone());
        task
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail only the next `count` writes.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Block every write until the returned guard is dropped.
    pub async fn hold_writes(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub async fn lists(&self) -> Vec<List> {
        self.state.lock().await.lists.clone()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }

    async fn write(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        drop(self.gate.lock().await);
        let one_off = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if one_off || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        Ok(self.state.lock().await)
    }

    async fn read(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        Ok(self.state.lock().await)
    }
}

fn new_task_row(id: DbId, input: &NewTask) -> Task {
    let now = Utc::now();
    Task {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        image: input.image.clone(),
        status: input.status,
        priority: input.priority,
        is_completed: input.is_completed.unwrap_or(false),
        due_date: input.due_date.clone(),
        list_id: input.list_id,
        created_at: now,
        updated_at: now,
    }
}

fn not_found(entity: EntityKind, id: DbId) -> StoreError {
    StoreError::NotFound { entity, id }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn get_all_lists(&self) -> Result<Vec<List>, StoreError> {
        Ok(self.read().await?.lists.clone())
    }

    async fn get_list_by_id(&self, id: DbId) -> Result<Option<List>, StoreError> {
        Ok(self.read().await?.lists.iter().find(|l| l.id == id).cloned())
    }

    async fn create_list(&self, input: &NewList) -> Result<List, StoreError> {
        let mut state = self.write().await?;
        state.next_id += 1;
        let now = Utc::now();
        let list = List {
            id: state.next_id,
            name: input.name.clone(),
            created_at: now,
            updated_at: now,
        };
        state.lists.push(list.clone());
        Ok(list)
    }

    async fn update_list(&self, id: DbId, patch: &ListPatch) -> Result<List, StoreError> {
        let mut state = self.write().await?;
        let list = state
            .lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found(EntityKind::List, id))?;
        list.apply_patch(patch);
        list.updated_at = Utc::now();
        Ok(list.clone())
    }

    async fn delete_list(&self, id: DbId) -> Result<(), StoreError> {
        let mut state = self.write().await?;
        let before = state.lists.len();
        state.lists.retain(|l| l.id != id);
        if state.lists.len() == before {
            return Err(not_found(EntityKind::List, id));
        }
        Ok(())
    }

    async fn search_lists_by_name(&self, term: &str) -> Result<Vec<List>, StoreError> {
        let term = term.to_lowercase();
        let state = self.read().await?;
        Ok(state
            .lists
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn get_recent_lists(&self, limit: u32) -> Result<Vec<List>, StoreError> {
        let state = self.read().await?;
        let mut lists = state.lists.clone();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        lists.truncate(limit as usize);
        Ok(lists)
    }

    async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.read().await?.tasks.clone())
    }

    async fn get_task_by_id(&self, id: DbId) -> Result<Option<Task>, StoreError> {
        Ok(self.read().await?.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
        let mut state = self.write().await?;
        state.next_id += 1;
        let task = new_task_row(state.next_id, input);
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: DbId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let mut state = self.write().await?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(EntityKind::Task, id))?;
        task.apply_patch(patch);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: DbId) -> Result<(), StoreError> {
        let mut state = self.write().await?;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(not_found(EntityKind::Task, id));
        }
        Ok(())
    }

    async fn toggle_task_completion(
        &self,
        id: DbId,
        is_completed: bool,
    ) -> Result<Task, StoreError> {
        self.update_task(id, &TaskPatch::completion(is_completed))
            .await
    }

    async fn search_tasks_by_name(&self, term: &str) -> Result<Vec<Task>, StoreError> {
        let term = term.to_lowercase();
        let state = self.read().await?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn get_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StoreError> {
        let state = self.read().await?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.status == Some(status))
            .cloned()
            .collect())
    }

    async fn get_tasks_by_priority(
        &self,
        priority: TaskPriority,
    ) -> Result<Vec<Task>, StoreError> {
        let state = self.read().await?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.priority == Some(priority))
            .cloned()
            .collect())
    }

    async fn get_upcoming_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let today = today();
        let state = self.read().await?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| {
                !t.is_completed
                    && t.due_date
                        .as_deref()
                        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                        .is_some_and(|d| d > today)
            })
            .cloned()
            .collect())
    }

    async fn get_completed_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let state = self.read().await?;
        Ok(state.tasks.iter().filter(|t| t.is_completed).cloned().collect())
    }

    async fn get_tasks_by_list_id(&self, list_id: DbId) -> Result<Vec<Task>, StoreError> {
        let state = self.read().await?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.list_id == list_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Everything a test needs, wired the way the binary wires it.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub cache: Arc<QueryCache>,
    pub bus: Arc<CacheEventBus>,
    pub query: Arc<QueryService<InMemoryStore>>,
    pub controller: Arc<MutationController<InMemoryStore>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::new())
    }

    pub fn with_store(store: InMemoryStore) -> Self {
        Self::with_retries(store, 0)
    }

    /// Like [`with_store`](Self::with_store), with `retries` extra attempts
    /// per failed mutation.
    pub fn with_retries(store: InMemoryStore, retries: u32) -> Self {
        let store = Arc::new(store);
        let cache = Arc::new(QueryCache::new());
        let bus = Arc::new(CacheEventBus::default());
        let query = Arc::new(QueryService::new(
            Arc::clone(&cache),
            Arc::clone(&store),
            CacheConfig::default(),
        ));
        let controller = Arc::new(MutationController::new(
            Arc::clone(&cache),
            Arc::clone(&store),
            Arc::new(NegativeCounter::starting_at(-1)),
            Arc::clone(&bus),
        )
        .with_retries(retries));
        Self {
            store,
            cache,
            bus,
            query,
            controller,
        }
    }
}
