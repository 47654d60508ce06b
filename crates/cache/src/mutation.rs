//! Optimistic write path.
//!
//! Every trigger runs the same protocol:
//!
//! 1. validate the payload; on failure nothing else happens;
//! 2. under one cache write guard, pause the affected keys, snapshot them
//!    and install the expected result;
//! 3. call the store;
//! 4. on failure restore the snapshot; either way resume the keys,
//!    invalidate the entity kind and publish the invalidation so the
//!    refetcher replaces optimistic content with server data.
//!
//! A retryable failure starts the protocol over from step 2, up to the
//! configured number of retries.
//!
//! Placeholder records are never reconciled with the server's response;
//! the refetch after invalidation replaces them wholesale.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tasklists_core::list::{List, ListPatch, NewList};
use tasklists_core::task::{NewTask, Task, TaskPatch};
use tasklists_core::types::{is_temporary_id, DbId};
use tasklists_core::validation::{
    validate_list_patch, validate_new_list, validate_new_task, validate_task_patch,
};
use tasklists_events::bus::{MUTATION_CONFIRMED, MUTATION_ROLLED_BACK};
use tasklists_events::{CacheEvent, CacheEventBus};
use tokio::sync::watch;

use crate::error::{MutationError, StoreError};
use crate::optimistic::OptimisticChange;
use crate::phase::{MutationPhase, PhaseTracker};
use crate::plan::affected_keys;
use crate::source::RemoteStore;
use crate::status::{MutationKind, MutationStatus, MutationTracker};
use crate::store::QueryCache;
use crate::temp_id::TempIdGenerator;

pub struct MutationController<S> {
    cache: Arc<QueryCache>,
    store: Arc<S>,
    temp_ids: Arc<dyn TempIdGenerator>,
    bus: Arc<CacheEventBus>,
    tracker: MutationTracker,
    retries: u32,
}

/// One in-flight mutation: its kind and where it is in the protocol.
struct MutationRun {
    kind: MutationKind,
    phase: PhaseTracker,
}

impl<S: RemoteStore> MutationController<S> {
    pub fn new(
        cache: Arc<QueryCache>,
        store: Arc<S>,
        temp_ids: Arc<dyn TempIdGenerator>,
        bus: Arc<CacheEventBus>,
    ) -> Self {
        Self {
            cache,
            store,
            temp_ids,
            bus,
            tracker: MutationTracker::new(),
            retries: 0,
        }
    }

    /// Allow `retries` extra attempts after a retryable remote failure.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Latest status of the `kind` trigger.
    pub fn status(&self, kind: MutationKind) -> MutationStatus {
        self.tracker.current(kind)
    }

    /// Watch the `kind` trigger's status as it changes.
    pub fn subscribe(&self, kind: MutationKind) -> watch::Receiver<MutationStatus> {
        self.tracker.subscribe(kind)
    }

    /// Clear a trigger's status back to idle, e.g. after the error was shown.
    pub fn reset(&self, kind: MutationKind) {
        self.tracker.reset(kind);
    }

    // -- lists --------------------------------------------------------------

    /// Create a list. A placeholder with a negative id appears in the cache
    /// until the post-settle refetch.
    pub async fn create_list(&self, input: NewList) -> Result<List, MutationError> {
        let input = validate_new_list(&input)?;
        let now = Utc::now();
        let placeholder = List {
            id: self.temp_ids.next_id(),
            name: input.name.clone(),
            created_at: now,
            updated_at: now,
        };

        self.execute(
            MutationKind::CreateList,
            None,
            OptimisticChange::InsertList(placeholder),
            move |store| {
                let input = input.clone();
                async move { store.create_list(&input).await }
            },
        )
        .await
    }

    pub async fn update_list(&self, id: DbId, patch: ListPatch) -> Result<List, MutationError> {
        let patch = validate_list_patch(&patch)?;
        let change = OptimisticChange::PatchList {
            id,
            patch: patch.clone(),
        };
        self.execute(MutationKind::UpdateList, None, change, move |store| {
            let patch = patch.clone();
            async move { store.update_list(id, &patch).await }
        })
        .await
    }

    /// Delete a list. Its tasks are left in place.
    pub async fn delete_list(&self, id: DbId) -> Result<(), MutationError> {
        self.execute(
            MutationKind::DeleteList,
            None,
            OptimisticChange::RemoveList(id),
            move |store| async move { store.delete_list(id).await },
        )
        .await
    }

    // -- tasks --------------------------------------------------------------

    /// Create a task. The placeholder is added to the global task
    /// collection and to its list's collection.
    pub async fn create_task(&self, input: NewTask) -> Result<Task, MutationError> {
        let input = validate_new_task(&input)?;
        let now = Utc::now();
        let placeholder = Task {
            id: self.temp_ids.next_id(),
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
        };

        let list_id = input.list_id;
        self.execute(
            MutationKind::CreateTask,
            Some(list_id),
            OptimisticChange::InsertTask(placeholder),
            move |store| {
                let input = input.clone();
                async move { store.create_task(&input).await }
            },
        )
        .await
    }

    pub async fn update_task(&self, id: DbId, patch: TaskPatch) -> Result<Task, MutationError> {
        let patch = validate_task_patch(&patch)?;
        let change = OptimisticChange::PatchTask {
            id,
            patch: patch.clone(),
        };
        self.execute(MutationKind::UpdateTask, None, change, move |store| {
            let patch = patch.clone();
            async move { store.update_task(id, &patch).await }
        })
        .await
    }

    pub async fn delete_task(&self, id: DbId) -> Result<(), MutationError> {
        self.execute(
            MutationKind::DeleteTask,
            None,
            OptimisticChange::RemoveTask(id),
            move |store| async move { store.delete_task(id).await },
        )
        .await
    }

    /// A task update restricted to the completion flag.
    pub async fn toggle_task_completion(
        &self,
        id: DbId,
        is_completed: bool,
    ) -> Result<Task, MutationError> {
        let change = OptimisticChange::PatchTask {
            id,
            patch: TaskPatch::completion(is_completed),
        };
        self.execute(MutationKind::ToggleTaskCompletion, None, change, move |store| async move {
            store.toggle_task_completion(id, is_completed).await
        })
        .await
    }

    // -- protocol -----------------------------------------------------------

    fn step(&self, run: &mut MutationRun, next: MutationPhase) {
        match run.phase.advance(next) {
            Ok(phase) => self.tracker.set_phase(run.kind, phase),
            Err(e) => tracing::error!(operation = run.kind.as_str(), error = %e, "Phase error"),
        }
    }

    /// Run the protocol for one trigger, retrying retryable failures.
    async fn execute<T, F, Fut>(
        &self,
        kind: MutationKind,
        list_id: Option<DbId>,
        change: OptimisticChange,
        call: F,
    ) -> Result<T, MutationError>
    where
        F: Fn(Arc<S>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let temp_id = Some(change.target_id()).filter(|id| is_temporary_id(*id));
        self.tracker.start(kind, temp_id);

        let mut attempt = 0;
        let result = loop {
            match self
                .attempt(kind, list_id, &change, call(Arc::clone(&self.store)))
                .await
            {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation = kind.as_str(),
                        attempt,
                        error = %e,
                        "Mutation failed, retrying"
                    );
                }
                result => break result,
            }
        };

        self.tracker
            .finish(kind, result.as_ref().err().map(ToString::to_string));
        result.map_err(MutationError::from)
    }

    /// One full pass: begin and apply, resolve, roll back or confirm, settle.
    async fn attempt<T, Fut>(
        &self,
        kind: MutationKind,
        list_id: Option<DbId>,
        change: &OptimisticChange,
        call: Fut,
    ) -> Result<T, StoreError>
    where
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let entity = kind.entity();
        let target_id = change.target_id();

        let mut run = MutationRun {
            kind,
            phase: PhaseTracker::default(),
        };

        // Begin + apply: one write guard, no suspension in between.
        self.step(&mut run, MutationPhase::Snapshotting);
        let (keys, snapshot) = self
            .cache
            .begin_mutation(
                |cached| affected_keys(kind, list_id, cached),
                |_, current| change.apply(current),
            )
            .await;
        self.step(&mut run, MutationPhase::OptimisticallyApplied);
        tracing::debug!(
            operation = kind.as_str(),
            target_id,
            keys = keys.len(),
            "Applied optimistic change"
        );

        // Resolve.
        let result = call.await;
        match &result {
            Ok(_) => {
                self.step(&mut run, MutationPhase::SettledSuccess);
                self.bus.publish(
                    CacheEvent::new(MUTATION_CONFIRMED, entity)
                        .with_entity_id(target_id)
                        .with_payload(serde_json::json!({ "operation": kind.as_str() })),
                );
            }
            Err(e) => {
                self.cache.restore(snapshot).await;
                self.step(&mut run, MutationPhase::SettledRollback);
                tracing::warn!(
                    operation = kind.as_str(),
                    target_id,
                    error = %e,
                    "Remote call failed, optimistic change rolled back"
                );
                self.bus.publish(
                    CacheEvent::new(MUTATION_ROLLED_BACK, entity)
                        .with_entity_id(target_id)
                        .with_payload(serde_json::json!({
                            "operation": kind.as_str(),
                            "error": e.to_string(),
                        })),
                );
            }
        }

        // Settle: always resume and invalidate.
        self.cache.end_mutation(&keys).await;
        self.cache.invalidate(entity).await;
        self.step(&mut run, MutationPhase::Invalidated);
        self.bus.publish(CacheEvent::invalidated(entity).with_entity_id(target_id));

        result
    }
}
