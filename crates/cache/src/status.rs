//! Observable status of each mutation trigger.

use std::collections::HashMap;

use serde::Serialize;
use tasklists_core::types::{DbId, EntityKind};
use tokio::sync::watch;

use crate::phase::MutationPhase;

/// The write operations the controller exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    CreateList,
    UpdateList,
    DeleteList,
    CreateTask,
    UpdateTask,
    DeleteTask,
    ToggleTaskCompletion,
}

impl MutationKind {
    pub const ALL: [MutationKind; 7] = [
        Self::CreateList,
        Self::UpdateList,
        Self::DeleteList,
        Self::CreateTask,
        Self::UpdateTask,
        Self::DeleteTask,
        Self::ToggleTaskCompletion,
    ];

    pub fn entity(self) -> EntityKind {
        match self {
            Self::CreateList | Self::UpdateList | Self::DeleteList => EntityKind::List,
            _ => EntityKind::Task,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateList => "create_list",
            Self::UpdateList => "update_list",
            Self::DeleteList => "delete_list",
            Self::CreateTask => "create_task",
            Self::UpdateTask => "update_task",
            Self::DeleteTask => "delete_task",
            Self::ToggleTaskCompletion => "toggle_task_completion",
        }
    }
}

/// Coarse state a view binds to (spinner, error banner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Latest status of one mutation trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationStatus {
    pub state: MutationState,
    pub phase: MutationPhase,
    pub last_error: Option<String>,
    /// Placeholder id of the most recent optimistic insert, if any.
    pub temp_id: Option<DbId>,
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        self.state == MutationState::Pending
    }
}

/// One `watch` channel per [`MutationKind`].
///
/// When several calls of the same kind overlap, the last one to report
/// wins.
pub struct MutationTracker {
    channels: HashMap<MutationKind, watch::Sender<MutationStatus>>,
}

impl MutationTracker {
    pub fn new() -> Self {
        let channels = MutationKind::ALL
            .into_iter()
            .map(|kind| (kind, watch::Sender::new(MutationStatus::default())))
            .collect();
        Self { channels }
    }

    fn sender(&self, kind: MutationKind) -> &watch::Sender<MutationStatus> {
        // Every kind is inserted in `new`.
        &self.channels[&kind]
    }

    pub fn current(&self, kind: MutationKind) -> MutationStatus {
        self.sender(kind).borrow().clone()
    }

    pub fn subscribe(&self, kind: MutationKind) -> watch::Receiver<MutationStatus> {
        self.sender(kind).subscribe()
    }

    pub fn start(&self, kind: MutationKind, temp_id: Option<DbId>) {
        self.sender(kind).send_modify(|status| {
            status.state = MutationState::Pending;
            status.phase = MutationPhase::Idle;
            status.temp_id = temp_id;
        });
    }

    pub fn set_phase(&self, kind: MutationKind, phase: MutationPhase) {
        self.sender(kind).send_modify(|status| status.phase = phase);
    }

    pub fn finish(&self, kind: MutationKind, error: Option<String>) {
        self.sender(kind).send_modify(|status| {
            status.state = if error.is_some() {
                MutationState::Error
            } else {
                MutationState::Success
            };
            status.last_error = error;
        });
    }

    pub fn reset(&self, kind: MutationKind) {
        self.sender(kind).send_replace(MutationStatus::default());
    }
}

impl Default for MutationTracker {
    fn default() -> Self {
        Self::new()
    }
}
