//! Editor modal state.
//!
//! Two independent modals: the list editor and the task editor. Opening or
//! closing one never touches the other's fields.

use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::types::DbId;

/// The list being edited in the list modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingList {
    pub id: DbId,
    pub name: String,
}

/// What the task modal was opened with: an existing task to edit, and/or
/// the list a new task should be created in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskModalData {
    pub task: Option<Task>,
    pub list_id: Option<DbId>,
}

impl TaskModalData {
    pub fn for_list(list_id: DbId) -> Self {
        Self {
            task: None,
            list_id: Some(list_id),
        }
    }

    pub fn for_task(task: Task) -> Self {
        Self {
            list_id: Some(task.list_id),
            task: Some(task),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.task.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalState {
    pub is_visible: bool,
    pub is_edit: bool,
    pub editing_list: Option<EditingList>,
    pub is_task_modal_visible: bool,
    pub task_modal_data: Option<TaskModalData>,
}

impl ModalState {
    pub fn open_create(&mut self) {
        self.is_visible = true;
        self.is_edit = false;
        self.editing_list = None;
    }

    pub fn open_edit(&mut self, list: EditingList) {
        self.is_visible = true;
        self.is_edit = true;
        self.editing_list = Some(list);
    }

    pub fn close(&mut self) {
        self.is_visible = false;
        self.is_edit = false;
        self.editing_list = None;
    }

    pub fn open_task_modal(&mut self, data: TaskModalData) {
        self.is_task_modal_visible = true;
        self.task_modal_data = Some(data);
    }

    pub fn close_task_modal(&mut self) {
        self.is_task_modal_visible = false;
        self.task_modal_data = None;
    }
}
