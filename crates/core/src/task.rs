//! Task entity, its enumerations, creation input and partial-update patch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
    feature = "sqlx",
    derive(sqlx::Type),
    sqlx(type_name = "text", rename_all = "snake_case")
)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| "Invalid status".to_string())
    }
}

/// How urgent a task is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
    feature = "sqlx",
    derive(sqlx::Type),
    sqlx(type_name = "text", rename_all = "snake_case")
)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| "Invalid priority".to_string())
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `tasks` table, or an optimistic stand-in for one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Task {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub is_completed: bool,
    /// Calendar date rendered as `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub list_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Shallow-merge `patch` into this task.
    ///
    /// Present fields overwrite, absent fields are kept. An empty string for
    /// `description`, `image` or `due_date` clears the field.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = non_empty(description);
        }
        if let Some(image) = &patch.image {
            self.image = non_empty(image);
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
        if let Some(priority) = patch.priority {
            self.priority = Some(priority);
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = non_empty(due_date);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    /// `YYYY-MM-DD`, or empty for "no date".
    #[serde(default)]
    pub due_date: Option<String>,
    pub list_id: DbId,
}

impl NewTask {
    pub fn new(name: impl Into<String>, list_id: DbId) -> Self {
        Self {
            name: name.into(),
            list_id,
            ..Default::default()
        }
    }
}

/// DTO for updating an existing task. All fields are optional.
///
/// `list_id` is deliberately absent: a task cannot be moved between lists
/// through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TaskPatch {
    /// Patch touching only the completion flag.
    pub fn completion(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        let now = chrono::Utc::now();
        Task {
            id: 5,
            name: "Buy milk".to_string(),
            description: Some("2 litres".to_string()),
            image: None,
            status: Some(TaskStatus::Pending),
            priority: Some(TaskPriority::Low),
            is_completed: false,
            due_date: Some("2024-05-01".to_string()),
            list_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert_eq!("done".parse::<TaskStatus>(), Err("Invalid status".to_string()));
    }

    #[test]
    fn priority_rejects_unknown_value() {
        assert_eq!("high".parse::<TaskPriority>(), Ok(TaskPriority::High));
        assert!("urgent".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn apply_patch_merges_present_fields_only() {
        let mut task = sample();
        task.apply_patch(&TaskPatch {
            status: Some(TaskStatus::Completed),
            is_completed: Some(true),
            ..Default::default()
        });

        assert_eq!(task.status, Some(TaskStatus::Completed));
        assert!(task.is_completed);
        assert_eq!(task.name, "Buy milk");
        assert_eq!(task.description.as_deref(), Some("2 litres"));
        assert_eq!(task.priority, Some(TaskPriority::Low));
    }

    #[test]
    fn empty_strings_clear_optional_fields() {
        let mut task = sample();
        task.apply_patch(&TaskPatch {
            description: Some(String::new()),
            due_date: Some(String::new()),
            ..Default::default()
        });
        assert!(task.description.is_none());
        assert!(task.due_date.is_none());
    }

    #[test]
    fn completion_patch_only_sets_flag() {
        let patch = TaskPatch::completion(true);
        assert_eq!(patch.is_completed, Some(true));
        assert!(patch.name.is_none());
        assert!(!patch.is_empty());
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn new_task_deserializes_with_missing_optionals() {
        let task: NewTask =
            serde_json::from_value(serde_json::json!({"name": "x", "list_id": 3})).unwrap();
        assert_eq!(task, NewTask::new("x", 3));
    }
}
