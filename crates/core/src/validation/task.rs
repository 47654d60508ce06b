//! Task payload rules.

use crate::task::{NewTask, TaskPatch};

use super::date::{is_valid_due_date, DUE_DATE_MESSAGE};
use super::rules::ValidationErrors;

/// Maximum length of a task name, in characters.
pub const TASK_NAME_MAX_LEN: usize = 100;

/// Maximum length of a task description, in characters.
pub const TASK_DESCRIPTION_MAX_LEN: usize = 500;

fn check_name(name: &str, errors: &mut ValidationErrors) {
    let len = name.chars().count();
    if len == 0 {
        errors.push("name", "required", "Task name is required");
    } else if len > TASK_NAME_MAX_LEN {
        errors.push("name", "max_length", "Task name too long");
    }
}

fn check_description(description: &str, errors: &mut ValidationErrors) {
    if description.chars().count() > TASK_DESCRIPTION_MAX_LEN {
        errors.push("description", "max_length", "Description too long");
    }
}

fn check_due_date(due_date: &str, errors: &mut ValidationErrors) {
    if !is_valid_due_date(due_date) {
        errors.push("due_date", "date", DUE_DATE_MESSAGE);
    }
}

/// Empty strings mean "not set" for the optional text fields.
fn blank_to_none(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Validate a creation payload.
///
/// The returned value has a trimmed name and `None` in place of empty
/// `description`, `image` and `due_date` strings.
pub fn validate_new_task(input: &NewTask) -> Result<NewTask, ValidationErrors> {
    let name = input.name.trim().to_string();
    let mut errors = ValidationErrors::default();

    check_name(&name, &mut errors);
    if let Some(description) = &input.description {
        check_description(description, &mut errors);
    }
    if let Some(due_date) = &input.due_date {
        check_due_date(due_date, &mut errors);
    }
    if input.list_id <= 0 {
        errors.push("list_id", "positive", "List ID must be positive");
    }

    errors.into_result(NewTask {
        name,
        description: blank_to_none(&input.description),
        image: blank_to_none(&input.image),
        status: input.status,
        priority: input.priority,
        is_completed: input.is_completed,
        due_date: blank_to_none(&input.due_date),
        list_id: input.list_id,
    })
}

/// Validate a partial update against the same per-field bounds as creation.
///
/// Empty strings are kept as-is in the patch: they clear the field when the
/// patch is applied.
pub fn validate_task_patch(patch: &TaskPatch) -> Result<TaskPatch, ValidationErrors> {
    let name = patch.name.as_deref().map(str::trim).map(str::to_string);
    let mut errors = ValidationErrors::default();

    if let Some(name) = &name {
        check_name(name, &mut errors);
    }
    if let Some(description) = &patch.description {
        check_description(description, &mut errors);
    }
    if let Some(due_date) = &patch.due_date {
        check_due_date(due_date, &mut errors);
    }

    errors.into_result(TaskPatch {
        name,
        ..patch.clone()
    })
}
