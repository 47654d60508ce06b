//! Payload validation for lists and tasks.
//!
//! Pure and synchronous so it can run before any optimistic cache write:
//! a payload that fails here never reaches the cache or the store.

pub mod date;
pub mod list;
pub mod rules;
pub mod task;

pub use list::{validate_list_patch, validate_new_list};
pub use rules::{FieldViolation, ValidationErrors};
pub use task::{validate_new_task, validate_task_patch};
