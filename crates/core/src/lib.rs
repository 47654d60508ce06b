//! Domain core for the task lists application.
//!
//! Everything in this crate is pure logic with no I/O:
//!
//! - [`list`], [`task`]: entity types, creation inputs and typed patches.
//! - [`validation`]: field rules deciding whether a payload may be submitted.
//! - [`filter`] / [`stats`]: local task filtering and summary counts.
//! - [`format`]: display helpers for dates.
//! - [`modal`]: the editor modal state container.

pub mod error;
pub mod filter;
pub mod format;
pub mod list;
pub mod modal;
pub mod stats;
pub mod task;
pub mod types;
pub mod validation;
