//! List entity, creation input and partial-update patch.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// A row from the `lists` table, or an optimistic stand-in for one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct List {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl List {
    /// Shallow-merge `patch` into this list. Absent fields are kept.
    pub fn apply_patch(&mut self, patch: &ListPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
    }
}

/// DTO for creating a new list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewList {
    pub name: String,
}

impl NewList {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// DTO for updating an existing list. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ListPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
