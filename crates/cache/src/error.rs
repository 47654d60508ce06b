//! Store and mutation errors.

use tasklists_core::error::CoreError;
use tasklists_core::types::{DbId, EntityKind};
use tasklists_core::validation::ValidationErrors;

/// Failure reported by a [`RemoteStore`](crate::source::RemoteStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: EntityKind, id: DbId },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether another attempt could succeed. A missing record stays missing.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StoreError::NotFound { .. })
    }
}

/// Error returned by a mutation trigger.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The payload was rejected before the cache was touched.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The remote call failed; the optimistic write has been rolled back.
    #[error("Data access failed: {0}")]
    DataAccess(#[from] StoreError),
}

impl MutationError {
    /// Message suitable for showing to the user.
    ///
    /// Validation failures show the first field message; anything from the
    /// store collapses to a generic notice.
    pub fn user_message(&self) -> String {
        match self {
            MutationError::Validation(errors) => errors
                .first()
                .map(|v| v.message.clone())
                .unwrap_or_else(|| "Invalid input".to_string()),
            MutationError::DataAccess(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, MutationError::Validation(_))
    }
}

impl From<MutationError> for CoreError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Validation(errors) => errors.into(),
            MutationError::DataAccess(StoreError::NotFound { entity, id }) => {
                CoreError::NotFound {
                    entity: entity.as_str(),
                    id,
                }
            }
            MutationError::DataAccess(other) => CoreError::Internal(other.to_string()),
        }
    }
}
