/// All database primary keys are PostgreSQL BIGSERIAL.
///
/// Negative values never come from the database; they mark temporary
/// records inserted optimistically by the cache layer.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Returns `true` if `id` is a client-side placeholder rather than a
/// server-assigned key.
pub fn is_temporary_id(id: DbId) -> bool {
    id < 0
}

/// The entity families the application stores.
///
/// Cache keys are grouped by kind so a write to one task can invalidate
/// every task-derived query at once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    List,
    Task,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Task => "task",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
