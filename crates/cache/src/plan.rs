//! Which cache keys a mutation touches.
//!
//! The fan-out is computed up front from the operation and the keys
//! currently cached, so every affected key is snapshotted, updated and
//! rolled back together.

use tasklists_core::types::DbId;

use crate::key::CacheKey;
use crate::status::MutationKind;

/// Affected keys for `kind`, in the order they are snapshotted.
///
/// - list operations touch only [`CacheKey::Lists`];
/// - creating a task touches [`CacheKey::Tasks`] and the new task's
///   list-scoped key (seeding it if absent);
/// - other task operations touch [`CacheKey::Tasks`], `list_id`'s scoped
///   key when known, and every list-scoped key currently cached, since the
///   task may appear in any of them.
pub fn affected_keys(
    kind: MutationKind,
    list_id: Option<DbId>,
    cached: &[CacheKey],
) -> Vec<CacheKey> {
    match kind {
        MutationKind::CreateList | MutationKind::UpdateList | MutationKind::DeleteList => {
            vec![CacheKey::Lists]
        }
        MutationKind::CreateTask => {
            let mut keys = vec![CacheKey::Tasks];
            if let Some(list_id) = list_id.filter(|id| *id > 0) {
                keys.push(CacheKey::TasksByList(list_id));
            }
            keys
        }
        MutationKind::UpdateTask | MutationKind::DeleteTask | MutationKind::ToggleTaskCompletion => {
            let mut scoped: Vec<CacheKey> = cached
                .iter()
                .filter(|k| k.list_scope().is_some())
                .cloned()
                .chain(list_id.map(CacheKey::TasksByList))
                .collect();
            scoped.sort();
            scoped.dedup();

            let mut keys = vec![CacheKey::Tasks];
            keys.extend(scoped);
            keys
        }
    }
}
