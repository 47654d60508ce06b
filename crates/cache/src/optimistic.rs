//! The optimistic edits a mutation makes to cached values.

use tasklists_core::list::{List, ListPatch};
use tasklists_core::task::{Task, TaskPatch};
use tasklists_core::types::DbId;

use crate::key::CacheValue;

/// A record held in a cached collection, addressed by id.
pub trait Record: Clone {
    fn id(&self) -> DbId;
}

impl Record for List {
    fn id(&self) -> DbId {
        self.id
    }
}

impl Record for Task {
    fn id(&self) -> DbId {
        self.id
    }
}

/// Append `record`, starting a new collection if none was cached.
pub fn append<R: Record>(records: Option<&[R]>, record: R) -> Vec<R> {
    let mut out = records.map(<[R]>::to_vec).unwrap_or_default();
    out.push(record);
    out
}

/// Run `edit` on the record with `id`. `None` if no record matches.
pub fn edit_by_id<R: Record>(records: &[R], id: DbId, edit: impl Fn(&mut R)) -> Option<Vec<R>> {
    if !records.iter().any(|r| r.id() == id) {
        return None;
    }
    Some(
        records
            .iter()
            .cloned()
            .map(|mut r| {
                if r.id() == id {
                    edit(&mut r);
                }
                r
            })
            .collect(),
    )
}

/// Drop the record with `id`. `None` if no record matches.
pub fn remove_by_id<R: Record>(records: &[R], id: DbId) -> Option<Vec<R>> {
    if !records.iter().any(|r| r.id() == id) {
        return None;
    }
    Some(records.iter().filter(|r| r.id() != id).cloned().collect())
}

/// One mutation's expected effect on the cache.
#[derive(Debug, Clone)]
pub enum OptimisticChange {
    InsertList(List),
    PatchList { id: DbId, patch: ListPatch },
    RemoveList(DbId),
    InsertTask(Task),
    PatchTask { id: DbId, patch: TaskPatch },
    RemoveTask(DbId),
}

impl OptimisticChange {
    /// The value a cache key should hold after the change, or `None` to
    /// leave the key exactly as it is.
    ///
    /// Inserts seed a one-element collection when nothing was cached;
    /// patches and removals of an absent record are no-ops.
    pub fn apply(&self, current: Option<&CacheValue>) -> Option<CacheValue> {
        match self {
            Self::InsertList(list) => match current {
                None => Some(CacheValue::Lists(vec![list.clone()])),
                Some(CacheValue::Lists(lists)) => {
                    Some(CacheValue::Lists(append(Some(lists.as_slice()), list.clone())))
                }
                Some(_) => None,
            },
            Self::PatchList { id, patch } => match current {
                Some(CacheValue::Lists(lists)) => {
                    edit_by_id(lists, *id, |l| l.apply_patch(patch)).map(CacheValue::Lists)
                }
                _ => None,
            },
            Self::RemoveList(id) => match current {
                Some(CacheValue::Lists(lists)) => {
                    remove_by_id(lists, *id).map(CacheValue::Lists)
                }
                _ => None,
            },
            Self::InsertTask(task) => match current {
                None => Some(CacheValue::Tasks(vec![task.clone()])),
                Some(CacheValue::Tasks(tasks)) => {
                    Some(CacheValue::Tasks(append(Some(tasks.as_slice()), task.clone())))
                }
                Some(_) => None,
            },
            Self::PatchTask { id, patch } => match current {
                Some(CacheValue::Tasks(tasks)) => {
                    edit_by_id(tasks, *id, |t| t.apply_patch(patch)).map(CacheValue::Tasks)
                }
                _ => None,
            },
            Self::RemoveTask(id) => match current {
                Some(CacheValue::Tasks(tasks)) => {
                    remove_by_id(tasks, *id).map(CacheValue::Tasks)
                }
                _ => None,
            },
        }
    }

    /// The id of the record being inserted or edited.
    pub fn target_id(&self) -> DbId {
        match self {
            Self::InsertList(list) => list.id,
            Self::InsertTask(task) => task.id,
            Self::PatchList { id, .. }
            | Self::RemoveList(id)
            | Self::PatchTask { id, .. }
            | Self::RemoveTask(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: DbId, name: &str) -> List {
        let now = chrono::DateTime::from_timestamp(0, 0).unwrap();
        List {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_seeds_missing_collection() {
        let change = OptimisticChange::InsertList(list(-1, "Groceries"));
        let value = change.apply(None).unwrap();
        assert_eq!(value.as_lists().unwrap().len(), 1);
    }

    #[test]
    fn insert_appends_to_existing() {
        let current = CacheValue::Lists(vec![list(1, "Work")]);
        let change = OptimisticChange::InsertList(list(-1, "Groceries"));
        let lists = change.apply(Some(&current)).unwrap().into_lists().unwrap();
        assert_eq!(lists.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, -1]);
    }

    #[test]
    fn patch_touches_only_matching_record() {
        let current = CacheValue::Lists(vec![list(1, "Work"), list(2, "Home")]);
        let change = OptimisticChange::PatchList {
            id: 2,
            patch: ListPatch::rename("House"),
        };
        let lists = change.apply(Some(&current)).unwrap().into_lists().unwrap();
        assert_eq!(lists[0].name, "Work");
        assert_eq!(lists[1].name, "House");
    }

    #[test]
    fn patch_of_absent_record_is_noop() {
        let current = CacheValue::Lists(vec![list(1, "Work")]);
        let change = OptimisticChange::PatchList {
            id: 9,
            patch: ListPatch::rename("x"),
        };
        assert!(change.apply(Some(&current)).is_none());
        assert!(change.apply(None).is_none());
    }

    #[test]
    fn remove_absent_is_noop() {
        let current = CacheValue::Lists(vec![list(1, "Work")]);
        assert!(OptimisticChange::RemoveList(2).apply(Some(&current)).is_none());
        let lists = OptimisticChange::RemoveList(1)
            .apply(Some(&current))
            .unwrap()
            .into_lists()
            .unwrap();
        assert!(lists.is_empty());
    }

    #[test]
    fn mismatched_value_kind_is_left_alone() {
        let current = CacheValue::Tasks(Vec::new());
        assert!(OptimisticChange::InsertList(list(-1, "x"))
            .apply(Some(&current))
            .is_none());
    }

    #[test]
    fn edit_and_remove_helpers() {
        let lists = vec![list(1, "a"), list(2, "b")];
        let edited = edit_by_id(&lists, 1, |l| l.name = "z".to_string()).unwrap();
        assert_eq!(edited[0].name, "z");
        assert_eq!(remove_by_id(&lists, 2).unwrap().len(), 1);
        assert!(remove_by_id(&lists, 3).is_none());
    }
}
