//! Composite cache addresses and the values stored under them.

use std::fmt;

use serde::Serialize;
use tasklists_core::list::List;
use tasklists_core::task::{Task, TaskPriority, TaskStatus};
use tasklists_core::types::{DbId, EntityKind};

/// Where a query result lives in the cache.
///
/// Every key belongs to one [`EntityKind`]; invalidating a kind marks all
/// of its keys stale at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CacheKey {
    Lists,
    List(DbId),
    ListSearch(String),
    RecentLists(u32),
    Tasks,
    TasksByList(DbId),
    Task(DbId),
    TaskSearch(String),
    TasksByStatus(TaskStatus),
    TasksByPriority(TaskPriority),
    UpcomingTasks,
    CompletedTasks,
}

impl CacheKey {
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Lists | Self::List(_) | Self::ListSearch(_) | Self::RecentLists(_) => {
                EntityKind::List
            }
            _ => EntityKind::Task,
        }
    }

    /// The list a task-collection key is scoped to, if any.
    pub fn list_scope(&self) -> Option<DbId> {
        match self {
            Self::TasksByList(list_id) => Some(*list_id),
            _ => None,
        }
    }

    /// Whether the value under this key is a collection rather than a
    /// single record.
    pub fn is_collection(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Task(_))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lists => write!(f, "LISTS"),
            Self::List(id) => write!(f, "LISTS/LIST/{id}"),
            Self::ListSearch(term) => write!(f, "LISTS/SEARCH/{term}"),
            Self::RecentLists(limit) => write!(f, "LISTS/RECENT/{limit}"),
            Self::Tasks => write!(f, "TASKS"),
            Self::TasksByList(id) => write!(f, "TASKS/LIST/{id}"),
            Self::Task(id) => write!(f, "TASKS/TASK/{id}"),
            Self::TaskSearch(term) => write!(f, "TASKS/SEARCH/{term}"),
            Self::TasksByStatus(status) => write!(f, "TASKS/STATUS/{status}"),
            Self::TasksByPriority(priority) => write!(f, "TASKS/PRIORITY/{priority}"),
            Self::UpcomingTasks => write!(f, "TASKS/UPCOMING"),
            Self::CompletedTasks => write!(f, "TASKS/COMPLETED"),
        }
    }
}

/// A cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CacheValue {
    Lists(Vec<List>),
    List(Option<List>),
    Tasks(Vec<Task>),
    Task(Option<Task>),
}

impl CacheValue {
    pub fn as_lists(&self) -> Option<&[List]> {
        match self {
            Self::Lists(lists) => Some(lists),
            _ => None,
        }
    }

    pub fn as_tasks(&self) -> Option<&[Task]> {
        match self {
            Self::Tasks(tasks) => Some(tasks),
            _ => None,
        }
    }

    pub fn into_lists(self) -> Option<Vec<List>> {
        match self {
            Self::Lists(lists) => Some(lists),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<List> {
        match self {
            Self::List(list) => list,
            _ => None,
        }
    }

    pub fn into_tasks(self) -> Option<Vec<Task>> {
        match self {
            Self::Tasks(tasks) => Some(tasks),
            _ => None,
        }
    }

    pub fn into_task(self) -> Option<Task> {
        match self {
            Self::Task(task) => task,
            _ => None,
        }
    }
}
