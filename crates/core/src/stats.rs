//! Summary counts shown above a task list.

use serde::Serialize;

use crate::filter::TaskFilter;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Number of tasks currently shown (after search/filter).
    pub shown: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    /// `shown` counts the visible tasks; `completed`/`pending` always count
    /// the whole list regardless of the active filter.
    pub fn summarize(shown: usize, list_tasks: &[Task]) -> Self {
        let completed = list_tasks.iter().filter(|t| t.is_completed).count();
        Self {
            shown,
            completed,
            pending: list_tasks.len() - completed,
        }
    }

    /// Headline such as `"4 tasks"` or `"2 pending"`.
    pub fn headline(&self, filter: TaskFilter) -> String {
        match filter {
            TaskFilter::All => format!("{} tasks", self.shown),
            other => format!("{} {}", self.shown, other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DbId;

    fn task(id: DbId, done: bool) -> Task {
        let now = chrono::Utc::now();
        Task {
            id,
            name: "t".to_string(),
            description: None,
            image: None,
            status: None,
            priority: None,
            is_completed: done,
            due_date: None,
            list_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn counts_whole_list() {
        let tasks = vec![task(1, true), task(2, false), task(3, false)];
        let stats = TaskStats::summarize(1, &tasks);
        assert_eq!(stats.shown, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
    }

    #[test]
    fn empty_list_is_all_zero() {
        let stats = TaskStats::summarize(0, &[]);
        assert_eq!((stats.shown, stats.completed, stats.pending), (0, 0, 0));
    }

    #[test]
    fn headline_uses_filter_name() {
        let stats = TaskStats::summarize(4, &[]);
        assert_eq!(stats.headline(TaskFilter::All), "4 tasks");
        assert_eq!(stats.headline(TaskFilter::Pending), "4 pending");
        assert_eq!(stats.headline(TaskFilter::HighPriority), "4 high");
    }
}
