//! Local task filtering and the recent-lists limit.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskPriority};
use crate::types::DbId;

/// Quick filters offered on a list's task view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    /// Due strictly after today and not yet completed.
    Upcoming,
    #[serde(rename = "high")]
    HighPriority,
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Upcoming => "upcoming",
            Self::HighPriority => "high",
        }
    }

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.is_completed,
            Self::Completed => task.is_completed,
            Self::Upcoming => {
                !task.is_completed
                    && task
                        .due_date
                        .as_deref()
                        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                        .is_some_and(|due| due > today)
            }
            Self::HighPriority => task.priority == Some(TaskPriority::High),
        }
    }

    pub fn apply<'a>(self, tasks: &'a [Task], today: NaiveDate) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t, today)).collect()
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "upcoming" => Ok(Self::Upcoming),
            "high" => Ok(Self::HighPriority),
            other => Err(format!("Unknown filter '{other}'")),
        }
    }
}

/// Pick the tasks a list view shows.
///
/// A non-blank search term takes precedence over the filter; search results
/// come from all lists and are narrowed to `list_id`.
pub fn visible_tasks<'a>(
    search_term: &str,
    search_results: &'a [Task],
    list_tasks: &'a [Task],
    filter: TaskFilter,
    list_id: DbId,
    today: NaiveDate,
) -> Vec<&'a Task> {
    if !search_term.trim().is_empty() {
        return search_results
            .iter()
            .filter(|t| t.list_id == list_id)
            .collect();
    }
    filter.apply(list_tasks, today)
}

// ---------------------------------------------------------------------------
// Recent lists limit
// ---------------------------------------------------------------------------

/// How many recently updated lists to show, always within `1..=50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecentLimit(u32);

impl RecentLimit {
    pub const MAX: u32 = 50;
    pub const DEFAULT: RecentLimit = RecentLimit(5);

    pub fn new(limit: u32) -> Option<Self> {
        (1..=Self::MAX).contains(&limit).then_some(Self(limit))
    }

    /// Parse user-entered text. Anything that is not an integer in range is
    /// ignored (returns `None`) so the previous limit stays in effect.
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<u32>().ok().and_then(Self::new)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for RecentLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn task(id: DbId, list_id: DbId, done: bool) -> Task {
        let now = chrono::Utc::now();
        Task {
            id,
            name: format!("task {id}"),
            description: None,
            image: None,
            status: Some(TaskStatus::Pending),
            priority: None,
            is_completed: done,
            due_date: None,
            list_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn pending_and_completed_split_by_flag() {
        let tasks = vec![task(1, 1, false), task(2, 1, true), task(3, 1, false)];
        assert_eq!(TaskFilter::Pending.apply(&tasks, today()).len(), 2);
        assert_eq!(TaskFilter::Completed.apply(&tasks, today()).len(), 1);
        assert_eq!(TaskFilter::All.apply(&tasks, today()).len(), 3);
    }

    #[test]
    fn upcoming_requires_future_date_and_open_task() {
        let mut due_today = task(1, 1, false);
        due_today.due_date = Some("2024-03-10".to_string());
        let mut due_tomorrow = task(2, 1, false);
        due_tomorrow.due_date = Some("2024-03-11".to_string());
        let mut done_tomorrow = task(3, 1, true);
        done_tomorrow.due_date = Some("2024-03-11".to_string());
        let undated = task(4, 1, false);

        let tasks = vec![due_today, due_tomorrow, done_tomorrow, undated];
        let ids: Vec<DbId> = TaskFilter::Upcoming
            .apply(&tasks, today())
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn high_priority_filter() {
        let mut urgent = task(1, 1, false);
        urgent.priority = Some(TaskPriority::High);
        let mut later = task(2, 1, false);
        later.priority = Some(TaskPriority::Low);
        let tasks = vec![urgent, later];
        assert_eq!(TaskFilter::HighPriority.apply(&tasks, today())[0].id, 1);
    }

    #[test]
    fn search_term_overrides_filter_and_scopes_to_list() {
        let results = vec![task(1, 1, true), task(2, 2, false)];
        let list_tasks = vec![task(3, 1, false)];

        let shown = visible_tasks(" milk ", &results, &list_tasks, TaskFilter::Pending, 1, today());
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 1);

        let shown = visible_tasks("  ", &results, &list_tasks, TaskFilter::Pending, 1, today());
        assert_eq!(shown[0].id, 3);
    }

    #[test]
    fn filter_parses_from_str() {
        assert_eq!("high".parse::<TaskFilter>(), Ok(TaskFilter::HighPriority));
        assert!("urgent".parse::<TaskFilter>().is_err());
        assert_eq!(TaskFilter::Upcoming.as_str(), "upcoming");
    }

    #[test]
    fn recent_limit_bounds() {
        assert_eq!(RecentLimit::default().get(), 5);
        assert_eq!(RecentLimit::parse("12").map(RecentLimit::get), Some(12));
        assert_eq!(RecentLimit::parse("50").map(RecentLimit::get), Some(50));
        assert!(RecentLimit::parse("0").is_none());
        assert!(RecentLimit::parse("51").is_none());
        assert!(RecentLimit::parse("-3").is_none());
        assert!(RecentLimit::parse("ten").is_none());
    }
}
