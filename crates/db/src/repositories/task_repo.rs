//! Repository for the `tasks` table.

use sqlx::PgPool;
use tasklists_core::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use tasklists_core::types::DbId;

/// Column list shared across queries.
///
/// `due_date` is a DATE column rendered back as `YYYY-MM-DD` text.
const COLUMNS: &str = "id, name, description, image, status, priority, is_completed, \
     to_char(due_date, 'YYYY-MM-DD') AS due_date, list_id, created_at, updated_at";

/// Provides CRUD and filtered queries for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    ///
    /// If `is_completed` is `None`, defaults to `false`.
    pub async fn create(pool: &PgPool, input: &NewTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (name, description, image, status, priority, is_completed, due_date, list_id)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, FALSE), NULLIF($7, '')::date, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image)
            .bind(input.status)
            .bind(input.priority)
            .bind(input.is_completed)
            .bind(&input.due_date)
            .bind(input.list_id)
            .fetch_one(pool)
            .await
    }

    /// Find a task by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All tasks, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// All tasks belonging to a list, oldest first.
    pub async fn list_by_list(pool: &PgPool, list_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE list_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring match on the task name, across all lists.
    pub async fn search_by_name(pool: &PgPool, term: &str) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE name ILIKE '%' || $1 || '%'
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(term)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_status(
        pool: &PgPool,
        status: TaskStatus,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE status = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Task>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_priority(
        pool: &PgPool,
        priority: TaskPriority,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE priority = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Task>(&query)
            .bind(priority)
            .fetch_all(pool)
            .await
    }

    /// Open tasks due after today, soonest first.
    pub async fn list_upcoming(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE due_date > CURRENT_DATE AND is_completed = FALSE
             ORDER BY due_date ASC, id ASC"
        );
        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// Completed tasks, most recently updated first.
    pub async fn list_completed(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE is_completed = TRUE
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// Update a task. Only non-`None` fields in `input` are applied; an empty
    /// string clears `description`, `image` or `due_date`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &TaskPatch,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                name = COALESCE($2, name),
                description = CASE WHEN $3::text IS NULL THEN description ELSE NULLIF($3, '') END,
                image = CASE WHEN $4::text IS NULL THEN image ELSE NULLIF($4, '') END,
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                is_completed = COALESCE($7, is_completed),
                due_date = CASE WHEN $8::text IS NULL THEN due_date ELSE NULLIF($8, '')::date END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image)
            .bind(input.status)
            .bind(input.priority)
            .bind(input.is_completed)
            .bind(&input.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Set only the completion flag.
    pub async fn set_completed(
        pool: &PgPool,
        id: DbId,
        is_completed: bool,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET is_completed = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(is_completed)
            .fetch_optional(pool)
            .await
    }

    /// Delete a task by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
