//! Repository for the `lists` table.

use sqlx::PgPool;
use tasklists_core::list::{List, ListPatch, NewList};
use tasklists_core::types::DbId;

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD and lookup queries for lists.
pub struct ListRepo;

impl ListRepo {
    /// Insert a new list, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewList) -> Result<List, sqlx::Error> {
        let query = format!("INSERT INTO lists (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, List>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a list by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All lists, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, List>(&query).fetch_all(pool).await
    }

    /// Case-insensitive substring match on the list name.
    pub async fn search_by_name(pool: &PgPool, term: &str) -> Result<Vec<List>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lists
             WHERE name ILIKE '%' || $1 || '%'
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(term)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recently updated lists.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists ORDER BY updated_at DESC LIMIT $1");
        sqlx::query_as::<_, List>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a list. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ListPatch,
    ) -> Result<Option<List>, sqlx::Error> {
        let query = format!(
            "UPDATE lists SET
                name = COALESCE($2, name),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a list by ID. Returns `true` if a row was removed.
    ///
    /// Tasks referencing the list are left untouched.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
