//! Favorites repository.
//!
//! One row per (recipe, user), enforced by a unique constraint. Unfavoriting
//! sets `deleted_at`; favoriting again clears it on the same row.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::favorite::Favorite,
};

const COLUMNS: &str = "id, food_recipe_id, user_id, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct FavoritesRepository {
    pool: Pool<Postgres>,
}

impl FavoritesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Live favorites of a recipe with their total
    pub async fn list_by_recipe(&self, recipe_id: i32) -> AppResult<(Vec<Favorite>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM favorites WHERE food_recipe_id = $1 AND deleted_at IS NULL",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Favorite>(&format!(
            "SELECT {} FROM favorites WHERE food_recipe_id = $1 AND deleted_at IS NULL ORDER BY id",
            COLUMNS
        ))
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// The (recipe, user) row whether or not it is unfavorited
    pub async fn find_any(&self, recipe_id: i32, user_id: &str) -> AppResult<Option<Favorite>> {
        let row = sqlx::query_as::<_, Favorite>(&format!(
            "SELECT {} FROM favorites WHERE food_recipe_id = $1 AND user_id = $2",
            COLUMNS
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a favorite. If a concurrent request created the row first, the
    /// existing row is reactivated instead.
    pub async fn create(&self, recipe_id: i32, user_id: &str) -> AppResult<Favorite> {
        sqlx::query_as::<_, Favorite>(&format!(
            r#"
            INSERT INTO favorites (food_recipe_id, user_id, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (food_recipe_id, user_id)
            DO UPDATE SET deleted_at = NULL, updated_at = NOW()
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "Favorite already exists"))
    }

    /// Clear the unfavorited marker
    pub async fn restore(&self, id: i32) -> AppResult<Favorite> {
        sqlx::query_as::<_, Favorite>(&format!(
            "UPDATE favorites SET deleted_at = NULL, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Favorite {} not found", id)))
    }

    /// Mark as unfavorited. Idempotent: the first deletion time is kept.
    /// Returns whether a row existed.
    pub async fn soft_delete(&self, recipe_id: i32, user_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE favorites
            SET deleted_at = COALESCE(deleted_at, NOW()), updated_at = NOW()
            WHERE food_recipe_id = $1 AND user_id = $2
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
