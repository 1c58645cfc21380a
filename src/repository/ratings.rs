//! Ratings repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::rating::Rating,
};

#[derive(Clone)]
pub struct RatingsRepository {
    pool: Pool<Postgres>,
}

impl RatingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Live ratings of a recipe, oldest first, with their total
    pub async fn list_by_recipe(&self, recipe_id: i32) -> AppResult<(Vec<Rating>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ratings WHERE food_recipe_id = $1 AND deleted_at IS NULL",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, score, food_recipe_id, user_id, created_at, updated_at
            FROM ratings
            WHERE food_recipe_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Insert a rating. A second live rating by the same user is a conflict.
    pub async fn create(&self, recipe_id: i32, user_id: &str, score: f64) -> AppResult<Rating> {
        let now = Utc::now();
        sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (score, food_recipe_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, score, food_recipe_id, user_id, created_at, updated_at
            "#,
        )
        .bind(score)
        .bind(recipe_id)
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "You have already rated this food recipe"))
    }
}
