//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        auth::Claims,
        user::{UpdateUser, User},
    },
};

const COLUMNS: &str =
    "id, first_name, last_name, nick_name, image_url, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a live user by ID
    pub async fn get_by_id(&self, id: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Create the user or refresh its names from the token.
    ///
    /// A soft-deleted account is not revived: returns `None`.
    pub async fn upsert(&self, claims: &Claims) -> AppResult<Option<User>> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                updated_at = EXCLUDED.updated_at
            WHERE users.deleted_at IS NULL
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(&claims.id)
        .bind(&claims.first_name)
        .bind(&claims.last_name)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a row for the token subject if none exists. Returns whether the
    /// account is live.
    pub async fn ensure_exists(&self, claims: &Claims) -> AppResult<bool> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&claims.id)
        .bind(&claims.first_name)
        .bind(&claims.last_name)
        .execute(&self.pool)
        .await?;

        let live: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(&claims.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(live)
    }

    /// Update profile fields that were provided
    pub async fn update(&self, id: &str, data: &UpdateUser) -> AppResult<User> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.nick_name, "nick_name");
        add_field!(data.image_url, "image_url");

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} AND deleted_at IS NULL RETURNING {}",
            sets.join(", "),
            idx,
            COLUMNS
        );

        let mut builder = sqlx::query_as::<_, User>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.nick_name);
        bind_field!(data.image_url);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Soft delete a user
    pub async fn soft_delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
