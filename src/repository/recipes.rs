//! Food recipes repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::query::{assemble, RecipeFilter, RecipeQuerySpec, RecipeRow};
use crate::{
    error::{AppError, AppResult},
    models::{
        favorite::Favorite,
        rating::Rating,
        recipe::{FoodRecipe, FoodRecipeRequest, UpdateFoodRecipe},
    },
};

#[derive(Clone)]
pub struct RecipesRepository {
    pool: Pool<Postgres>,
}

impl RecipesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Execute a query spec and attach the requested relations.
    ///
    /// Averages are left at zero; callers run the rating aggregator.
    pub async fn fetch(&self, spec: &RecipeQuerySpec) -> AppResult<Vec<FoodRecipe>> {
        let mut select = spec.select();
        let rows: Vec<RecipeRow> = select.build_query_as().fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let ratings = if spec.relations.ratings {
            sqlx::query_as::<_, Rating>(
                r#"
                SELECT id, score, food_recipe_id, user_id, created_at, updated_at
                FROM ratings
                WHERE food_recipe_id = ANY($1) AND deleted_at IS NULL
                ORDER BY id
                "#,
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?
        } else {
            Vec::new()
        };

        let favorites = match (spec.relations.viewer_state, spec.viewer_id.as_deref()) {
            (true, Some(viewer)) => {
                sqlx::query_as::<_, Favorite>(
                    r#"
                    SELECT id, food_recipe_id, user_id, created_at, updated_at, deleted_at
                    FROM favorites
                    WHERE food_recipe_id = ANY($1) AND user_id = $2 AND deleted_at IS NULL
                    "#,
                )
                .bind(&ids)
                .bind(viewer)
                .fetch_all(&self.pool)
                .await?
            }
            _ => Vec::new(),
        };

        let viewer = spec
            .viewer_id
            .as_deref()
            .filter(|_| spec.relations.viewer_state);
        Ok(assemble(rows, ratings, favorites, viewer))
    }

    /// Fetch exactly one live recipe
    pub async fn fetch_one(&self, spec: &RecipeQuerySpec) -> AppResult<FoodRecipe> {
        self.fetch(spec)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| match spec.filter.id {
                Some(id) => AppError::NotFound(format!("Food recipe {} not found", id)),
                None => AppError::NotFound("Food recipe not found".to_string()),
            })
    }

    /// Number of live recipes matching the filter, ignoring pagination
    pub async fn count(&self, filter: &RecipeFilter) -> AppResult<i64> {
        let mut count = filter.count();
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total)
    }

    /// Insert a recipe owned by `user_id` and return its id
    pub async fn create(&self, user_id: &str, data: &FoodRecipeRequest) -> AppResult<i32> {
        let now = Utc::now();
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO food_recipes (
                name, description, ingredient, instruction, image_url,
                cooking_duration_id, difficulty_id, user_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.ingredient)
        .bind(&data.instruction)
        .bind(&data.image_url)
        .bind(data.cooking_duration_id)
        .bind(data.difficulty_id)
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "Food recipe already exists"))
    }

    /// Update only the provided fields
    pub async fn update(&self, id: i32, data: &UpdateFoodRecipe) -> AppResult<()> {
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

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.ingredient, "ingredient");
        add_field!(data.instruction, "instruction");
        add_field!(data.image_url, "image_url");
        add_field!(data.cooking_duration_id, "cooking_duration_id");
        add_field!(data.difficulty_id, "difficulty_id");

        let query = format!(
            "UPDATE food_recipes SET {} WHERE id = ${} AND deleted_at IS NULL",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);
        bind_field!(data.ingredient);
        bind_field!(data.instruction);
        bind_field!(data.image_url);
        bind_field!(data.cooking_duration_id);
        bind_field!(data.difficulty_id);

        let result = builder
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "Food recipe already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Food recipe {} not found", id)));
        }
        Ok(())
    }

    /// Soft delete a recipe
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE food_recipes SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Food recipe {} not found", id)));
        }
        Ok(())
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM food_recipes WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    /// Owner of a live recipe
    pub async fn owner_of(&self, id: i32) -> AppResult<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM food_recipes WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Food recipe {} not found", id)))
    }
}
