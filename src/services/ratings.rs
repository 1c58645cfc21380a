//! Ratings service

use validator::Validate;

use super::{recipes::RecipesService, users::ensure_active};
use crate::{
    error::AppResult,
    models::{
        auth::Claims,
        rating::{Rating, RatingRequest},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RatingsService {
    repository: Repository,
    recipes: RecipesService,
}

impl RatingsService {
    pub fn new(repository: Repository, recipes: RecipesService) -> Self {
        Self { repository, recipes }
    }

    pub async fn list(&self, recipe_id: i32) -> AppResult<(Vec<Rating>, i64)> {
        self.recipes.require_exists(recipe_id).await?;
        self.repository.ratings.list_by_recipe(recipe_id).await
    }

    /// Rate a recipe. Each user rates a recipe once.
    pub async fn create(&self, claims: &Claims, recipe_id: i32, data: &RatingRequest) -> AppResult<Rating> {
        data.validate()?;
        self.recipes.require_exists(recipe_id).await?;
        ensure_active(&self.repository, claims).await?;
        self.repository
            .ratings
            .create(recipe_id, &claims.id, data.score)
            .await
    }
}
