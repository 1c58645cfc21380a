//! Favorites service: favorite and unfavorite toggling

use super::{recipes::RecipesService, users::ensure_active};
use crate::{
    error::{AppError, AppResult},
    models::{
        auth::Claims,
        favorite::{Favorite, FavoriteTransition},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct FavoritesService {
    repository: Repository,
    recipes: RecipesService,
}

impl FavoritesService {
    pub fn new(repository: Repository, recipes: RecipesService) -> Self {
        Self { repository, recipes }
    }

    pub async fn list(&self, recipe_id: i32) -> AppResult<(Vec<Favorite>, i64)> {
        self.recipes.require_exists(recipe_id).await?;
        self.repository.favorites.list_by_recipe(recipe_id).await
    }

    /// Favorite a recipe, reusing an unfavorited row when there is one.
    /// Favoriting twice is a no-op.
    pub async fn favorite(&self, claims: &Claims, recipe_id: i32) -> AppResult<Favorite> {
        self.recipes.require_exists(recipe_id).await?;
        ensure_active(&self.repository, claims).await?;

        let existing = self.repository.favorites.find_any(recipe_id, &claims.id).await?;
        match FavoriteTransition::for_existing(existing) {
            FavoriteTransition::Create => self.repository.favorites.create(recipe_id, &claims.id).await,
            FavoriteTransition::Restore(id) => self.repository.favorites.restore(id).await,
            FavoriteTransition::Unchanged(favorite) => Ok(favorite),
        }
    }

    /// Unfavorite a recipe. Unfavoriting twice is a no-op.
    pub async fn unfavorite(&self, claims: &Claims, recipe_id: i32) -> AppResult<()> {
        self.recipes.require_exists(recipe_id).await?;
        if !self.repository.favorites.soft_delete(recipe_id, &claims.id).await? {
            return Err(AppError::NotFound(format!(
                "Food recipe {} is not in your favorites",
                recipe_id
            )));
        }
        Ok(())
    }
}
