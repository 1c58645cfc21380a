//! Food recipes service: listings, detail, and owner-checked writes

use validator::Validate;

use super::users::ensure_active;
use crate::{
    error::{AppError, AppResult},
    models::{
        auth::Claims,
        pagination::Pagination,
        recipe::{calculate_average_ratings, FoodRecipe, FoodRecipeRequest, RecipeQuery, UpdateFoodRecipe},
    },
    repository::{
        query::{RecipeFilter, RecipeQuerySpec},
        Repository,
    },
};

#[derive(Clone)]
pub struct RecipesService {
    repository: Repository,
}

impl RecipesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Run one page of a listing and its total, with averages computed
    async fn page(
        &self,
        filter: RecipeFilter,
        query: &RecipeQuery,
        viewer: Option<&str>,
    ) -> AppResult<(Vec<FoodRecipe>, i64)> {
        let pagination = Pagination::new(query.page, query.limit)?;
        let spec = RecipeQuerySpec::page(filter, pagination).for_viewer(viewer);

        let recipes = self.repository.recipes.fetch(&spec).await?;
        let total = self.repository.recipes.count(&spec.filter).await?;
        Ok((calculate_average_ratings(recipes), total))
    }

    /// All recipes, optionally searched
    pub async fn list(&self, query: &RecipeQuery, viewer: Option<&str>) -> AppResult<(Vec<FoodRecipe>, i64)> {
        self.page(RecipeFilter::search(query.search_term()), query, viewer)
            .await
    }

    /// Recipes created by `owner_id`
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        query: &RecipeQuery,
        viewer: Option<&str>,
    ) -> AppResult<(Vec<FoodRecipe>, i64)> {
        let filter = RecipeFilter {
            search: query.search_term(),
            ..RecipeFilter::owned_by(owner_id)
        };
        self.page(filter, query, viewer).await
    }

    /// Recipes the user currently has favorited
    pub async fn list_favorites(&self, user_id: &str, query: &RecipeQuery) -> AppResult<(Vec<FoodRecipe>, i64)> {
        let filter = RecipeFilter {
            search: query.search_term(),
            ..RecipeFilter::favorited_by(user_id)
        };
        self.page(filter, query, Some(user_id)).await
    }

    pub async fn get(&self, id: i32, viewer: Option<&str>) -> AppResult<FoodRecipe> {
        let spec = RecipeQuerySpec::by_id(id).for_viewer(viewer);
        let recipe = self.repository.recipes.fetch_one(&spec).await?;
        Ok(recipe.calculate_average_rating())
    }

    pub async fn create(&self, claims: &Claims, data: FoodRecipeRequest) -> AppResult<FoodRecipe> {
        let data = data.normalized();
        data.validate()?;
        ensure_active(&self.repository, claims).await?;

        let id = self.repository.recipes.create(&claims.id, &data).await?;
        tracing::info!(recipe_id = id, user_id = %claims.id, "Food recipe created");
        self.get(id, Some(&claims.id)).await
    }

    pub async fn update(&self, claims: &Claims, id: i32, data: UpdateFoodRecipe) -> AppResult<FoodRecipe> {
        let data = data.normalized();
        if data.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        data.validate()?;
        self.require_owner(claims, id).await?;

        self.repository.recipes.update(id, &data).await?;
        self.get(id, Some(&claims.id)).await
    }

    pub async fn delete(&self, claims: &Claims, id: i32) -> AppResult<()> {
        self.require_owner(claims, id).await?;
        self.repository.recipes.soft_delete(id).await?;
        tracing::info!(recipe_id = id, user_id = %claims.id, "Food recipe deleted");
        Ok(())
    }

    /// Fail with NotFound for unknown recipes, Forbidden for someone else's
    async fn require_owner(&self, claims: &Claims, id: i32) -> AppResult<()> {
        let owner = self.repository.recipes.owner_of(id).await?;
        if owner != claims.id {
            return Err(AppError::Authorization(
                "Only the owner can modify this food recipe".to_string(),
            ));
        }
        Ok(())
    }

    /// NotFound unless the recipe is live
    pub(crate) async fn require_exists(&self, id: i32) -> AppResult<()> {
        if self.repository.recipes.exists(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Food recipe {} not found", id)))
        }
    }
}
