//! Food recipe endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        pagination::{FoodRecipeList, ListResponse},
        recipe::{FoodRecipeRequest, FoodRecipeResponse, RecipeQuery, UpdateFoodRecipe},
    },
    AppState,
};

use super::{AuthenticatedUser, OptionalUser};

/// List recipes, searched and paginated
#[utoipa::path(
    get,
    path = "/food-recipes",
    tag = "food-recipes",
    params(RecipeQuery),
    responses(
        (status = 200, description = "Recipes page", body = FoodRecipeList),
        (status = 400, description = "Invalid pagination", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Query(query): Query<RecipeQuery>,
) -> AppResult<Json<ListResponse<FoodRecipeResponse>>> {
    let (recipes, total) = state.services.recipes.list(&query, viewer.id()).await?;
    Ok(Json(ListResponse::new(
        recipes.iter().map(FoodRecipeResponse::from).collect(),
        total,
    )))
}

/// Get a recipe by ID
#[utoipa::path(
    get,
    path = "/food-recipes/{id}",
    tag = "food-recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = FoodRecipeResponse),
        (status = 404, description = "Recipe not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Path(id): Path<i32>,
) -> AppResult<Json<FoodRecipeResponse>> {
    let recipe = state.services.recipes.get(id, viewer.id()).await?;
    Ok(Json(FoodRecipeResponse::from(&recipe)))
}

/// Create a recipe owned by the caller
#[utoipa::path(
    post,
    path = "/food-recipes",
    tag = "food-recipes",
    security(("bearer_auth" = [])),
    request_body = FoodRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = FoodRecipeResponse),
        (status = 400, description = "Invalid body", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<FoodRecipeRequest>,
) -> AppResult<(StatusCode, Json<FoodRecipeResponse>)> {
    let recipe = state.services.recipes.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(FoodRecipeResponse::from(&recipe))))
}

/// Update one of the caller's recipes
#[utoipa::path(
    put,
    path = "/food-recipes/{id}",
    tag = "food-recipes",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = UpdateFoodRecipe,
    responses(
        (status = 200, description = "Recipe updated", body = FoodRecipeResponse),
        (status = 400, description = "Invalid or empty body", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Recipe not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateFoodRecipe>,
) -> AppResult<Json<FoodRecipeResponse>> {
    let recipe = state.services.recipes.update(&claims, id, data).await?;
    Ok(Json(FoodRecipeResponse::from(&recipe)))
}

/// Delete one of the caller's recipes
#[utoipa::path(
    delete,
    path = "/food-recipes/{id}",
    tag = "food-recipes",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Recipe not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.recipes.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
