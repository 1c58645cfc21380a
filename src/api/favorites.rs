//! Favorite endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        favorite::FavoriteResponse,
        pagination::{FavoriteList, FoodRecipeList, ListResponse},
        recipe::{FoodRecipeResponse, RecipeQuery},
    },
    AppState,
};

use super::AuthenticatedUser;

/// List who favorited a recipe
#[utoipa::path(
    get,
    path = "/food-recipes/{id}/favorites",
    tag = "favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Favorites", body = FavoriteList),
        (status = 404, description = "Recipe not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ListResponse<FavoriteResponse>>> {
    let (favorites, total) = state.services.favorites.list(id).await?;
    Ok(Json(ListResponse::new(
        favorites.iter().map(FavoriteResponse::from).collect(),
        total,
    )))
}

/// The caller's favorite recipes
#[utoipa::path(
    get,
    path = "/food-recipes/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(RecipeQuery),
    responses(
        (status = 200, description = "Favorite recipes page", body = FoodRecipeList)
    )
)]
pub async fn list_my_favorites(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RecipeQuery>,
) -> AppResult<Json<ListResponse<FoodRecipeResponse>>> {
    let (recipes, total) = state
        .services
        .recipes
        .list_favorites(&claims.id, &query)
        .await?;
    Ok(Json(ListResponse::new(
        recipes.iter().map(FoodRecipeResponse::from).collect(),
        total,
    )))
}

/// Favorite a recipe
#[utoipa::path(
    post,
    path = "/food-recipes/{id}/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Recipe favorited", body = FavoriteResponse),
        (status = 404, description = "Recipe not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<FavoriteResponse>)> {
    let favorite = state.services.favorites.favorite(&claims, id).await?;
    Ok((StatusCode::CREATED, Json(FavoriteResponse::from(&favorite))))
}

/// Unfavorite a recipe
#[utoipa::path(
    delete,
    path = "/food-recipes/{id}/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe unfavorited"),
        (status = 404, description = "Recipe not found or never favorited", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_favorite(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.favorites.unfavorite(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
