//! User profile endpoints. All act on the caller identified by the bearer token.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        pagination::{FoodRecipeList, ListResponse},
        recipe::{FoodRecipeResponse, RecipeQuery},
        user::{UpdateUser, UserResponse},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Path alias for the caller in `/users/{id}/...`
const SELF_ALIAS: &str = "self";

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/users/",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 404, description = "No profile yet", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get(&claims).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Create or refresh the caller's profile from the token
#[utoipa::path(
    post,
    path = "/users/",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Profile stored", body = UserResponse),
        (status = 403, description = "Account deleted", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.services.users.create(&claims).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Update the caller's nickname or image
#[utoipa::path(
    put,
    path = "/users/",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid body", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.update(&claims, data).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Delete the caller's account
#[utoipa::path(
    delete,
    path = "/users/",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Account deleted")
    )
)]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<StatusCode> {
    state.services.users.delete(&claims).await?;
    tracing::info!(user_id = %claims.id, "User account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Recipes created by a user (`self` for the caller)
#[utoipa::path(
    get,
    path = "/users/{id}/food-recipes",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID or `self`"),
        RecipeQuery
    ),
    responses(
        (status = 200, description = "Recipes page", body = FoodRecipeList)
    )
)]
pub async fn list_user_recipes(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<RecipeQuery>,
) -> AppResult<Json<ListResponse<FoodRecipeResponse>>> {
    let owner = if id == SELF_ALIAS { claims.id.as_str() } else { id.as_str() };
    let (recipes, total) = state
        .services
        .recipes
        .list_by_owner(owner, &query, Some(&claims.id))
        .await?;
    Ok(Json(ListResponse::new(
        recipes.iter().map(FoodRecipeResponse::from).collect(),
        total,
    )))
}
