//! Rating endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        pagination::{ListResponse, RatingList},
        rating::{RatingRequest, RatingResponse},
    },
    AppState,
};

use super::AuthenticatedUser;

/// List the ratings of a recipe
#[utoipa::path(
    get,
    path = "/food-recipes/{id}/ratings",
    tag = "ratings",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Ratings", body = RatingList),
        (status = 404, description = "Recipe not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ListResponse<RatingResponse>>> {
    let (ratings, total) = state.services.ratings.list(id).await?;
    Ok(Json(ListResponse::new(
        ratings.iter().map(RatingResponse::from).collect(),
        total,
    )))
}

/// Rate a recipe
#[utoipa::path(
    post,
    path = "/food-recipes/{id}/ratings",
    tag = "ratings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RatingRequest,
    responses(
        (status = 201, description = "Rating created", body = RatingResponse),
        (status = 404, description = "Recipe not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already rated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_rating(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<RatingRequest>,
) -> AppResult<(StatusCode, Json<RatingResponse>)> {
    let rating = state.services.ratings.create(&claims, id, &data).await?;
    Ok((StatusCode::CREATED, Json(RatingResponse::from(&rating))))
}
