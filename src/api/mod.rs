//! API handlers for Wongnok REST endpoints

pub mod auth;
pub mod favorites;
pub mod health;
pub mod middleware;
pub mod openapi;
pub mod ratings;
pub mod recipes;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::auth::Claims, AppState};

/// Claims attached by [`middleware::authorize`].
///
/// Fails closed: a handler reached without the middleware gets a 401.
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))
    }
}

/// Caller identity on public routes: `None` when there is no usable bearer token
pub struct OptionalUser(pub Option<Claims>);

impl OptionalUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|c| c.id.as_str())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(OptionalUser(Some(claims.clone())));
        }

        let Ok(token) = middleware::bearer_token(&parts.headers) else {
            return Ok(OptionalUser(None));
        };

        match state.services.session.verify_token(token).await {
            Ok(claims) => Ok(OptionalUser(Some(claims))),
            Err(e) => {
                tracing::debug!("Ignoring unusable token on public route: {}", e);
                Ok(OptionalUser(None))
            }
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let authorize = axum::middleware::from_fn_with_state(
        state.services.session.clone(),
        middleware::authorize,
    );

    // Routes that require a verified bearer token
    let protected = Router::new()
        .route("/food-recipes", post(recipes::create_recipe))
        .route("/food-recipes/favorites", get(favorites::list_my_favorites))
        .route(
            "/food-recipes/:id",
            axum::routing::put(recipes::update_recipe).delete(recipes::delete_recipe),
        )
        .route("/food-recipes/:id/ratings", post(ratings::create_rating))
        .route(
            "/food-recipes/:id/favorites",
            post(favorites::create_favorite).delete(favorites::delete_favorite),
        )
        .route(
            "/users/",
            get(users::get_me)
                .post(users::create_me)
                .put(users::update_me)
                .delete(users::delete_me),
        )
        .route("/users/:id/food-recipes", get(users::list_user_recipes))
        .route_layer(authorize);

    // Public routes; recipe reads personalise their output when a token is sent
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
        .route("/food-recipes", get(recipes::list_recipes))
        .route("/food-recipes/:id", get(recipes::get_recipe))
        .route("/food-recipes/:id/ratings", get(ratings::list_ratings))
        .route("/food-recipes/:id/favorites", get(favorites::list_favorites));

    let api_v1 = protected.merge(public).with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
