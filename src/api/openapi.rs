//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, favorites, health, ratings, recipes, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wongnok API",
        version = "1.0.0",
        description = "Recipe sharing REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::callback,
        auth::logout,
        // Food recipes
        recipes::list_recipes,
        recipes::get_recipe,
        recipes::create_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        // Ratings
        ratings::list_ratings,
        ratings::create_rating,
        // Favorites
        favorites::list_favorites,
        favorites::list_my_favorites,
        favorites::create_favorite,
        favorites::delete_favorite,
        // Users
        users::get_me,
        users::create_me,
        users::update_me,
        users::delete_me,
        users::list_user_recipes,
    ),
    components(
        schemas(
            // Auth
            crate::models::auth::Credential,
            // Food recipes
            crate::models::recipe::FoodRecipeResponse,
            crate::models::recipe::FoodRecipeRequest,
            crate::models::recipe::UpdateFoodRecipe,
            crate::models::lookup::CookingDuration,
            crate::models::lookup::Difficulty,
            crate::models::pagination::FoodRecipeList,
            // Ratings
            crate::models::rating::RatingResponse,
            crate::models::rating::RatingRequest,
            crate::models::pagination::RatingList,
            // Favorites
            crate::models::favorite::FavoriteResponse,
            crate::models::pagination::FavoriteList,
            // Users
            crate::models::user::UserResponse,
            crate::models::user::UpdateUser,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "OpenID Connect login flow"),
        (name = "food-recipes", description = "Recipe management"),
        (name = "ratings", description = "Recipe ratings"),
        (name = "favorites", description = "Favorite recipes"),
        (name = "users", description = "User profiles")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_security() {
        let doc = ApiDoc::openapi();
        for path in ["/food-recipes", "/food-recipes/{id}", "/food-recipes/favorites", "/callback", "/users/"] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
