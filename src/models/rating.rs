//! Rating model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A user's score for a recipe
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Rating {
    pub id: i32,
    pub score: f64,
    pub food_recipe_id: i32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating as returned to clients; the rating user is never exposed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub id: i32,
    pub score: f64,
    #[serde(rename = "foodRecipeID")]
    pub food_recipe_id: i32,
}

/// Create rating request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RatingRequest {
    #[validate(range(min = 0.0, max = 5.0, message = "Score must be between 0 and 5"))]
    pub score: f64,
}

impl From<&Rating> for RatingResponse {
    fn from(rating: &Rating) -> Self {
        Self {
            id: rating.id,
            score: rating.score,
            food_recipe_id: rating.food_recipe_id,
        }
    }
}
