//! Favorite model.
//!
//! A favorite row is never removed: unfavoriting sets `deleted_at`, favoriting
//! again clears it on the same row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Favorite {
    pub id: i32,
    pub food_recipe_id: i32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Favorite {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FavoriteResponse {
    pub id: i32,
    #[serde(rename = "foodRecipeID")]
    pub food_recipe_id: i32,
}

impl From<&Favorite> for FavoriteResponse {
    fn from(favorite: &Favorite) -> Self {
        Self {
            id: favorite.id,
            food_recipe_id: favorite.food_recipe_id,
        }
    }
}

/// What favoriting a recipe has to do, given the row found for (recipe, user)
/// including soft-deleted rows.
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteTransition {
    /// No row yet
    Create,
    /// Row exists but is unfavorited: clear its marker
    Restore(i32),
    /// Already favorited: nothing to write
    Unchanged(Favorite),
}

impl FavoriteTransition {
    pub fn for_existing(existing: Option<Favorite>) -> Self {
        match existing {
            None => FavoriteTransition::Create,
            Some(fav) if fav.is_active() => FavoriteTransition::Unchanged(fav),
            Some(fav) => FavoriteTransition::Restore(fav.id),
        }
    }
}
