//! Food recipe model, request/response types and rating aggregation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    favorite::{Favorite, FavoriteResponse},
    lookup::{CookingDuration, Difficulty},
    rating::{Rating, RatingResponse},
    user::UserResponse,
};

/// A recipe with its relations loaded.
///
/// `favorite` and `rating` belong to the viewer the recipe was fetched for and
/// are `None` for anonymous viewers. `average_rating` is derived from
/// `ratings` and never read from storage.
#[derive(Debug, Clone)]
pub struct FoodRecipe {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub ingredient: String,
    pub instruction: String,
    pub image_url: Option<String>,
    pub cooking_duration: CookingDuration,
    pub difficulty: Difficulty,
    pub user: UserResponse,
    pub ratings: Vec<Rating>,
    pub favorite: Option<Favorite>,
    pub rating: Option<Rating>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodRecipe {
    /// Set `average_rating` to the mean of the loaded ratings, 0.0 when there are none
    pub fn calculate_average_rating(mut self) -> Self {
        self.average_rating = if self.ratings.is_empty() {
            0.0
        } else {
            let sum: f64 = self.ratings.iter().map(|r| r.score).sum();
            sum / self.ratings.len() as f64
        };
        self
    }
}

/// Element-wise [`FoodRecipe::calculate_average_rating`], order preserved
pub fn calculate_average_ratings(recipes: Vec<FoodRecipe>) -> Vec<FoodRecipe> {
    recipes
        .into_iter()
        .map(FoodRecipe::calculate_average_rating)
        .collect()
}

/// Recipe as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecipeResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub ingredient: String,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub cooking_duration: CookingDuration,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub average_rating: f64,
    pub user: UserResponse,
    /// The viewer's own favorite, if any
    pub favorite: Option<FavoriteResponse>,
    /// The viewer's own rating, if any
    pub rating: Option<RatingResponse>,
}

impl From<&FoodRecipe> for FoodRecipeResponse {
    fn from(recipe: &FoodRecipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            ingredient: recipe.ingredient.clone(),
            instruction: recipe.instruction.clone(),
            image_url: recipe.image_url.clone(),
            cooking_duration: recipe.cooking_duration.clone(),
            difficulty: recipe.difficulty.clone(),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
            average_rating: recipe.average_rating,
            user: recipe.user.clone(),
            favorite: recipe.favorite.as_ref().map(FavoriteResponse::from),
            rating: recipe.rating.as_ref().map(RatingResponse::from),
        }
    }
}

/// Create recipe request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FoodRecipeRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Ingredient is required"))]
    pub ingredient: String,
    #[validate(length(min = 1, message = "Instruction is required"))]
    pub instruction: String,
    #[serde(rename = "imageURL", default)]
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    #[serde(rename = "cookingDurationID")]
    #[validate(range(min = 1, max = 3, message = "Unknown cooking duration"))]
    pub cooking_duration_id: i32,
    #[serde(rename = "difficultyID")]
    #[validate(range(min = 1, max = 3, message = "Unknown difficulty"))]
    pub difficulty_id: i32,
}

/// Update recipe request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFoodRecipe {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Ingredient cannot be empty"))]
    pub ingredient: Option<String>,
    #[validate(length(min = 1, message = "Instruction cannot be empty"))]
    pub instruction: Option<String>,
    #[serde(rename = "imageURL", default)]
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    #[serde(rename = "cookingDurationID", default)]
    #[validate(range(min = 1, max = 3, message = "Unknown cooking duration"))]
    pub cooking_duration_id: Option<i32>,
    #[serde(rename = "difficultyID", default)]
    #[validate(range(min = 1, max = 3, message = "Unknown difficulty"))]
    pub difficulty_id: Option<i32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl FoodRecipeRequest {
    /// Forms send `""` for "no image"
    pub fn normalized(mut self) -> Self {
        self.image_url = non_blank(self.image_url);
        self
    }
}

impl UpdateFoodRecipe {
    pub fn normalized(mut self) -> Self {
        self.image_url = non_blank(self.image_url);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.ingredient.is_none()
            && self.instruction.is_none()
            && self.image_url.is_none()
            && self.cooking_duration_id.is_none()
            && self.difficulty_id.is_none()
    }
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RecipeQuery {
    /// Page number (1-based, default 1)
    pub page: Option<i64>,
    /// Page size (default 10, max 100)
    pub limit: Option<i64>,
    /// Substring matched against name and description
    pub search: Option<String>,
}

impl RecipeQuery {
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(id: i32, score: f64, user_id: &str) -> Rating {
        Rating {
            id,
            score,
            food_recipe_id: 1,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn recipe(id: i32, name: &str, scores: &[f64]) -> FoodRecipe {
        FoodRecipe {
            id,
            name: name.to_string(),
            description: "Traditional Thai noodle dish".to_string(),
            ingredient: "Rice noodles, shrimp, eggs".to_string(),
            instruction: "Stir fry everything together".to_string(),
            image_url: None,
            cooking_duration: CookingDuration { id: 1, name: "Quick (15 min)".into() },
            difficulty: Difficulty { id: 2, name: "Medium".into() },
            user: UserResponse {
                id: "user123".into(),
                first_name: "John".into(),
                last_name: "Doe".into(),
                ..Default::default()
            },
            ratings: scores
                .iter()
                .enumerate()
                .map(|(i, s)| rating(i as i32 + 1, *s, "someone"))
                .collect(),
            favorite: None,
            rating: None,
            average_rating: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(recipe(1, "a", &[5.0, 4.0, 3.0]).calculate_average_rating().average_rating, 4.0);
        assert_eq!(recipe(1, "a", &[4.5]).calculate_average_rating().average_rating, 4.5);
        assert_eq!(recipe(1, "a", &[]).calculate_average_rating().average_rating, 0.0);

        let avg = recipe(1, "a", &[4.7, 3.3, 4.0]).calculate_average_rating().average_rating;
        assert!((avg - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_is_recomputed_not_trusted() {
        let mut stale = recipe(1, "a", &[2.0]);
        stale.average_rating = 5.0;
        assert_eq!(stale.calculate_average_rating().average_rating, 2.0);
    }

    #[test]
    fn test_average_ratings_preserves_order() {
        let out = calculate_average_ratings(vec![
            recipe(1, "Recipe 1", &[5.0, 3.0]),
            recipe(2, "Recipe 2", &[4.0, 4.0, 2.0]),
            recipe(3, "Recipe 3", &[]),
        ]);
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(out[0].average_rating, 4.0);
        assert!((out[1].average_rating - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(out[2].average_rating, 0.0);
        assert_eq!(out[0].name, "Recipe 1");

        assert!(calculate_average_ratings(Vec::new()).is_empty());
    }

    #[test]
    fn test_response_mapping() {
        let mut r = recipe(1, "Pad Thai", &[5.0]);
        r.rating = Some(rating(9, 5.0, "user123"));
        let response = FoodRecipeResponse::from(&r.calculate_average_rating());

        assert_eq!(response.name, "Pad Thai");
        assert_eq!(response.user.id, "user123");
        assert_eq!(response.rating.as_ref().map(|r| r.id), Some(9));
        assert!(response.favorite.is_none());

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("imageUrl"));
        assert!(json.contains(r#""averageRating":5.0"#));
        assert!(json.contains(r#""favorite":null"#));
        assert!(json.contains(r#""cookingDuration":{"id":1,"name":"Quick (15 min)"}"#));
    }

    #[test]
    fn test_request_validation() {
        let valid = FoodRecipeRequest {
            name: "Pad Thai".into(),
            description: "Traditional Thai noodle dish".into(),
            ingredient: "Rice noodles".into(),
            instruction: "Stir fry".into(),
            image_url: Some("https://example.com/image.jpg".into()),
            cooking_duration_id: 2,
            difficulty_id: 1,
        };
        assert!(valid.validate().is_ok());

        let missing = FoodRecipeRequest {
            name: String::new(),
            description: String::new(),
            ingredient: String::new(),
            instruction: String::new(),
            image_url: None,
            cooking_duration_id: 1,
            difficulty_id: 1,
        };
        let errors = missing.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "description", "ingredient", "instruction"] {
            assert!(fields.contains_key(field), "{field} should be reported");
        }

        let bad_lookup = FoodRecipeRequest { cooking_duration_id: 5, difficulty_id: 5, ..valid.clone() };
        let errors = bad_lookup.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cooking_duration_id"));
        assert!(errors.field_errors().contains_key("difficulty_id"));

        let bad_url = FoodRecipeRequest { image_url: Some("invalid-url".into()), ..valid };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_request_json_names_and_blank_image() {
        let request: FoodRecipeRequest = serde_json::from_str(
            r#"{"name":"n","description":"d","ingredient":"i","instruction":"s",
                "imageURL":"","cookingDurationID":1,"difficultyID":2}"#,
        )
        .unwrap();
        let request = request.normalized();
        assert!(request.image_url.is_none());
        assert_eq!(request.difficulty_id, 2);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_is_partial() {
        let update: UpdateFoodRecipe = serde_json::from_str(r#"{"name":"New name"}"#).unwrap();
        assert_eq!(update.name.as_deref(), Some("New name"));
        assert!(update.difficulty_id.is_none());
        assert!(!update.is_empty());
        assert!(UpdateFoodRecipe::default().is_empty());
    }

    #[test]
    fn test_search_term() {
        let q = RecipeQuery { search: Some("  thai ".into()), ..Default::default() };
        assert_eq!(q.search_term().as_deref(), Some("thai"));
        let q = RecipeQuery { search: Some("   ".into()), ..Default::default() };
        assert!(q.search_term().is_none());
    }
}
