//! Data models for Wongnok

pub mod auth;
pub mod favorite;
pub mod lookup;
pub mod pagination;
pub mod rating;
pub mod recipe;
pub mod user;

// Re-export commonly used types
pub use auth::{Claims, Credential};
pub use favorite::{Favorite, FavoriteResponse};
pub use lookup::{CookingDuration, Difficulty};
pub use pagination::{ListResponse, Pagination};
pub use rating::{Rating, RatingResponse};
pub use recipe::{FoodRecipe, FoodRecipeResponse};
pub use user::{User, UserResponse};
