//! Recipe query specification.
//!
//! A [`RecipeQuerySpec`] describes which recipes to load, for whom, and which
//! relations to attach. It carries no SQL: [`RecipeQuerySpec::select`] and
//! [`RecipeFilter::count`] render it, and both go through the same
//! FROM/JOIN/WHERE helper so a listing and its total can never disagree.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::models::{
    favorite::Favorite,
    lookup::{CookingDuration, Difficulty},
    pagination::Pagination,
    rating::Rating,
    recipe::FoodRecipe,
    user::UserResponse,
};

/// Which recipes to match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub id: Option<i32>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub owner_id: Option<String>,
    /// Only recipes with a live favorite by this user
    pub favorited_by: Option<String>,
}

/// Relations attached to each fetched recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relations {
    /// All live ratings (needed for the average)
    pub ratings: bool,
    /// The viewer's own favorite and rating
    pub viewer_state: bool,
}

impl Default for Relations {
    fn default() -> Self {
        Self {
            ratings: true,
            viewer_state: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeQuerySpec {
    pub filter: RecipeFilter,
    /// User whose favorite/rating populate the "mine" fields; `None` is anonymous
    pub viewer_id: Option<String>,
    pub pagination: Option<Pagination>,
    pub relations: Relations,
}

impl RecipeQuerySpec {
    pub fn by_id(id: i32) -> Self {
        Self {
            filter: RecipeFilter {
                id: Some(id),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn page(filter: RecipeFilter, pagination: Pagination) -> Self {
        Self {
            filter,
            pagination: Some(pagination),
            ..Default::default()
        }
    }

    pub fn for_viewer(mut self, viewer_id: Option<&str>) -> Self {
        self.viewer_id = viewer_id.map(str::to_string);
        self
    }

    /// Render the row query: filters, stable ordering, then the page window
    pub fn select(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(SELECT_COLUMNS);
        self.filter.push_from_where(&mut qb);
        qb.push(" ORDER BY r.name ASC, r.id ASC");
        if let Some(page) = self.pagination {
            qb.push(" LIMIT ");
            qb.push_bind(page.limit);
            qb.push(" OFFSET ");
            qb.push_bind(page.offset());
        }
        qb
    }
}

const SELECT_COLUMNS: &str = "SELECT r.id, r.name, r.description, r.ingredient, r.instruction, \
     r.image_url, r.created_at, r.updated_at, \
     cd.id AS cooking_duration_id, cd.name AS cooking_duration_name, \
     d.id AS difficulty_id, d.name AS difficulty_name, \
     u.id AS user_id, u.first_name AS user_first_name, u.last_name AS user_last_name, \
     u.nick_name AS user_nick_name, u.image_url AS user_image_url";

impl RecipeFilter {
    pub fn search(term: Option<String>) -> Self {
        Self {
            search: term,
            ..Default::default()
        }
    }

    pub fn owned_by(user_id: &str) -> Self {
        Self {
            owner_id: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    pub fn favorited_by(user_id: &str) -> Self {
        Self {
            favorited_by: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    /// Render the total-count query for this filter
    pub fn count(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*)");
        self.push_from_where(&mut qb);
        qb
    }

    fn push_from_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(
            " FROM food_recipes r \
             JOIN cooking_durations cd ON cd.id = r.cooking_duration_id \
             JOIN difficulties d ON d.id = r.difficulty_id \
             JOIN users u ON u.id = r.user_id",
        );
        if let Some(user_id) = &self.favorited_by {
            qb.push(" JOIN favorites f ON f.food_recipe_id = r.id AND f.deleted_at IS NULL AND f.user_id = ");
            qb.push_bind(user_id.clone());
        }

        qb.push(" WHERE r.deleted_at IS NULL");

        if let Some(id) = self.id {
            qb.push(" AND r.id = ");
            qb.push_bind(id);
        }
        if let Some(owner) = &self.owner_id {
            qb.push(" AND r.user_id = ");
            qb.push_bind(owner.clone());
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (r.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR r.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
    }
}

/// Escape LIKE metacharacters; backslash is the default escape character in PostgreSQL
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Flat recipe row as produced by [`RecipeQuerySpec::select`]
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub ingredient: String,
    pub instruction: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cooking_duration_id: i32,
    pub cooking_duration_name: String,
    pub difficulty_id: i32,
    pub difficulty_name: String,
    pub user_id: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_nick_name: Option<String>,
    pub user_image_url: Option<String>,
}

impl RecipeRow {
    fn into_recipe(self) -> FoodRecipe {
        FoodRecipe {
            id: self.id,
            name: self.name,
            description: self.description,
            ingredient: self.ingredient,
            instruction: self.instruction,
            image_url: self.image_url,
            cooking_duration: CookingDuration {
                id: self.cooking_duration_id,
                name: self.cooking_duration_name,
            },
            difficulty: Difficulty {
                id: self.difficulty_id,
                name: self.difficulty_name,
            },
            user: UserResponse {
                id: self.user_id,
                first_name: self.user_first_name,
                last_name: self.user_last_name,
                nick_name: self.user_nick_name,
                image_url: self.user_image_url,
            },
            ratings: Vec::new(),
            favorite: None,
            rating: None,
            average_rating: 0.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Build recipes from their rows and preloaded relations.
///
/// `ratings` are all live ratings of the fetched recipes; `favorites` are the
/// viewer's live favorites. Only rows belonging to `viewer_id` ever populate
/// `favorite` and `rating`; an anonymous viewer gets neither.
pub fn assemble(
    rows: Vec<RecipeRow>,
    ratings: Vec<Rating>,
    favorites: Vec<Favorite>,
    viewer_id: Option<&str>,
) -> Vec<FoodRecipe> {
    let mut ratings_by_recipe: HashMap<i32, Vec<Rating>> = HashMap::new();
    for rating in ratings {
        ratings_by_recipe
            .entry(rating.food_recipe_id)
            .or_default()
            .push(rating);
    }

    let mut favorite_by_recipe: HashMap<i32, Favorite> = HashMap::new();
    if let Some(viewer) = viewer_id {
        for favorite in favorites {
            if favorite.user_id == viewer && favorite.is_active() {
                favorite_by_recipe.insert(favorite.food_recipe_id, favorite);
            }
        }
    }

    rows.into_iter()
        .map(|row| {
            let mut recipe = row.into_recipe();
            recipe.ratings = ratings_by_recipe.remove(&recipe.id).unwrap_or_default();
            if let Some(viewer) = viewer_id {
                recipe.rating = recipe
                    .ratings
                    .iter()
                    .find(|r| r.user_id == viewer)
                    .cloned();
                recipe.favorite = favorite_by_recipe.remove(&recipe.id);
            }
            recipe
        })
        .collect()
}
