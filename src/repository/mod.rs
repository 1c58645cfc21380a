//! Repository layer for database operations

pub mod favorites;
pub mod query;
pub mod ratings;
pub mod recipes;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub recipes: recipes::RecipesRepository,
    pub ratings: ratings::RatingsRepository,
    pub favorites: favorites::FavoritesRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            recipes: recipes::RecipesRepository::new(pool.clone()),
            ratings: ratings::RatingsRepository::new(pool.clone()),
            favorites: favorites::FavoritesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
