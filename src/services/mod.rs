//! Business logic services

pub mod favorites;
pub mod oidc;
pub mod ratings;
pub mod recipes;
pub mod redis;
pub mod session;
pub mod users;

use std::sync::Arc;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub recipes: recipes::RecipesService,
    pub ratings: ratings::RatingsService,
    pub favorites: favorites::FavoritesService,
    pub users: users::UsersService,
    pub session: Arc<session::SessionService>,
    pub redis: redis::RedisService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        session: Arc<session::SessionService>,
        redis_service: redis::RedisService,
    ) -> Self {
        let recipes = recipes::RecipesService::new(repository.clone());
        Self {
            ratings: ratings::RatingsService::new(repository.clone(), recipes.clone()),
            favorites: favorites::FavoritesService::new(repository.clone(), recipes.clone()),
            users: users::UsersService::new(repository.clone()),
            recipes,
            session,
            redis: redis_service,
            repository,
        }
    }
}
