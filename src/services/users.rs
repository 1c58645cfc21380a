//! User profile service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        auth::Claims,
        user::{UpdateUser, User},
    },
    repository::Repository,
};

/// Make sure the token subject has a live user row before it writes anything
/// that references it.
pub(crate) async fn ensure_active(repository: &Repository, claims: &Claims) -> AppResult<()> {
    if repository.users.ensure_exists(claims).await? {
        Ok(())
    } else {
        Err(AppError::Authorization("Account has been deleted".to_string()))
    }
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// The caller's own profile
    pub async fn get(&self, claims: &Claims) -> AppResult<User> {
        self.repository.users.get_by_id(&claims.id).await
    }

    /// Create the caller's profile from token claims, or refresh its names
    pub async fn create(&self, claims: &Claims) -> AppResult<User> {
        claims.validate()?;
        self.repository
            .users
            .upsert(claims)
            .await?
            .ok_or_else(|| AppError::Authorization("Account has been deleted".to_string()))
    }

    pub async fn update(&self, claims: &Claims, data: UpdateUser) -> AppResult<User> {
        let data = data.normalized();
        data.validate()?;
        ensure_active(&self.repository, claims).await?;
        self.repository.users.update(&claims.id, &data).await
    }

    pub async fn delete(&self, claims: &Claims) -> AppResult<()> {
        self.repository.users.soft_delete(&claims.id).await
    }
}
