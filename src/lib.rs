//! Wongnok recipe sharing server
//!
//! REST JSON API for sharing, rating and favoriting food recipes, with
//! sign-in delegated to an OpenID Connect provider.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
