//! Bearer-token authorization middleware

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, services::session::SessionService};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Authentication("Empty bearer token".to_string()));
    }
    Ok(token)
}

/// Verify the bearer token and attach its [`Claims`](crate::models::auth::Claims)
/// to the request extensions. Any failure is a 401.
pub async fn authorize(
    State(session): State<Arc<SessionService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = session.verify_token(token).await?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
