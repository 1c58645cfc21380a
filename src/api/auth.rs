//! OpenID Connect login, callback and logout endpoints

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::auth::{CallbackQuery, Credential, LogoutQuery},
    AppState,
};

/// Redirect the browser to the identity provider
#[utoipa::path(
    get,
    path = "/login",
    tag = "auth",
    responses(
        (status = 307, description = "Redirect to the identity provider login page")
    )
)]
pub async fn login(State(state): State<AppState>) -> AppResult<Redirect> {
    let session = &state.services.session;
    let login_state = session.generate_state();

    if state.config.oidc.enforce_state {
        state
            .services
            .redis
            .store_login_state(&login_state, state.config.oidc.state_ttl_secs)
            .await?;
    }

    Ok(Redirect::temporary(&session.auth_code_url(&login_state)))
}

/// Complete the login: check state, exchange the code and verify the ID token
#[utoipa::path(
    get,
    path = "/callback",
    tag = "auth",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Tokens for the signed-in user", body = Credential),
        (status = 400, description = "Missing code", body = crate::error::ErrorResponse),
        (status = 401, description = "Unknown state or invalid ID token", body = crate::error::ErrorResponse),
        (status = 502, description = "Identity provider failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Json<Credential>> {
    if query.code.is_empty() {
        return Err(AppError::BadRequest("Missing authorization code".to_string()));
    }

    if state.config.oidc.enforce_state {
        let known = !query.state.is_empty()
            && state.services.redis.consume_login_state(&query.state).await?;
        if !known {
            return Err(AppError::Authentication("Unknown or expired login state".to_string()));
        }
    }

    let session = &state.services.session;
    let credential = session.exchange(&query.code).await?;
    let claims = session.verify_id_token(&credential.id_token).await?;

    state.services.users.create(&claims).await?;
    tracing::info!(user_id = %claims.id, "User signed in");

    Ok(Json(credential))
}

/// Redirect the browser to the identity provider logout page
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    params(LogoutQuery),
    responses(
        (status = 307, description = "Redirect to the identity provider logout page")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Query(query): Query<LogoutQuery>,
) -> AppResult<Redirect> {
    let url = state.services.session.logout_url(&query)?;
    Ok(Redirect::temporary(&url))
}
