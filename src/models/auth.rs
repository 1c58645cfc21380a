//! Identity types produced by the OpenID Connect flow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Verified identity attributes taken from a provider token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Claims {
    /// Provider subject, used as the user id
    #[serde(rename = "sub")]
    #[validate(length(min = 1, message = "token has no subject"))]
    pub id: String,
    #[serde(rename = "given_name", default)]
    pub first_name: String,
    #[serde(rename = "family_name", default)]
    pub last_name: String,
}

/// Token bundle returned once after a successful code exchange. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    pub expiry: DateTime<Utc>,
    pub expires_in: i64,
    pub id_token: String,
}

/// Query string of the provider redirect back to `/callback`
#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
}

/// Query string accepted by `/logout`
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LogoutQuery {
    #[serde(default)]
    pub id_token_hint: String,
    #[serde(default)]
    pub post_logout_redirect_uri: String,
}
