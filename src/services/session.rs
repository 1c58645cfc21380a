//! Login, callback and logout flow against the OpenID Connect provider

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use reqwest::Url;
use serde::Deserialize;

use super::oidc::{AuthError, ProviderMetadata, TokenVerifier};
use crate::{
    config::{HostMapping, OidcConfig},
    models::auth::{Claims, Credential, LogoutQuery},
};

const SCOPES: &str = "openid profile email";

/// Token endpoint answer
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    id_token: Option<String>,
}

pub struct SessionService {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    authorization_endpoint: Url,
    token_endpoint: String,
    logout_endpoint: String,
    mapping: HostMapping,
    access_verifier: Arc<dyn TokenVerifier>,
    id_verifier: Arc<dyn TokenVerifier>,
}

impl SessionService {
    /// `access_verifier` checks bearer tokens on API calls, `id_verifier`
    /// checks the ID token returned by the code exchange.
    pub fn new(
        http: reqwest::Client,
        config: &OidcConfig,
        metadata: &ProviderMetadata,
        mapping: HostMapping,
        access_verifier: Arc<dyn TokenVerifier>,
        id_verifier: Arc<dyn TokenVerifier>,
    ) -> Result<Self, AuthError> {
        let authorization_endpoint = Url::parse(&metadata.authorization_endpoint).map_err(|e| {
            AuthError::UrlConstruction(format!(
                "authorization endpoint {}: {}",
                metadata.authorization_endpoint, e
            ))
        })?;

        let logout_endpoint = metadata.end_session_endpoint.clone().unwrap_or_else(|| {
            format!("{}/protocol/openid-connect/logout", config.realm_url())
        });

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            authorization_endpoint,
            token_endpoint: metadata.token_endpoint.clone(),
            logout_endpoint: mapping.rewrite_str(&logout_endpoint),
            mapping,
            access_verifier,
            id_verifier,
        })
    }

    /// 32 random bytes, base64url without padding
    pub fn generate_state(&self) -> String {
        let mut buffer = [0u8; 32];
        OsRng.fill_bytes(&mut buffer);
        URL_SAFE_NO_PAD.encode(buffer)
    }

    /// Provider login URL for a browser, with the internal host swapped for the external one
    pub fn auth_code_url(&self, state: &str) -> String {
        let mut url = self.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("scope", SCOPES)
            .append_pair("state", state);
        self.mapping.rewrite(&mut url);
        url.to_string()
    }

    /// Trade an authorization code for tokens
    pub async fn exchange(&self, code: &str) -> Result<Credential, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_url.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange(format!("token endpoint answered {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("invalid token response: {}", e)))?;

        let id_token = token
            .id_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingIdToken)?;

        Ok(Credential {
            access_token: token.access_token,
            token_type: token.token_type,
            refresh_token: token.refresh_token,
            expiry: Utc::now() + Duration::seconds(token.expires_in),
            expires_in: token.expires_in,
            id_token,
        })
    }

    /// Verify a bearer access token
    pub async fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.access_verifier.verify(token).await
    }

    /// Verify the ID token issued for this client
    pub async fn verify_id_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.id_verifier.verify(token).await
    }

    /// Provider logout URL; only non-empty parameters are appended
    pub fn logout_url(&self, query: &LogoutQuery) -> Result<String, AuthError> {
        let mut url = Url::parse(&self.logout_endpoint).map_err(|e| {
            AuthError::UrlConstruction(format!("logout URL {}: {}", self.logout_endpoint, e))
        })?;

        let params: Vec<(&str, &str)> = [
            ("id_token_hint", query.id_token_hint.as_str()),
            ("post_logout_redirect_uri", query.post_logout_redirect_uri.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect();

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::post, Form, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    use super::*;
    use crate::services::oidc::{tests::serve, MockTokenVerifier};

    fn oidc_config() -> OidcConfig {
        OidcConfig {
            url: "http://host.docker.internal:8080".into(),
            external_url: "http://localhost:8080".into(),
            realm: "wongnok".into(),
            client_id: "wongnok".into(),
            client_secret: "s3cret".into(),
            redirect_url: "http://localhost:3000/api/auth/callback".into(),
            ..Default::default()
        }
    }

    fn metadata(token_endpoint: &str) -> ProviderMetadata {
        ProviderMetadata {
            issuer: "http://host.docker.internal:8080/realms/wongnok".into(),
            authorization_endpoint:
                "http://host.docker.internal:8080/realms/wongnok/protocol/openid-connect/auth".into(),
            token_endpoint: token_endpoint.into(),
            jwks_uri: "http://host.docker.internal:8080/realms/wongnok/protocol/openid-connect/certs".into(),
            end_session_endpoint: None,
        }
    }

    fn service_with(token_endpoint: &str, access: MockTokenVerifier, id: MockTokenVerifier) -> SessionService {
        let config = oidc_config();
        SessionService::new(
            reqwest::Client::new(),
            &config,
            &metadata(token_endpoint),
            config.host_mapping().unwrap(),
            Arc::new(access),
            Arc::new(id),
        )
        .unwrap()
    }

    fn service(token_endpoint: &str) -> SessionService {
        service_with(token_endpoint, MockTokenVerifier::new(), MockTokenVerifier::new())
    }

    #[test]
    fn test_generate_state() {
        let s = service("http://unused/token");
        let a = s.generate_state();
        let b = s.generate_state();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_auth_code_url_uses_external_host() {
        let url = service("http://unused/token").auth_code_url("abc123");
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("localhost"));
        assert_eq!(parsed.port(), Some(8080));
        assert_eq!(parsed.path(), "/realms/wongnok/protocol/openid-connect/auth");

        let query: HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(query["state"], "abc123");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["client_id"], "wongnok");
        assert_eq!(query["redirect_uri"], "http://localhost:3000/api/auth/callback");
        assert_eq!(query["scope"], "openid profile email");
        // The redirect target keeps its own host
        assert!(!url.contains("host.docker.internal"));
    }

    #[test]
    fn test_logout_url_parameters() {
        let s = service("http://unused/token");
        let base = "http://localhost:8080/realms/wongnok/protocol/openid-connect/logout";

        assert_eq!(s.logout_url(&LogoutQuery::default()).unwrap(), base);

        let url = s
            .logout_url(&LogoutQuery {
                id_token_hint: "tok".into(),
                post_logout_redirect_uri: String::new(),
            })
            .unwrap();
        assert_eq!(url, format!("{}?id_token_hint=tok", base));

        let url = s
            .logout_url(&LogoutQuery {
                id_token_hint: "tok".into(),
                post_logout_redirect_uri: "http://localhost:3000/signed out".into(),
            })
            .unwrap();
        assert!(url.starts_with(base));
        assert!(url.contains("id_token_hint=tok"));
        assert!(url.contains("post_logout_redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fsigned+out"));
    }

    #[test]
    fn test_logout_prefers_end_session_endpoint() {
        let config = oidc_config();
        let mut meta = metadata("http://unused/token");
        meta.end_session_endpoint =
            Some("http://host.docker.internal:8080/realms/wongnok/custom/logout".into());
        let s = SessionService::new(
            reqwest::Client::new(),
            &config,
            &meta,
            config.host_mapping().unwrap(),
            Arc::new(MockTokenVerifier::new()),
            Arc::new(MockTokenVerifier::new()),
        )
        .unwrap();
        assert_eq!(
            s.logout_url(&LogoutQuery::default()).unwrap(),
            "http://localhost:8080/realms/wongnok/custom/logout"
        );
    }

    async fn token_endpoint(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<serde_json::Value>) {
        if form.get("grant_type").map(String::as_str) != Some("authorization_code")
            || form.get("client_secret").map(String::as_str) != Some("s3cret")
        {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized_client"})));
        }
        match form.get("code").map(String::as_str) {
            Some("good") => (
                StatusCode::OK,
                Json(json!({
                    "access_token": "access-1",
                    "token_type": "Bearer",
                    "refresh_token": "refresh-1",
                    "expires_in": 300,
                    "id_token": "id-1"
                })),
            ),
            Some("no-id") => (
                StatusCode::OK,
                Json(json!({"access_token": "access-1", "token_type": "Bearer", "expires_in": 300})),
            ),
            _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))),
        }
    }

    #[tokio::test]
    async fn test_exchange() {
        let base = serve(Router::new().route("/token", post(token_endpoint))).await;
        let s = service(&format!("{}/token", base));

        let before = Utc::now();
        let credential = s.exchange("good").await.unwrap();
        assert_eq!(credential.access_token, "access-1");
        assert_eq!(credential.refresh_token, "refresh-1");
        assert_eq!(credential.id_token, "id-1");
        assert_eq!(credential.expires_in, 300);
        assert!(credential.expiry >= before + Duration::seconds(299));

        assert!(matches!(s.exchange("no-id").await, Err(AuthError::MissingIdToken)));
        assert!(matches!(s.exchange("bad").await, Err(AuthError::Exchange(_))));
    }

    #[tokio::test]
    async fn test_exchange_unreachable_provider() {
        let s = service("http://127.0.0.1:1/token");
        assert!(matches!(s.exchange("good").await, Err(AuthError::Exchange(_))));
    }

    #[tokio::test]
    async fn test_verifiers_are_distinct() {
        let mut access = MockTokenVerifier::new();
        access.expect_verify().returning(|_| {
            Ok(Claims { id: "from-access".into(), ..Default::default() })
        });
        let mut id = MockTokenVerifier::new();
        id.expect_verify()
            .withf(|t| t == "id-token")
            .returning(|_| Ok(Claims { id: "from-id".into(), ..Default::default() }));

        let s = service_with("http://unused/token", access, id);
        assert_eq!(s.verify_token("bearer").await.unwrap().id, "from-access");
        assert_eq!(s.verify_id_token("id-token").await.unwrap().id, "from-id");
    }
}
