//! Wongnok Server - Recipe Sharing
//!
//! A Rust REST API server for sharing, rating and favoriting food recipes.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wongnok_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{
        oidc::{JwksCache, KeySource, OidcVerifier, ProviderMetadata, VerificationPolicy},
        redis::RedisService,
        session::SessionService,
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("wongnok_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Wongnok Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    // Redis only holds login states
    let redis_service = RedisService::new(&config.redis.url).context("Invalid Redis URL")?;
    if config.oidc.enforce_state {
        redis_service.ping().await.context("Failed to connect to Redis")?;
        tracing::info!("Connected to Redis");
    } else {
        tracing::warn!("oidc.enforce_state is off: login state is not checked on callback");
    }

    let session = build_session(&config).await?;

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let repository = Repository::new(pool);
    let services = Services::new(repository, Arc::new(session), redis_service);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    let addr = SocketAddr::new(
        server_host.parse().context("Invalid host address")?,
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Discover the provider and wire the token verifiers
async fn build_session(config: &AppConfig) -> anyhow::Result<SessionService> {
    let oidc = &config.oidc;
    let verification = &oidc.verification;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(oidc.http_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let metadata = ProviderMetadata::discover(&http, &oidc.realm_url())
        .await
        .context("Failed to discover identity provider")?;
    let mapping = oidc.host_mapping().context("Invalid identity provider URL")?;

    tracing::info!(issuer = %metadata.issuer, "Discovered identity provider");

    if verification.skip_issuer_check {
        tracing::warn!("oidc.verification.skip_issuer_check is on: tokens from any issuer are accepted");
    }
    if verification.skip_client_id_check {
        tracing::warn!("oidc.verification.skip_client_id_check is on: access token audience is not checked");
    }
    if !verification.issuer_allowlist.is_empty() {
        tracing::warn!(issuers = ?verification.issuer_allowlist, "Extra token issuers accepted");
    }

    let access_audience = (!verification.skip_client_id_check).then_some(oidc.client_id.as_str());
    let access_policy =
        VerificationPolicy::from_config(verification, &metadata.issuer, &mapping, access_audience)
            .context("Invalid token verification settings")?;
    let id_policy = VerificationPolicy::from_config(
        verification,
        &metadata.issuer,
        &mapping,
        Some(oidc.client_id.as_str()),
    )
    .context("Invalid token verification settings")?;

    let access_verifier = OidcVerifier::new(
        KeySource::Jwks(JwksCache::new(http.clone(), metadata.jwks_uri.clone())),
        access_policy,
    );
    let id_verifier = OidcVerifier::new(
        KeySource::Jwks(JwksCache::new(http.clone(), metadata.jwks_uri.clone())),
        id_policy,
    );

    SessionService::new(
        http,
        oidc,
        &metadata,
        mapping,
        Arc::new(access_verifier),
        Arc::new(id_verifier),
    )
    .context("Failed to set up sign-in")
}
