/**
 * Server Initialization
 *
 * Builds the application state and the router.
 *
 * # Initialization Steps
 *
 * 1. Open the upload storage directory
 * 2. Create the identity and session stores
 * 3. Register one strategy per configured provider (local is always
 *    available; an OAuth provider is registered only when its credentials
 *    are present, and a misconfigured provider is disabled rather than
 *    taking the server down)
 * 4. Assemble the router around the shared state
 */

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::auth::identity::{IdentityStore, Provider};
use crate::auth::sessions::SessionStore;
use crate::auth::strategy::{
    LocalStrategy, OAuthEndpoints, OAuthStrategy, Strategy, StrategyRegistry,
};
use crate::error::GatewayError;
use crate::files::storage::FileStorage;
use crate::routes::router::create_router;
use crate::server::config::{OAuthCredentials, ServerConfig};
use crate::server::state::AppState;

/// Create and configure the application
pub async fn create_app(config: ServerConfig) -> Result<Router, GatewayError> {
    let state = build_state(config).await?;
    Ok(create_router(state))
}

/// Build the shared application state from configuration
pub async fn build_state(config: ServerConfig) -> Result<AppState, GatewayError> {
    tracing::info!("initializing gateway state");

    let storage = FileStorage::new(config.upload_dir.clone(), config.max_upload_bytes).await?;
    let identities = IdentityStore::new();
    let sessions = SessionStore::new(chrono::Duration::seconds(config.session_ttl_secs));

    let mut strategies = StrategyRegistry::new();
    strategies.register("local", Strategy::Local(LocalStrategy));

    let timeout = Duration::from_secs(config.provider_timeout_secs);
    if let Some(credentials) = &config.google {
        register_oauth(
            &mut strategies,
            "google",
            Provider::Google,
            OAuthEndpoints::google(),
            credentials,
            timeout,
        );
    }
    if let Some(credentials) = &config.facebook {
        register_oauth(
            &mut strategies,
            "facebook",
            Provider::Facebook,
            OAuthEndpoints::facebook(),
            credentials,
            timeout,
        );
    }

    tracing::info!(strategies = ?strategies.names(), "authentication strategies ready");

    Ok(AppState {
        config: Arc::new(config),
        identities,
        sessions,
        strategies: Arc::new(strategies),
        storage,
    })
}

/// Register one OAuth provider, disabling it on construction failure
fn register_oauth(
    strategies: &mut StrategyRegistry,
    name: &str,
    provider: Provider,
    endpoints: OAuthEndpoints,
    credentials: &OAuthCredentials,
    timeout: Duration,
) {
    match OAuthStrategy::new(
        provider,
        endpoints,
        credentials.client_id.clone(),
        credentials.client_secret.clone(),
        credentials.redirect_uri.clone(),
        timeout,
    ) {
        Ok(strategy) => strategies.register(name, Strategy::OAuth(strategy)),
        Err(e) => {
            tracing::error!(strategy = name, error = %e, "provider disabled: strategy construction failed");
        }
    }
}
