/**
 * Application State
 *
 * The central state container for the gateway. The session store, identity
 * store, strategy registry, and file storage are constructed once at
 * startup and passed by reference into the pipeline through this struct;
 * there is no ambient global.
 *
 * All fields are cheap to clone and safe for concurrent access: the stores
 * keep their maps behind `tokio::sync::RwLock` internally.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::identity::IdentityStore;
use crate::auth::sessions::SessionStore;
use crate::auth::strategy::StrategyRegistry;
use crate::files::storage::FileStorage;
use crate::server::config::ServerConfig;

/// Shared state for every request handler
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration, fixed at startup
    pub config: Arc<ServerConfig>,
    /// Identity store the credential verifier runs against
    pub identities: IdentityStore,
    /// Opaque-token session store
    pub sessions: SessionStore,
    /// Registered authentication strategies
    pub strategies: Arc<StrategyRegistry>,
    /// Upload storage and records
    pub storage: FileStorage,
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for IdentityStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.identities.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<StrategyRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.strategies.clone()
    }
}

impl FromRef<AppState> for FileStorage {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.storage.clone()
    }
}
