//! Authentication Strategy Module
//!
//! Pluggable algorithms for turning request-carried credentials into a
//! verified identity.
//!
//! # Architecture
//!
//! - **`local`** - single round trip, password against the identity store
//! - **`oauth`** - two round trips, redirect + authorization-code exchange
//!
//! A strategy is a tagged variant, not a trait object: the pipeline
//! dispatches on [`Strategy`] and never branches on provider-name strings.
//! Each variant self-describes its request shape through
//! [`Strategy::requires_callback`], which is how local (one round trip) and
//! OAuth (two round trips) coexist behind the same two routes.

use std::collections::HashMap;

use crate::auth::identity::{Identity, IdentityStore};
use crate::error::GatewayError;

/// Local password strategy
pub mod local;

/// OAuth authorization-code strategy
pub mod oauth;

pub use local::LocalStrategy;
pub use oauth::{OAuthEndpoints, OAuthStrategy};

/// Credentials a strategy extracted from a request
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Local login body
    Password { username: String, password: String },
    /// OAuth callback query parameters
    AuthorizationCode { code: String, state: String },
}

/// A registered authentication strategy
pub enum Strategy {
    Local(LocalStrategy),
    OAuth(OAuthStrategy),
}

impl Strategy {
    /// Whether this strategy completes over a second (callback) round trip
    pub fn requires_callback(&self) -> bool {
        matches!(self, Self::OAuth(_))
    }

    /// Extract credentials from the pieces of the request a strategy reads
    ///
    /// Local strategies read the JSON body; callback strategies read the
    /// provider's query parameters.
    pub fn extract_credentials(
        &self,
        body: Option<&serde_json::Value>,
        query: &HashMap<String, String>,
    ) -> Result<Credentials, GatewayError> {
        match self {
            Self::Local(strategy) => strategy.extract_credentials(body),
            Self::OAuth(strategy) => strategy.extract_credentials(query),
        }
    }

    /// Provider consent URL opening the strategy's redirect flow
    ///
    /// Only meaningful for strategies with `requires_callback() == true`;
    /// the pipeline checks the capability flag before calling.
    pub fn authorize_redirect(&self) -> Result<String, GatewayError> {
        match self {
            Self::Local(_) => Err(GatewayError::internal(
                "strategy does not use a redirect flow",
            )),
            Self::OAuth(strategy) => strategy.begin(),
        }
    }

    /// Verify extracted credentials against the identity store
    pub async fn verify(
        &self,
        credentials: Credentials,
        identities: &IdentityStore,
    ) -> Result<Identity, GatewayError> {
        match (self, credentials) {
            (Self::Local(strategy), Credentials::Password { username, password }) => {
                strategy.verify(&username, &password, identities).await
            }
            (Self::OAuth(strategy), Credentials::AuthorizationCode { code, state }) => {
                strategy.finish(&code, &state, identities).await
            }
            _ => Err(GatewayError::internal(
                "credentials do not match the resolved strategy",
            )),
        }
    }
}

/// Named set of authentication strategies
///
/// Built once at startup and passed by reference into the pipeline; there
/// is no ambient global.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Strategy>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under a provider name
    pub fn register(&mut self, name: impl Into<String>, strategy: Strategy) {
        let name = name.into();
        tracing::info!(strategy = %name, "registered authentication strategy");
        self.strategies.insert(name, strategy);
    }

    /// Resolve a strategy by provider name
    pub fn resolve(&self, name: &str) -> Result<&Strategy, GatewayError> {
        self.strategies
            .get(name)
            .ok_or_else(|| GatewayError::not_found(format!("unknown authentication strategy: {name}")))
    }

    /// Registered strategy names
    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }
}
