//! Authentication Handlers
//!
//! HTTP endpoints for the authentication surface:
//!
//! - **`flow`** - strategy-generic entry (`/auth/{provider}`) and callback
//!   (`/auth/{provider}/callback`)
//! - **`register`** - local account creation
//! - **`logout`** - session teardown
//! - **`profile`** - example protected collaborator
//! - **`types`** - shared request/response bodies
//!
//! The session cookie is the only authentication artifact handed to
//! clients; helpers here build its `Set-Cookie` values.

use crate::server::config::ServerConfig;

/// Shared request/response types
pub mod types;

/// Strategy-generic login and callback handlers
pub mod flow;

/// Local account registration handler
pub mod register;

/// Logout handler
pub mod logout;

/// Protected profile handler
pub mod profile;

pub use flow::{begin_auth, finish_auth};
pub use logout::logout;
pub use profile::profile;
pub use register::register;
pub use types::{IdentityResponse, RegisterRequest, SessionResponse};

/// `Set-Cookie` value establishing a session
pub(crate) fn session_cookie(config: &ServerConfig, token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name, token, config.session_ttl_secs
    )
}

/// `Set-Cookie` value clearing the session cookie
pub(crate) fn clear_session_cookie(config: &ServerConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    )
}
