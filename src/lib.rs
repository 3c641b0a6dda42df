//! authgate - Authenticated HTTP Gateway
//!
//! A backend gateway that authenticates users via federated identity
//! providers (Google, Facebook) and local credentials, maintains
//! server-held sessions, gates protected routes, and transfers files bound
//! to a user identity.
//!
//! # Architecture
//!
//! The core is the authenticated request pipeline:
//!
//! ```text
//! request
//!   → body/cookie parsing
//!   → session resolution        (middleware::session)
//!   → route dispatch            (routes::router)
//!   → Access Guard              (middleware::guard, protected routes)
//!   → handler                   (auth::handlers / files::handlers)
//!   → error normalization       (error::conversion)
//! response
//! ```
//!
//! # Module Structure
//!
//! - **`auth`** - identity store, session store, strategies, auth handlers
//! - **`middleware`** - session resolution and the Access Guard
//! - **`files`** - upload storage and file transfer handlers
//! - **`routes`** - router assembly
//! - **`server`** - configuration, state, initialization
//! - **`error`** - the error taxonomy and its HTTP conversion

/// Authentication: identity, sessions, strategies
pub mod auth;

/// Error taxonomy and normalization
pub mod error;

/// File transfer
pub mod files;

/// Pipeline middleware
pub mod middleware;

/// Route configuration
pub mod routes;

/// Server setup and state
pub mod server;

// Re-export commonly used types
pub use error::GatewayError;
pub use server::{create_app, AppState, ServerConfig};
