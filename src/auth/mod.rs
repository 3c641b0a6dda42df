//! Authentication Module
//!
//! Identity, sessions, and the pluggable strategies that connect the two.
//!
//! # Architecture
//!
//! - **`identity`** - canonical identity records and the store the
//!   credential verifier runs against
//! - **`sessions`** - opaque-token session store
//! - **`strategy`** - local and OAuth strategies behind one dispatch type
//! - **`handlers`** - the HTTP authentication surface
//!
//! # Authentication Flow
//!
//! 1. **Local**: credentials in the request body → verified against bcrypt
//!    hashes → session created, cookie set (one round trip)
//! 2. **OAuth**: redirect to the provider's consent URL → callback with an
//!    authorization code → code exchanged, profile fetched, identity
//!    found-or-created → session created, cookie set (two round trips)
//! 3. Subsequent requests resolve the cookie through the session store;
//!    protected routes additionally pass the Access Guard.

/// Identity model and store
pub mod identity;

/// Opaque-token session store
pub mod sessions;

/// Authentication strategies and their registry
pub mod strategy;

/// HTTP handlers for the authentication surface
pub mod handlers;

// Re-export commonly used types
pub use handlers::{begin_auth, finish_auth, logout, profile, register};
pub use identity::{Identity, IdentityStore, Provider};
pub use sessions::{Session, SessionStore};
pub use strategy::{Credentials, Strategy, StrategyRegistry};
