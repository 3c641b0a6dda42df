//! Middleware Module
//!
//! Request-processing stages of the pipeline. Stages execute in strict
//! registration order; the router wires session resolution over the whole
//! surface and the Access Guard over protected subtrees only.
//!
//! - **`session`** - cookie read + session/identity resolution
//! - **`guard`** - Access Guard and the `AuthIdentity` extractor

pub mod session;

pub mod guard;

pub use guard::{require_identity, AuthIdentity};
pub use session::{cookie_value, session_middleware, CurrentIdentity};
