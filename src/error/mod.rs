//! Gateway Error Module
//!
//! Error taxonomy for the request pipeline and its conversion to HTTP
//! responses.
//!
//! # Architecture
//!
//! - **`types`** - The `GatewayError` enum and status-code mapping
//! - **`conversion`** - `IntoResponse` so handlers can return errors with `?`
//!
//! Every failure a stage surfaces flows through exactly one
//! `IntoResponse` conversion, so a request is never left unanswered and
//! never answered twice.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::GatewayError;
