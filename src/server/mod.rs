//! Server Module
//!
//! Initialization and configuration of the HTTP server.
//!
//! - **`config`** - environment-driven configuration loading
//! - **`state`** - `AppState` and `FromRef` implementations
//! - **`init`** - state construction and app creation

/// Configuration loading
pub mod config;

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::ServerConfig;
pub use init::{build_state, create_app};
pub use state::AppState;
