//! Route Configuration Module
//!
//! Router assembly for the gateway. Routes split into the open
//! authentication surface and the protected subtree behind the Access
//! Guard; unmatched routes fall through to the normalized 404.

/// Main router creation
pub mod router;

// Re-export commonly used functions
pub use router::create_router;
