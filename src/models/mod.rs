//! Data Models Module
//!
//! Account documents, lifecycle state, and token structures used
//! throughout the credential lifecycle core.

pub mod account;
pub mod auth;

// Re-export commonly used types
pub use account::*;
pub use auth::*;
