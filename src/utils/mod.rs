//! Utilities Module
//!
//! Shared utilities for error handling, security primitives, time, and
//! input normalization used throughout the credential lifecycle core.

pub mod clock;
pub mod error;
pub mod security;
pub mod validation;

// Re-export commonly used utilities
pub use clock::{Clock, SystemClock};
pub use error::{AuthError, AuthResult, ErrorKind};
pub use security::*;
pub use validation::*;
