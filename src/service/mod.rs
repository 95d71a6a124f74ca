//! Service Layer
//!
//! Business logic for the credential lifecycle: the orchestrator, the
//! token issuer, and the notification contract with its SMTP
//! implementation.

pub mod auth;
pub mod email_service;
pub mod notifier;
pub mod token;

// Re-export services
pub use auth::AuthService;
pub use email_service::{EmailConfig, EmailService};
pub use notifier::{DeliveryError, Notifier};
pub use token::{TokenError, TokenService};
