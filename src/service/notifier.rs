//! Notifier Contract
//!
//! Outbound notification is an external collaborator. The core awaits
//! delivery so failures can surface to the caller, but delivery never
//! participates in account mutation: sends happen after the account state
//! has already been persisted.

use async_trait::async_trait;
use thiserror::Error;

/// A notification could not be delivered.
#[derive(Error, Debug)]
#[error("Email delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Contract for delivering lifecycle notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an OTP verification code
    async fn send_otp(
        &self,
        email: &str,
        name: &str,
        code: &str,
        expires_in_minutes: i64,
    ) -> Result<(), DeliveryError>;

    /// Send a password-reset link
    async fn send_password_reset(
        &self,
        email: &str,
        name: &str,
        reset_url: &str,
    ) -> Result<(), DeliveryError>;
}
