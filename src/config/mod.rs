//! Configuration Module
//!
//! Shared configuration for the credential lifecycle core. Secrets are
//! explicit constructor inputs, never process-wide globals; `from_env`
//! exists for binaries that configure through the environment.

use anyhow::Result;
use chrono::Duration;

use crate::utils::security::DEFAULT_BCRYPT_COST;

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a required environment variable
    pub fn require(key: &str) -> anyhow::Result<String> {
        env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable is required", key))
    }
}

/// Configuration for token signing, OTP hashing, and challenge lifetimes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret for access token signatures
    pub access_token_secret: String,

    /// Secret for refresh token signatures (distinct from access)
    pub refresh_token_secret: String,

    /// Server-wide secret keying OTP digests
    pub otp_secret: String,

    /// Access token lifetime (default 15 minutes)
    pub access_token_expires_in: Duration,

    /// Refresh token lifetime (default 7 days)
    pub refresh_token_expires_in: Duration,

    /// OTP challenge lifetime (default 10 minutes)
    pub otp_expires_in: Duration,

    /// Password-reset token lifetime (default 1 hour)
    pub reset_token_expires_in: Duration,

    /// bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,

    /// Base URL used when building password-reset links
    pub app_base_url: String,
}

impl AuthConfig {
    /// Create a configuration with default lifetimes.
    pub fn new(
        access_token_secret: impl Into<String>,
        refresh_token_secret: impl Into<String>,
        otp_secret: impl Into<String>,
    ) -> Self {
        Self {
            access_token_secret: access_token_secret.into(),
            refresh_token_secret: refresh_token_secret.into(),
            otp_secret: otp_secret.into(),
            access_token_expires_in: Duration::minutes(15),
            refresh_token_expires_in: Duration::days(7),
            otp_expires_in: Duration::minutes(10),
            reset_token_expires_in: Duration::hours(1),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            app_base_url: "http://localhost:3000".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// The three secrets are required; lifetimes fall back to their
    /// defaults when unset.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            access_token_secret: env::require("JWT_SECRET")?,
            refresh_token_secret: env::require("JWT_REFRESH_SECRET")?,
            otp_secret: env::require("OTP_SECRET")?,
            access_token_expires_in: Duration::minutes(env::get_i64(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                15,
            )),
            refresh_token_expires_in: Duration::days(env::get_i64("REFRESH_TOKEN_EXPIRE_DAYS", 7)),
            otp_expires_in: Duration::minutes(env::get_i64("OTP_EXPIRE_MINUTES", 10)),
            reset_token_expires_in: Duration::minutes(env::get_i64("RESET_TOKEN_EXPIRE_MINUTES", 60)),
            bcrypt_cost: env::get_u32("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            app_base_url: env::get_string("APP_BASE_URL", "http://localhost:3000"),
        })
    }

    /// OTP lifetime in whole minutes, for notification copy
    pub fn otp_expire_minutes(&self) -> i64 {
        self.otp_expires_in.num_minutes()
    }
}
