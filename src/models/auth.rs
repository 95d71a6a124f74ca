//! Authentication Models
//!
//! Data structures for token pairs and JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::AccountProfile;

/// JWT token pair returned on successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token for API authentication
    pub access_token: String,

    /// Long-lived refresh token, exchangeable for a new pair
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token lifetime in seconds
    pub access_token_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expires_in: i64,
}

impl TokenPair {
    /// Create a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_token_expires_in: i64,
        refresh_token_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            access_token_expires_in,
            refresh_token_expires_in,
        }
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject - account ID
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID - unique token identifier
    pub jti: String,

    /// Token type (always "access")
    #[serde(rename = "type")]
    pub token_type: String,
}

impl AccessTokenClaims {
    /// Create new access token claims
    pub fn new(account_id: Uuid, expires_at: DateTime<Utc>, issued_at: DateTime<Utc>) -> Self {
        Self {
            sub: account_id.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        }
    }
}

/// JWT claims for refresh tokens.
///
/// Refresh tokens carry no session identifier: revocation is membership in
/// the account's persisted token list, not a separate session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject - account ID
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID - unique token identifier
    pub jti: String,

    /// Token type (always "refresh")
    #[serde(rename = "type")]
    pub token_type: String,
}

impl RefreshTokenClaims {
    /// Create new refresh token claims
    pub fn new(account_id: Uuid, expires_at: DateTime<Utc>, issued_at: DateTime<Utc>) -> Self {
        Self {
            sub: account_id.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: "refresh".to_string(),
        }
    }
}

/// Payload returned by a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    /// The newly created account (pending verification)
    pub account: AccountProfile,
}

/// Payload returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The authenticated account
    pub account: AccountProfile,

    /// Freshly issued token pair
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_pair_creation() {
        let pair = TokenPair::new(
            "access_token".to_string(),
            "refresh_token".to_string(),
            900,
            604800,
        );

        assert_eq!(pair.access_token, "access_token");
        assert_eq!(pair.refresh_token, "refresh_token");
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.access_token_expires_in, 900);
        assert_eq!(pair.refresh_token_expires_in, 604800);
    }

    #[test]
    fn test_access_token_claims_creation() {
        let account_id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = now + Duration::minutes(15);

        let claims = AccessTokenClaims::new(account_id, expires_at, now);

        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.token_type, "access");
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_refresh_token_claims_creation() {
        let account_id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = now + Duration::days(7);

        let claims = RefreshTokenClaims::new(account_id, expires_at, now);

        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.token_type, "refresh");
        assert!(!claims.jti.is_empty());
    }
}
