//! Token Service
//!
//! Mints and verifies signed access/refresh token pairs. The two token
//! kinds are signed with distinct secrets and carry a `type` claim, so an
//! access token can never verify as a refresh token or vice versa.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::auth::{AccessTokenClaims, RefreshTokenClaims, TokenPair};

/// Token verification and generation failures.
///
/// `Expired` tells the caller to attempt a refresh or re-login; `Invalid`
/// means malformed or forged and must never be retried.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Signature valid but the token is past its expiry
    #[error("Token expired")]
    Expired,

    /// Malformed, forged, or signed for the wrong purpose
    #[error("Invalid token")]
    Invalid,

    /// Token could not be encoded
    #[error("Token generation failed: {0}")]
    Generation(String),
}

/// JWT issuer/verifier for access and refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    /// Secret for access token signatures
    access_secret: String,

    /// Secret for refresh token signatures
    refresh_secret: String,

    /// Access token lifetime
    access_token_expires_in: Duration,

    /// Refresh token lifetime
    refresh_token_expires_in: Duration,
}

impl TokenService {
    /// Create a token service from the shared configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_secret: config.access_token_secret.clone(),
            refresh_secret: config.refresh_token_secret.clone(),
            access_token_expires_in: config.access_token_expires_in,
            refresh_token_expires_in: config.refresh_token_expires_in,
        }
    }

    /// Create a token service with explicit secrets and lifetimes
    pub fn with_expiration(
        access_secret: String,
        refresh_secret: String,
        access_expires_in: Duration,
        refresh_expires_in: Duration,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    /// Mint a new access/refresh token pair for an account.
    pub fn issue_pair(
        &self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access_expires_at = now + self.access_token_expires_in;
        let refresh_expires_at = now + self.refresh_token_expires_in;

        let access_claims = AccessTokenClaims::new(account_id, access_expires_at, now);
        let access_token = self.encode_claims(&access_claims, &self.access_secret)?;

        let refresh_claims = RefreshTokenClaims::new(account_id, refresh_expires_at, now);
        let refresh_token = self.encode_claims(&refresh_claims, &self.refresh_secret)?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.access_token_expires_in.num_seconds(),
            self.refresh_token_expires_in.num_seconds(),
        ))
    }

    /// Verify an access token and extract the account id.
    pub fn verify_access(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims: AccessTokenClaims = self.decode_claims(token, &self.access_secret)?;
        if claims.token_type != "access" {
            return Err(TokenError::Invalid);
        }
        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid)
    }

    /// Verify a refresh token and extract the account id.
    ///
    /// Uses the refresh-specific secret; signature validity alone does not
    /// make the token usable; the orchestrator additionally checks list
    /// membership on the account.
    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims: RefreshTokenClaims = self.decode_claims(token, &self.refresh_secret)?;
        if claims.token_type != "refresh" {
            return Err(TokenError::Invalid);
        }
        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid)
    }

    /// Encode claims under the given secret
    fn encode_claims<C: Serialize>(&self, claims: &C, secret: &str) -> Result<String, TokenError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Decode and validate a token under the given secret
    fn decode_claims<C: DeserializeOwned>(
        &self,
        token: &str,
        secret: &str,
    ) -> Result<C, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        // Expiry is exact; no grace window
        validation.leeway = 0;

        let decoding_key = DecodingKey::from_secret(secret.as_ref());

        decode::<C>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
