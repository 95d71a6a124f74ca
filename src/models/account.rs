//! Account Model
//!
//! The account document and its lifecycle state. An account is either
//! pending email verification or verified; verification is monotone and
//! never reverts. At most one OTP challenge and one reset challenge exist
//! per account at any time: issuing a new one overwrites the previous
//! value. The active refresh-token list is bounded at
//! [`MAX_ACTIVE_REFRESH_TOKENS`], evicting the oldest entry first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of concurrently active refresh tokens per account
pub const MAX_ACTIVE_REFRESH_TOKENS: usize = 5;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Outstanding email-verification challenge.
///
/// Only the keyed digest of the OTP code is persisted, never the code
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// HMAC-SHA256 digest of the OTP code
    pub otp_hash: String,

    /// Instant after which the code is unusable
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Whether the challenge is still usable at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Email-verification state of an account.
///
/// The transition `Pending -> Verified` is one-way; there is no
/// constructor that moves a verified account back to pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum VerificationState {
    /// Registered but email not yet confirmed; login is refused
    Pending(OtpChallenge),

    /// Email confirmed; login is allowed
    Verified,
}

/// Outstanding single-use password-reset challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetChallenge {
    /// Opaque 256-bit token, hex encoded
    pub token: String,

    /// Instant after which the token is unusable
    pub expires_at: DateTime<Utc>,
}

impl ResetChallenge {
    /// Whether the challenge is still usable at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// One active refresh token held by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// The signed refresh token as issued
    pub token: String,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

/// Account document as persisted by the store.
///
/// Owned exclusively by the orchestrator; all mutation goes through the
/// methods below, which uphold the lifecycle invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (unique, normalized)
    pub email: String,

    /// bcrypt hash of the password
    pub password_hash: String,

    /// Account role
    pub role: Role,

    /// Email-verification state
    pub verification: VerificationState,

    /// Outstanding password-reset challenge, if any
    pub reset: Option<ResetChallenge>,

    /// Active refresh tokens, oldest first
    pub refresh_tokens: Vec<RefreshTokenRecord>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    pub updated_at: DateTime<Utc>,

    /// Document version for optimistic-concurrency saves (0 = unsaved)
    pub version: u64,
}

impl Account {
    /// Create a new account pending email verification.
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        otp: OtpChallenge,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: Role::User,
            verification: VerificationState::Pending(otp),
            reset: None,
            refresh_tokens: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Whether the account has completed email verification
    pub fn is_verified(&self) -> bool {
        matches!(self.verification, VerificationState::Verified)
    }

    /// Outstanding OTP challenge, if the account is still pending
    pub fn otp_challenge(&self) -> Option<&OtpChallenge> {
        match &self.verification {
            VerificationState::Pending(challenge) => Some(challenge),
            VerificationState::Verified => None,
        }
    }

    /// Transition to `Verified`, discarding the OTP challenge.
    ///
    /// Verification is monotone: calling this on an already verified
    /// account is a no-op.
    pub fn mark_verified(&mut self) {
        self.verification = VerificationState::Verified;
    }

    /// Overwrite the pending OTP challenge with a new one.
    ///
    /// Returns `false` (and changes nothing) if the account is already
    /// verified. The previous code is invalidated even if unexpired.
    pub fn replace_otp(&mut self, challenge: OtpChallenge) -> bool {
        match self.verification {
            VerificationState::Pending(_) => {
                self.verification = VerificationState::Pending(challenge);
                true
            }
            VerificationState::Verified => false,
        }
    }

    /// Append an active refresh token, evicting the oldest past capacity.
    pub fn push_refresh_token(&mut self, token: String, now: DateTime<Utc>) {
        self.refresh_tokens.push(RefreshTokenRecord {
            token,
            created_at: now,
        });
        if self.refresh_tokens.len() > MAX_ACTIVE_REFRESH_TOKENS {
            let excess = self.refresh_tokens.len() - MAX_ACTIVE_REFRESH_TOKENS;
            self.refresh_tokens.drain(..excess);
        }
    }

    /// Remove one refresh token; returns whether it was present.
    pub fn remove_refresh_token(&mut self, token: &str) -> bool {
        let before = self.refresh_tokens.len();
        self.refresh_tokens.retain(|record| record.token != token);
        self.refresh_tokens.len() != before
    }

    /// Whether a refresh token is in the active list
    pub fn has_refresh_token(&self, token: &str) -> bool {
        self.refresh_tokens
            .iter()
            .any(|record| record.token == token)
    }

    /// Drop every active refresh token (all-devices logout)
    pub fn clear_refresh_tokens(&mut self) {
        self.refresh_tokens.clear();
    }

    /// Overwrite the outstanding reset challenge.
    pub fn set_reset_challenge(&mut self, challenge: ResetChallenge) {
        self.reset = Some(challenge);
    }

    /// Clear the reset challenge (unset, preventing replay)
    pub fn clear_reset_challenge(&mut self) {
        self.reset = None;
    }

    /// Record a mutation timestamp
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Account projection safe to cross the core boundary.
///
/// Excludes the password hash, OTP digest, and reset token; this is the
/// only account shape handed back to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Unique identifier for the account
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Whether the email has been verified
    pub verified: bool,

    /// Account role
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

/// One page of account projections, for admin listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountPage {
    /// Accounts on this page, newest first
    pub accounts: Vec<AccountProfile>,

    /// 1-based page number
    pub page: usize,

    /// Page size requested
    pub limit: usize,

    /// Total number of accounts
    pub total: usize,

    /// Total number of pages
    pub pages: usize,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            verified: account.is_verified(),
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
