//! Error Handling
//!
//! Error types for the credential lifecycle core. The core is
//! transport-agnostic: every operation returns an [`AuthError`] whose
//! [`ErrorKind`] callers map to their own status codes.

use thiserror::Error;

use crate::service::notifier::DeliveryError;
use crate::service::token::TokenError;
use crate::store::StoreError;

/// Errors returned by lifecycle operations.
///
/// Security-sensitive variants carry deliberately generic messages: the
/// response for an unknown email is identical to the response for a wrong
/// password.
#[derive(Error, Debug)]
pub enum AuthError {
    /// An account with this email already exists
    #[error("User already exists with this email")]
    AlreadyExists,

    /// Unknown account or password mismatch (never distinguished)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account has not completed email verification
    #[error("Please verify your email before logging in")]
    NotVerified,

    /// OTP or reset token missing, wrong, or past its expiry
    #[error("Invalid or expired token")]
    InvalidOrExpired,

    /// Refresh token failed verification or is not in the account's
    /// active list (revoked or already rotated)
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Current password did not match during a password change
    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,

    /// Account not found (or not in a state the operation accepts)
    #[error("User not found")]
    NotFound,

    /// Notification could not be delivered
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Token could not be minted
    #[error("Token generation error: {0}")]
    TokenGeneration(String),
}

/// Coarse error classification for transport layers.
///
/// `Delivery` and `Unavailable` are dependency failures a caller may retry
/// or degrade on; everything else is a state or security failure that must
/// not be retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    InvalidCredentials,
    NotVerified,
    InvalidOrExpired,
    InvalidRefreshToken,
    IncorrectCurrentPassword,
    NotFound,
    Delivery,
    Unavailable,
}

impl AuthError {
    /// Classify this error for transport mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AlreadyExists => ErrorKind::AlreadyExists,
            AuthError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AuthError::NotVerified => ErrorKind::NotVerified,
            AuthError::InvalidOrExpired => ErrorKind::InvalidOrExpired,
            AuthError::InvalidRefreshToken => ErrorKind::InvalidRefreshToken,
            AuthError::IncorrectCurrentPassword => ErrorKind::IncorrectCurrentPassword,
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::Delivery(_) => ErrorKind::Delivery,
            AuthError::Store(_) | AuthError::Hashing(_) | AuthError::TokenGeneration(_) => {
                ErrorKind::Unavailable
            }
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            // Signature failure and expiry surface to callers as the same
            // refresh failure; the re-auth path is identical either way.
            TokenError::Expired | TokenError::Invalid => AuthError::InvalidRefreshToken,
            TokenError::Generation(msg) => AuthError::TokenGeneration(msg),
        }
    }
}

/// Result type alias for lifecycle operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_messages_are_generic() {
        // Same message whether the account is missing or the password is
        // wrong; callers must not be able to enumerate accounts.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
        assert_eq!(
            AuthError::InvalidOrExpired.to_string(),
            "Invalid or expired token"
        );
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(AuthError::AlreadyExists.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            AuthError::Store(StoreError::Backend("down".into())).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            AuthError::Delivery(DeliveryError("smtp timeout".into())).kind(),
            ErrorKind::Delivery
        );
    }

    #[test]
    fn test_token_error_conversion() {
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::InvalidRefreshToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::Invalid),
            AuthError::InvalidRefreshToken
        ));
    }
}
