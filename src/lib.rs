//! Auth Service Library
//!
//! Credential and session lifecycle core for a multi-tenant service:
//! one-time-password (OTP) email verification, password-reset tokens, and
//! JWT access/refresh token issuance, rotation, and revocation. The core
//! is transport-agnostic: HTTP routing, persistence, and email delivery
//! are collaborators injected behind traits.
//!
//! # Features
//!
//! - **Account lifecycle**: registration → OTP verification → login →
//!   refresh → logout, with explicit state per account
//! - **Hashed OTP challenges**: codes are stored only as keyed
//!   HMAC-SHA256 digests with short expiries, verified in constant time
//! - **Token rotation**: refresh tokens are single-use and revocable via
//!   the account's persisted token list (bounded, oldest evicted first)
//! - **Password reset**: unguessable 256-bit single-use tokens; a
//!   completed reset revokes every active session
//! - **Anti-enumeration**: identical responses for unknown accounts in
//!   login and password-reset flows
//! - **Injected collaborators**: storage ([`AccountStore`]), email
//!   ([`Notifier`]), and time ([`Clock`]) are traits, with an in-memory
//!   store and SMTP notifier included
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use auth_service::{
//!     AuthConfig, AuthService, EmailConfig, EmailService, MemoryAccountStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::from_env()?;
//!     let store = Arc::new(MemoryAccountStore::new());
//!     let notifier = Arc::new(EmailService::new(EmailConfig::from_env()?)?);
//!
//!     let auth = AuthService::new(store, notifier, config);
//!
//!     auth.register("Alice Smith", "alice@example.com", "SecurePass123!")
//!         .await?;
//!     // ... the user receives an OTP code by email
//!     let profile = auth.verify_otp("alice@example.com", "123456").await?;
//!     println!("verified: {}", profile.verified);
//!
//!     let login = auth.login("alice@example.com", "SecurePass123!").await?;
//!     let rotated = auth.refresh(&login.tokens.refresh_token).await?;
//!     println!("access token: {}", rotated.access_token);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod models;
pub mod service;
pub mod store;
pub mod utils;

// Re-export the public surface
pub use config::AuthConfig;
pub use models::{
    account::{Account, AccountPage, AccountProfile, OtpChallenge, ResetChallenge, Role, VerificationState},
    auth::{LoginResponse, RegistrationResponse, TokenPair},
};
pub use service::{
    AuthService, DeliveryError, EmailConfig, EmailService, Notifier, TokenError, TokenService,
};
pub use store::{AccountStore, DynAccountStore, MemoryAccountStore, StoreError};
pub use utils::{
    clock::{Clock, SystemClock},
    error::{AuthError, AuthResult, ErrorKind},
};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
