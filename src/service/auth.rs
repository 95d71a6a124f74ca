//! Credential Lifecycle Service
//!
//! The orchestrator for the account lifecycle:
//! registration → OTP verification → login → refresh → logout, with the
//! password-reset flow overlaid on verified accounts. Coordinates the
//! secret generators, the OTP codec, the token service, and the injected
//! store/notifier/clock collaborators, and enforces the lifecycle
//! invariants across them.
//!
//! Every operation is a single logical transaction against one account
//! document. Read-modify-write paths go through a bounded retry on store
//! version conflicts, so concurrent refresh/logout calls on the same
//! account cannot corrupt the token list. Notifications are sent only
//! after account state has been persisted.

use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::account::{Account, AccountPage, AccountProfile, OtpChallenge, ResetChallenge};
use crate::models::auth::{LoginResponse, RegistrationResponse, TokenPair};
use crate::service::notifier::Notifier;
use crate::service::token::TokenService;
use crate::store::{DynAccountStore, StoreError};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::error::{AuthError, AuthResult};
use crate::utils::security::{
    constant_time_compare, generate_otp_code, generate_reset_token, hash_otp,
    hash_password_with_cost, verify_otp_digest, verify_password,
};
use crate::utils::validation::normalize_email;

/// Attempts at a conditional save before giving up on a contended account
const MAX_SAVE_ATTEMPTS: usize = 3;

/// Credential and session lifecycle orchestrator.
pub struct AuthService {
    /// Account persistence collaborator
    store: DynAccountStore,

    /// Outbound notification collaborator
    notifier: Arc<dyn Notifier>,

    /// Time source for all expiry checks
    clock: Arc<dyn Clock>,

    /// Token issuer/verifier
    tokens: TokenService,

    /// Secrets and lifetimes
    config: AuthConfig,
}

impl AuthService {
    /// Create a lifecycle service using the system clock.
    pub fn new(store: DynAccountStore, notifier: Arc<dyn Notifier>, config: AuthConfig) -> Self {
        Self::with_clock(store, notifier, Arc::new(SystemClock), config)
    }

    /// Create a lifecycle service with an explicit clock.
    pub fn with_clock(
        store: DynAccountStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        let tokens = TokenService::new(&config);
        Self {
            store,
            notifier,
            clock,
            tokens,
            config,
        }
    }

    /// The token issuer, for callers that verify access tokens directly
    /// (e.g. request middleware).
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new account, pending email verification.
    ///
    /// The account is persisted before the OTP email is sent: a delivery
    /// failure surfaces as an error, but the account remains and
    /// [`resend_otp`](Self::resend_otp) is the recovery path.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<RegistrationResponse> {
        let email = normalize_email(email);

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = hash_password_with_cost(password, self.config.bcrypt_cost)?;
        let code = generate_otp_code();
        let now = self.clock.now();
        let challenge = OtpChallenge {
            otp_hash: hash_otp(&code, &self.config.otp_secret),
            expires_at: now + self.config.otp_expires_in,
        };

        let account = Account::new(name.to_string(), email.clone(), password_hash, challenge, now);
        let profile = AccountProfile::from(&account);

        match self.store.save(&account).await {
            Ok(_) => {}
            Err(StoreError::DuplicateEmail) => return Err(AuthError::AlreadyExists),
            Err(e) => return Err(e.into()),
        }
        info!("Account registered; account_id={}", account.id);

        if let Err(e) = self
            .notifier
            .send_otp(&email, name, &code, self.config.otp_expire_minutes())
            .await
        {
            warn!("OTP delivery failed; account_id={}: {}", account.id, e);
            return Err(e.into());
        }

        Ok(RegistrationResponse { account: profile })
    }

    /// Verify an email with an OTP code, transitioning the account to
    /// verified.
    ///
    /// Fails with the same error whether the account is unknown, the
    /// challenge has expired, or the code is wrong.
    pub async fn verify_otp(&self, email: &str, code: &str) -> AuthResult<AccountProfile> {
        let email = normalize_email(email);
        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidOrExpired)?;
        let now = self.clock.now();

        let profile = self
            .update_account(account.id, |account| {
                let challenge = account.otp_challenge().ok_or(AuthError::InvalidOrExpired)?;
                if challenge.is_expired(now) {
                    return Err(AuthError::InvalidOrExpired);
                }
                if !verify_otp_digest(code, &challenge.otp_hash, &self.config.otp_secret) {
                    return Err(AuthError::InvalidOrExpired);
                }
                account.mark_verified();
                Ok(AccountProfile::from(&*account))
            })
            .await
            .map_err(|e| match e {
                AuthError::NotFound => AuthError::InvalidOrExpired,
                e => e,
            })?;

        info!("Email verified; account_id={}", account.id);
        Ok(profile)
    }

    /// Re-issue the OTP challenge for a pending account.
    ///
    /// Overwrites the previous challenge: the old code is dead even if it
    /// had not expired. Fails for unknown or already verified accounts.
    pub async fn resend_otp(&self, email: &str) -> AuthResult<()> {
        let email = normalize_email(email);
        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound)?;
        if account.is_verified() {
            return Err(AuthError::NotFound);
        }

        let code = generate_otp_code();
        let now = self.clock.now();
        let challenge = OtpChallenge {
            otp_hash: hash_otp(&code, &self.config.otp_secret),
            expires_at: now + self.config.otp_expires_in,
        };

        self.update_account(account.id, |account| {
            if !account.replace_otp(challenge.clone()) {
                return Err(AuthError::NotFound);
            }
            Ok(())
        })
        .await?;
        info!("OTP re-issued; account_id={}", account.id);

        self.notifier
            .send_otp(&email, &account.name, &code, self.config.otp_expire_minutes())
            .await?;
        Ok(())
    }

    /// Authenticate with email and password, issuing a token pair.
    ///
    /// Unknown email and wrong password are indistinguishable; an
    /// unverified account is refused outright.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResponse> {
        let email = normalize_email(email);
        let Some(account) = self.store.find_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !account.is_verified() {
            return Err(AuthError::NotVerified);
        }
        if !verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let pair = self
            .tokens
            .issue_pair(account.id, now)
            .map_err(AuthError::from)?;

        let profile = self
            .update_account(account.id, |account| {
                account.push_refresh_token(pair.refresh_token.clone(), now);
                Ok(AccountProfile::from(&*account))
            })
            .await?;

        info!("Login successful; account_id={}", account.id);
        Ok(LoginResponse {
            account: profile,
            tokens: pair,
        })
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Refresh tokens are single-use: the presented token is removed and
    /// the replacement appended in the same save. A token with a valid
    /// signature that is no longer in the account's list has been revoked
    /// or already rotated and is refused.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let account_id = self.tokens.verify_refresh(refresh_token)?;
        let now = self.clock.now();

        let pair = self
            .update_account(account_id, |account| {
                if !account.remove_refresh_token(refresh_token) {
                    return Err(AuthError::InvalidRefreshToken);
                }
                let pair = self
                    .tokens
                    .issue_pair(account.id, now)
                    .map_err(AuthError::from)?;
                account.push_refresh_token(pair.refresh_token.clone(), now);
                Ok(pair)
            })
            .await
            .map_err(|e| match e {
                AuthError::NotFound => AuthError::InvalidRefreshToken,
                e => e,
            })?;

        info!("Token refreshed; account_id={}", account_id);
        Ok(pair)
    }

    /// Revoke one refresh token, or every token when none is given
    /// (all-devices logout).
    pub async fn logout(&self, account_id: Uuid, refresh_token: Option<&str>) -> AuthResult<()> {
        self.update_account(account_id, |account| {
            match refresh_token {
                Some(token) => {
                    account.remove_refresh_token(token);
                }
                None => account.clear_refresh_tokens(),
            }
            Ok(())
        })
        .await?;

        info!("Logout; account_id={}", account_id);
        Ok(())
    }

    /// Begin the password-reset flow.
    ///
    /// Returns success whether or not the email is known, so callers
    /// cannot enumerate accounts. For known accounts a fresh opaque token
    /// replaces any outstanding one and a reset link is sent.
    pub async fn request_password_reset(&self, email: &str) -> AuthResult<()> {
        let email = normalize_email(email);
        let Some(account) = self.store.find_by_email(&email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_reset_token();
        let now = self.clock.now();
        let challenge = ResetChallenge {
            token: token.clone(),
            expires_at: now + self.config.reset_token_expires_in,
        };

        self.update_account(account.id, |account| {
            account.set_reset_challenge(challenge.clone());
            Ok(())
        })
        .await?;
        info!("Password reset requested; account_id={}", account.id);

        let reset_url = format!(
            "{}/auth/reset-password?token={}",
            self.config.app_base_url, token
        );
        self.notifier
            .send_password_reset(&email, &account.name, &reset_url)
            .await?;
        Ok(())
    }

    /// Complete the password-reset flow with a token from the reset link.
    ///
    /// The token is single-use; success replaces the password, clears the
    /// challenge, and revokes every active refresh token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AuthResult<()> {
        let account = self
            .store
            .find_by_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidOrExpired)?;
        let now = self.clock.now();
        let password_hash = hash_password_with_cost(new_password, self.config.bcrypt_cost)?;

        self.update_account(account.id, |account| {
            let challenge = account.reset.as_ref().ok_or(AuthError::InvalidOrExpired)?;
            if !constant_time_compare(&challenge.token, token) || challenge.is_expired(now) {
                return Err(AuthError::InvalidOrExpired);
            }
            account.password_hash = password_hash.clone();
            account.clear_reset_challenge();
            // Global session invalidation
            account.clear_refresh_tokens();
            Ok(())
        })
        .await
        .map_err(|e| match e {
            AuthError::NotFound => AuthError::InvalidOrExpired,
            e => e,
        })?;

        info!("Password reset completed; account_id={}", account.id);
        Ok(())
    }

    /// Change the password of an authenticated account.
    ///
    /// Unlike [`reset_password`](Self::reset_password), existing sessions
    /// stay valid: the account holder proved the current password.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        self.update_account(account_id, |account| {
            if !verify_password(current_password, &account.password_hash)? {
                return Err(AuthError::IncorrectCurrentPassword);
            }
            account.password_hash = hash_password_with_cost(new_password, self.config.bcrypt_cost)?;
            Ok(())
        })
        .await?;

        info!("Password changed; account_id={}", account_id);
        Ok(())
    }

    /// Fetch the projection of an account.
    pub async fn profile(&self, account_id: Uuid) -> AuthResult<AccountProfile> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(AccountProfile::from(&account))
    }

    /// Update name and/or email of an account.
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> AuthResult<AccountProfile> {
        let new_email = email.map(normalize_email);
        if let Some(ref candidate) = new_email {
            if let Some(existing) = self.store.find_by_email(candidate).await? {
                if existing.id != account_id {
                    return Err(AuthError::AlreadyExists);
                }
            }
        }

        let profile = self
            .update_account(account_id, |account| {
                if let Some(name) = name {
                    account.name = name.to_string();
                }
                if let Some(ref candidate) = new_email {
                    account.email = candidate.clone();
                }
                Ok(AccountProfile::from(&*account))
            })
            .await?;

        info!("Profile updated; account_id={}", account_id);
        Ok(profile)
    }

    /// List account projections, newest first, for admin views.
    ///
    /// `page` is 1-based; zero values are clamped to 1.
    pub async fn list_accounts(&self, page: usize, limit: usize) -> AuthResult<AccountPage> {
        let page = page.max(1);
        let limit = limit.max(1);
        let offset = (page - 1) * limit;

        let (accounts, total) = self.store.list(offset, limit).await?;
        Ok(AccountPage {
            accounts: accounts.iter().map(AccountProfile::from).collect(),
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        })
    }

    /// Delete an account.
    pub async fn delete_account(&self, account_id: Uuid) -> AuthResult<()> {
        if !self.store.delete_by_id(account_id).await? {
            return Err(AuthError::NotFound);
        }
        info!("Account deleted; account_id={}", account_id);
        Ok(())
    }

    /// Run a read-modify-write against one account, retrying on store
    /// version conflicts.
    async fn update_account<T>(
        &self,
        account_id: Uuid,
        mut apply: impl FnMut(&mut Account) -> AuthResult<T>,
    ) -> AuthResult<T> {
        for _ in 0..MAX_SAVE_ATTEMPTS {
            let mut account = self
                .store
                .find_by_id(account_id)
                .await?
                .ok_or(AuthError::NotFound)?;

            let outcome = apply(&mut account)?;
            account.touch(self.clock.now());

            match self.store.save(&account).await {
                Ok(_) => return Ok(outcome),
                Err(StoreError::VersionConflict) => continue,
                Err(StoreError::DuplicateEmail) => return Err(AuthError::AlreadyExists),
                Err(e) => return Err(e.into()),
            }
        }
        Err(AuthError::Store(StoreError::VersionConflict))
    }
}
