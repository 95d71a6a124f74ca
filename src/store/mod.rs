//! Storage Abstraction
//!
//! The contract every account store must implement. The core never talks
//! to a concrete database; persistence is an external collaborator behind
//! [`AccountStore`]. A reference in-memory adapter lives in
//! [`memory::MemoryAccountStore`].
//!
//! `save` is a conditional upsert: inserts require `version == 0` and a
//! unique email; updates require the stored version to match the
//! document's version and bump it. This gives each lifecycle operation an
//! atomic read-modify-write per account even on backends without document
//! locks.

pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::account::Account;

/// Errors surfaced by a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The email uniqueness constraint was violated on insert
    #[error("Email already exists")]
    DuplicateEmail,

    /// Conditional save lost a concurrent write (stale document version)
    #[error("Document version conflict")]
    VersionConflict,

    /// Backend unavailable or otherwise failing
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for account documents.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by normalized email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Look up an account by identifier
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// Look up the account holding an outstanding reset token
    async fn find_by_reset_token(&self, token: &str) -> StoreResult<Option<Account>>;

    /// List accounts newest first, returning one page and the total
    /// account count.
    async fn list(&self, offset: usize, limit: usize) -> StoreResult<(Vec<Account>, usize)>;

    /// Conditionally insert or update an account, returning the new
    /// document version.
    async fn save(&self, account: &Account) -> StoreResult<u64>;

    /// Delete an account; returns whether it existed
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}

/// Type alias for a shareable store instance.
pub type DynAccountStore = Arc<dyn AccountStore>;

pub use memory::MemoryAccountStore;
