//! In-Memory Account Store
//!
//! Reference implementation of [`AccountStore`] backed by a
//! `tokio::sync::RwLock`. Suitable for tests and single-process
//! deployments; production backends implement the same trait over a real
//! document store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::account::Account;
use crate::store::{AccountStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    // Unique-email index: email -> account id
    by_email: HashMap<String, Uuid>,
}

/// In-memory account store with version-checked saves.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Inner>,
}

impl MemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// Whether the store holds no accounts
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|account| {
                account
                    .reset
                    .as_ref()
                    .is_some_and(|challenge| challenge.token == token)
            })
            .cloned())
    }

    async fn list(&self, offset: usize, limit: usize) -> StoreResult<(Vec<Account>, usize)> {
        let inner = self.inner.read().await;
        let total = inner.accounts.len();

        let mut accounts: Vec<Account> = inner.accounts.values().cloned().collect();
        // Newest first, id as tie-break for a stable order
        accounts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let page = accounts
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        Ok((page, total))
    }

    async fn save(&self, account: &Account) -> StoreResult<u64> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        // Email uniqueness across all accounts
        if let Some(&existing_id) = inner.by_email.get(&account.email) {
            if existing_id != account.id {
                return Err(StoreError::DuplicateEmail);
            }
        }

        match inner.accounts.get(&account.id) {
            Some(stored) => {
                if stored.version != account.version {
                    return Err(StoreError::VersionConflict);
                }

                let previous_email = stored.email.clone();
                let mut updated = account.clone();
                updated.version += 1;
                let new_version = updated.version;

                if previous_email != updated.email {
                    inner.by_email.remove(&previous_email);
                    inner.by_email.insert(updated.email.clone(), updated.id);
                }
                inner.accounts.insert(updated.id, updated);
                Ok(new_version)
            }
            None => {
                // Fresh documents must carry version 0
                if account.version != 0 {
                    return Err(StoreError::VersionConflict);
                }

                let mut created = account.clone();
                created.version = 1;
                inner.by_email.insert(created.email.clone(), created.id);
                inner.accounts.insert(created.id, created);
                Ok(1)
            }
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        match inner.accounts.remove(&id) {
            Some(account) => {
                inner.by_email.remove(&account.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::OtpChallenge;
    use chrono::{Duration, Utc};

    fn test_account(email: &str) -> Account {
        let now = Utc::now();
        Account::new(
            "Test User".to_string(),
            email.to_string(),
            "hashed_password".to_string(),
            OtpChallenge {
                otp_hash: "digest".to_string(),
                expires_at: now + Duration::minutes(10),
            },
            now,
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryAccountStore::new();
        let account = test_account("alice@example.com");

        let version = store.save(&account).await.unwrap();
        assert_eq!(version, 1);

        let by_email = store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, account.id);
        assert_eq!(by_email.version, 1);

        let by_id = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");

        assert!(store
            .find_by_email("bob@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryAccountStore::new();
        store.save(&test_account("alice@example.com")).await.unwrap();

        let duplicate = test_account("alice@example.com");
        assert!(matches!(
            store.save(&duplicate).await,
            Err(StoreError::DuplicateEmail)
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_version_conflict_on_stale_save() {
        let store = MemoryAccountStore::new();
        let mut account = test_account("alice@example.com");
        account.version = store.save(&account).await.unwrap();

        // A concurrent writer bumps the stored version
        let mut fresh = store.find_by_id(account.id).await.unwrap().unwrap();
        fresh.name = "Renamed".to_string();
        store.save(&fresh).await.unwrap();

        // The stale copy now loses
        account.name = "Stale".to_string();
        assert!(matches!(
            store.save(&account).await,
            Err(StoreError::VersionConflict)
        ));
    }

    #[tokio::test]
    async fn test_find_by_reset_token() {
        let store = MemoryAccountStore::new();
        let mut account = test_account("alice@example.com");
        account.set_reset_challenge(crate::models::account::ResetChallenge {
            token: "reset_token_abc".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        });
        store.save(&account).await.unwrap();

        let found = store
            .find_by_reset_token("reset_token_abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, account.id);

        assert!(store
            .find_by_reset_token("unknown_token")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let store = MemoryAccountStore::new();
        let mut account = test_account("alice@example.com");
        account.version = store.save(&account).await.unwrap();

        assert!(store.delete_by_id(account.id).await.unwrap());
        assert!(!store.delete_by_id(account.id).await.unwrap());
        assert!(store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let store = MemoryAccountStore::new();
        let base = Utc::now();
        for i in 0..3 {
            let mut account = test_account(&format!("user{}@example.com", i));
            account.created_at = base + Duration::minutes(i);
            store.save(&account).await.unwrap();
        }

        let (first_page, total) = store.list(0, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].email, "user2@example.com");
        assert_eq!(first_page[1].email, "user1@example.com");

        let (second_page, total) = store.list(2, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].email, "user0@example.com");

        let (past_end, _) = store.list(10, 2).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_email_index_follows_update() {
        let store = MemoryAccountStore::new();
        let mut account = test_account("alice@example.com");
        account.version = store.save(&account).await.unwrap();

        account.email = "alice.new@example.com".to_string();
        store.save(&account).await.unwrap();

        assert!(store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_email("alice.new@example.com")
            .await
            .unwrap()
            .is_some());
    }
}
