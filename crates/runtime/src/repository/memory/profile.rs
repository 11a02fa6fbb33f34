//! In-memory ProfileStore implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use profile_core::{ProfileSet, ProfileWrite};

use crate::repository::{ProfileStore, RepositoryError, Result, apply_writes};

/// In-memory implementation of ProfileStore.
///
/// Profile sets are kept per account id and cloned on every read.
pub struct InMemoryProfileStore {
    accounts: RwLock<HashMap<String, ProfileSet>>,
}

impl InMemoryProfileStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with the given accounts.
    pub fn with_accounts(sets: impl IntoIterator<Item = ProfileSet>) -> Self {
        let accounts = sets
            .into_iter()
            .map(|set| (set.account_id.clone(), set))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch(&self, account_id: &str) -> Result<Option<ProfileSet>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(accounts.get(account_id).cloned())
    }

    async fn insert(&self, set: &ProfileSet) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if accounts.contains_key(&set.account_id) {
            return Err(RepositoryError::AlreadyExists(set.account_id.clone()));
        }
        accounts.insert(set.account_id.clone(), set.clone());
        Ok(())
    }

    async fn replace_profiles(&self, account_id: &str, writes: &[ProfileWrite]) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let set = accounts
            .get_mut(account_id)
            .ok_or_else(|| RepositoryError::NotFound(account_id.to_owned()))?;
        apply_writes(set, writes)
    }

    async fn delete(&self, account_id: &str) -> Result<bool> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(accounts.remove(account_id).is_some())
    }

    async fn list_accounts(&self) -> Result<Vec<String>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<String> = accounts.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
