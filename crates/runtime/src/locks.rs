//! Per-account mutual exclusion for the load → mutate → persist cycle.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::api::{Result, RuntimeError};

/// Async lock per account id.
///
/// Multi-account operations take every lock they need up front, in sorted
/// order, so two gifts between the same accounts cannot deadlock.
#[derive(Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held account locks; released on drop.
pub struct AccountGuard {
    accounts: Vec<String>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl AccountGuard {
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until every listed account is free, then holds them all.
    pub async fn acquire<I, S>(&self, accounts: I) -> Result<AccountGuard>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let accounts: BTreeSet<String> = accounts.into_iter().map(|id| id.as_ref().to_owned()).collect();
        let handles = {
            let mut locks = self.locks.lock().map_err(|_| RuntimeError::LockPoisoned)?;
            // entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            accounts
                .iter()
                .map(|id| Arc::clone(locks.entry(id.clone()).or_default()))
                .collect::<Vec<_>>()
        };

        let mut guards = Vec::with_capacity(handles.len());
        for handle in handles {
            guards.push(handle.lock_owned().await);
        }
        Ok(AccountGuard {
            accounts: accounts.into_iter().collect(),
            _guards: guards,
        })
    }

    /// Number of accounts with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn second_acquire_waits_for_release() {
        let locks = Arc::new(AccountLocks::new());
        let guard = locks.acquire(["b", "a", "b"]).await.unwrap();
        assert_eq!(guard.accounts(), ["a", "b"]);

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(["a"]).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = AccountLocks::new();
        drop(locks.acquire(["a", "b"]).await.unwrap());
        let _held = locks.acquire(["c"]).await.unwrap();
        assert_eq!(locks.tracked(), 1);
    }
}
