//! Store contract for per-account profile documents.

use async_trait::async_trait;
use profile_core::{ProfileSet, ProfileWrite};

use crate::repository::{RepositoryError, Result};

/// Document store holding one [`ProfileSet`] per account.
///
/// Writes are whole sub-profile replacements guarded by the `rvn` each
/// profile had when it was read; a write whose guard no longer matches
/// fails with [`RepositoryError::Conflict`] and changes nothing.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch every profile of an account, `None` if the account has none.
    async fn fetch(&self, account_id: &str) -> Result<Option<ProfileSet>>;

    /// Store the profiles of a new account.
    async fn insert(&self, set: &ProfileSet) -> Result<()>;

    /// Replace several sub-profiles of one account in a single step.
    ///
    /// Either every write lands or none does.
    async fn replace_profiles(&self, account_id: &str, writes: &[ProfileWrite]) -> Result<()>;

    /// Delete an account's profiles. Returns whether anything was stored.
    async fn delete(&self, account_id: &str) -> Result<bool>;

    /// List the accounts with stored profiles, sorted.
    async fn list_accounts(&self) -> Result<Vec<String>>;

    async fn exists(&self, account_id: &str) -> Result<bool> {
        Ok(self.fetch(account_id).await?.is_some())
    }
}

/// Checks every guard, then applies every write.
pub(crate) fn apply_writes(set: &mut ProfileSet, writes: &[ProfileWrite]) -> Result<()> {
    for write in writes {
        let profile_id = &write.profile.profile_id;
        let found = set.profiles.get(profile_id).map(|profile| profile.rvn);
        if found != Some(write.expected_rvn) {
            return Err(RepositoryError::Conflict {
                account_id: set.account_id.clone(),
                profile_id: profile_id.clone(),
                expected: write.expected_rvn,
                found: found.unwrap_or(-1),
            });
        }
    }
    for write in writes {
        set.insert(write.profile.clone());
    }
    Ok(())
}
