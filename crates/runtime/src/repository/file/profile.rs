//! File-based ProfileStore implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use profile_core::{ProfileSet, ProfileWrite};
use tokio::fs;
use tokio::sync::Mutex;

use crate::repository::{ProfileStore, RepositoryError, Result, apply_writes};

/// File-based implementation of ProfileStore.
///
/// # File Format
///
/// Each account is stored as `{account_id}.json`, holding the whole profile
/// set as pretty-printed JSON so documents stay inspectable by hand. Writes
/// go to a temporary file first and are moved into place with a rename.
pub struct FileProfileStore {
    base_dir: PathBuf,
    // serialises read-modify-write cycles across accounts
    write_lock: Mutex<()>,
}

impl FileProfileStore {
    /// Create a new file-based store rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to an account file.
    fn account_path(&self, account_id: &str) -> Result<PathBuf> {
        let valid = !account_id.is_empty()
            && account_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RepositoryError::InvalidAccountId(account_id.to_owned()));
        }
        Ok(self.base_dir.join(format!("{account_id}.json")))
    }

    async fn read(&self, path: &Path) -> Result<Option<ProfileSet>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::Io(e)),
        };
        let set = serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::CorruptedData(format!("{}: {e}", path.display())))?;
        Ok(Some(set))
    }

    async fn write(&self, path: &Path, set: &ProfileSet) -> Result<()> {
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(set).map_err(|e| RepositoryError::Json(e.to_string()))?;

        fs::write(&temp_path, bytes).await.map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, path).await.map_err(RepositoryError::Io)?;

        tracing::debug!(account_id = %set.account_id, path = %path.display(), "profiles saved");
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn fetch(&self, account_id: &str) -> Result<Option<ProfileSet>> {
        let path = self.account_path(account_id)?;
        self.read(&path).await
    }

    async fn insert(&self, set: &ProfileSet) -> Result<()> {
        let path = self.account_path(&set.account_id)?;
        let _guard = self.write_lock.lock().await;
        if fs::try_exists(&path).await.map_err(RepositoryError::Io)? {
            return Err(RepositoryError::AlreadyExists(set.account_id.clone()));
        }
        self.write(&path, set).await
    }

    async fn replace_profiles(&self, account_id: &str, writes: &[ProfileWrite]) -> Result<()> {
        let path = self.account_path(account_id)?;
        let _guard = self.write_lock.lock().await;
        let mut set = self
            .read(&path)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(account_id.to_owned()))?;
        apply_writes(&mut set, writes)?;
        self.write(&path, &set).await
    }

    async fn delete(&self, account_id: &str) -> Result<bool> {
        let path = self.account_path(account_id)?;
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(account_id, "profiles deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }

    async fn list_accounts(&self) -> Result<Vec<String>> {
        let mut accounts = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir).await.map_err(RepositoryError::Io)?;

        while let Some(entry) = entries.next_entry().await.map_err(RepositoryError::Io)? {
            let path = entry.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(account_id) = filename.strip_suffix(".json")
            {
                accounts.push(account_id.to_owned());
            }
        }

        accounts.sort_unstable();
        Ok(accounts)
    }
}
