//! Builds the content bundle, profile store and runtime used by front-ends.
use std::sync::Arc;

use anyhow::{Result, bail};
use profile_content::{ConfigLoader, ContentBundle, ContentFactory};
use runtime::{FileProfileStore, InMemoryFriends, InMemoryProfileStore, ProfileStore, Runtime};

use crate::config::{ServiceConfig, StoreKind};
use crate::dirs;

/// Builder that assembles content, store and runtime for the service.
pub struct ServiceBuilder {
    config: ServiceConfig,
    content: Option<ContentBundle>,
    friends: Arc<InMemoryFriends>,
}

impl ServiceBuilder {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            content: None,
            friends: Arc::new(InMemoryFriends::new()),
        }
    }

    /// Use already-loaded content instead of reading it from the configuration.
    pub fn content(mut self, content: ContentBundle) -> Self {
        self.content = Some(content);
        self
    }

    /// Share a friend graph the caller keeps editing.
    pub fn friends(mut self, friends: Arc<InMemoryFriends>) -> Self {
        self.friends = friends;
        self
    }

    pub fn build(self) -> Result<ServiceSetup> {
        let content = match self.content {
            Some(content) => content,
            None => load_content(&self.config)?,
        };
        let store = open_store(&self.config)?;

        let runtime = Runtime::builder()
            .config(self.config.runtime.clone())
            .content(content)
            .store(store)
            .friends(self.friends.clone())
            .build()?;

        Ok(ServiceSetup {
            config: self.config,
            friends: self.friends,
            runtime,
        })
    }
}

pub struct ServiceSetup {
    pub config: ServiceConfig,
    pub friends: Arc<InMemoryFriends>,
    pub runtime: Runtime,
}

/// Reads content from `CONTENT_DIR`, or falls back to the embedded defaults.
pub fn load_content(config: &ServiceConfig) -> Result<ContentBundle> {
    let Some(dir) = &config.content_dir else {
        let mut engine = ContentBundle::embedded()?.config;
        if let Some(path) = &config.engine_config {
            engine = ConfigLoader::load(path)?;
        }
        if let Some(season) = config.season {
            engine.season = season;
        }
        return ContentBundle::embedded_with(engine);
    };

    let factory = ContentFactory::new(dir);
    let mut engine = match &config.engine_config {
        Some(path) => ConfigLoader::load(path)?,
        None => factory.load_config()?,
    };
    if let Some(season) = config.season {
        engine.season = season;
    }
    factory.load_bundle(Some(engine))
}

fn open_store(config: &ServiceConfig) -> Result<Arc<dyn ProfileStore>> {
    match config.store {
        StoreKind::Memory => Ok(Arc::new(InMemoryProfileStore::new())),
        StoreKind::File => {
            let dir = config
                .profile_data_dir
                .clone()
                .unwrap_or_else(dirs::profile_data_dir);
            if dir.is_file() {
                bail!("Profile data dir {} is a file", dir.display());
            }
            let store = FileProfileStore::new(&dir)?;
            tracing::info!(path = %dir.display(), "using file profile store");
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_with_embedded_content() {
        let setup = ServiceBuilder::new(ServiceConfig::default()).build().unwrap();
        let service = setup.runtime.handle();

        service.register_account("alice").await.unwrap();
        assert_eq!(service.oracles().config().season, 8);
    }

    #[tokio::test]
    async fn file_store_persists_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            store: StoreKind::File,
            profile_data_dir: Some(dir.path().to_path_buf()),
            ..ServiceConfig::default()
        };
        let setup = ServiceBuilder::new(config).build().unwrap();
        setup.runtime.handle().register_account("alice").await.unwrap();

        assert!(dir.path().join("alice.json").exists());
    }

    #[test]
    fn unknown_embedded_season_fails() {
        let config = ServiceConfig {
            season: Some(42),
            ..ServiceConfig::default()
        };
        assert!(load_content(&config).is_err());
    }
}
