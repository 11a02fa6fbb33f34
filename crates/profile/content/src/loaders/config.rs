//! Engine configuration loader.

use std::path::Path;

use profile_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine tunables from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse TOML; keys that are absent keep their [`EngineConfig::default`] value.
    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse engine config TOML: {}", e))?;

        if config.max_level < 1 {
            anyhow::bail!("max_level must be at least 1, got {}", config.max_level);
        }
        if config.gift_wraps.is_empty() {
            tracing::warn!("engine config allows no gift wraps; every gift will be rejected");
        }
        Ok(config)
    }
}
