//! Content factory for building the engine's static inputs from data files.

use std::path::{Path, PathBuf};

use profile_core::{Catalog, CatalogConfig, EngineConfig, Progression, SeasonRewards, StaticCatalog, XpTable};

use crate::bundle::ContentBundle;
use crate::loaders::{
    CatalogConfigLoader, CatalogLoader, ConfigLoader, LoadResult, SeasonLoader, TemplateLoader, XpTableLoader,
};
use crate::templates::ProfileTemplates;

/// Content factory that loads all profile content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── engine.toml
/// ├── catalog.json
/// ├── catalog_config.json
/// ├── xp.json
/// ├── season8.json
/// └── profiles/
///     ├── athena.json
///     ├── common_core.json
///     └── ...
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine tunables from `engine.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        ConfigLoader::load(&self.data_dir.join("engine.toml"))
    }

    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        CatalogLoader::load(&self.data_dir.join("catalog.json"))
    }

    pub fn load_catalog_config(&self) -> LoadResult<CatalogConfig> {
        CatalogConfigLoader::load(&self.data_dir.join("catalog_config.json"))
    }

    pub fn load_xp_table(&self) -> LoadResult<XpTable> {
        XpTableLoader::load(&self.data_dir.join("xp.json"))
    }

    /// Load battle-pass rewards from `season{season}.json`.
    pub fn load_season(&self, season: u32) -> LoadResult<SeasonRewards> {
        SeasonLoader::load(&self.data_dir.join(format!("season{season}.json")))
    }

    /// Load profile templates from `profiles/`.
    pub fn load_templates(&self) -> LoadResult<ProfileTemplates> {
        TemplateLoader::load_dir(&self.data_dir.join("profiles"))
    }

    /// Load everything, using `config` when given instead of `engine.toml`.
    ///
    /// The season tables follow the configured season.
    pub fn load_bundle(&self, config: Option<EngineConfig>) -> LoadResult<ContentBundle> {
        let config = match config {
            Some(config) => config,
            None => self.load_config()?,
        };
        let catalog = StaticCatalog::new(self.load_catalog()?, self.load_catalog_config()?);
        let progression = Progression::new(self.load_xp_table()?, self.load_season(config.season)?);
        let templates = self.load_templates()?;

        tracing::info!(
            data_dir = %self.data_dir.display(),
            season = config.season,
            tiers = progression.tier_count(),
            templates = templates.len(),
            "content loaded"
        );
        Ok(ContentBundle {
            templates,
            catalog,
            progression,
            config,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_directory_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_config().unwrap_err();
        assert!(err.to_string().contains("engine.toml"));
    }

    #[test]
    fn load_bundle_from_written_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("engine.toml"), "season = 3\n").unwrap();
        std::fs::write(root.join("catalog.json"), crate::embedded::CATALOG).unwrap();
        std::fs::write(root.join("catalog_config.json"), "{}").unwrap();
        std::fs::write(root.join("xp.json"), r#"[{ "level": 1, "xpRequired": 10 }]"#).unwrap();
        std::fs::write(root.join("season3.json"), r#"{ "freeRewards": [{}, {}] }"#).unwrap();
        std::fs::create_dir(root.join("profiles")).unwrap();
        for (profile_id, content) in crate::embedded::TEMPLATES {
            std::fs::write(root.join("profiles").join(format!("{profile_id}.json")), content).unwrap();
        }

        let bundle = ContentFactory::new(root).load_bundle(None).unwrap();
        assert_eq!(bundle.config.season, 3);
        assert_eq!(bundle.progression.tier_count(), 2);
        assert_eq!(bundle.templates.len(), 6);
    }
}
