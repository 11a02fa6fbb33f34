//! Default content compiled into the binary.
use profile_core::{EngineConfig, Progression, StaticCatalog};

use crate::bundle::ContentBundle;
use crate::loaders::{
    CatalogConfigLoader, CatalogLoader, ConfigLoader, LoadResult, SeasonLoader, TemplateLoader, XpTableLoader,
};
use crate::templates::ProfileTemplates;

pub const ENGINE_CONFIG: &str = include_str!("../data/engine.toml");
pub const CATALOG: &str = include_str!("../data/catalog.json");
pub const CATALOG_CONFIG: &str = include_str!("../data/catalog_config.json");
pub const XP_TABLE: &str = include_str!("../data/xp.json");
/// Season tables shipped with the binary, keyed by season number.
pub const SEASONS: [(u32, &str); 1] = [(8, include_str!("../data/season8.json"))];

pub const TEMPLATES: [(&str, &str); 6] = [
    ("athena", include_str!("../data/profiles/athena.json")),
    ("common_core", include_str!("../data/profiles/common_core.json")),
    ("profile0", include_str!("../data/profiles/profile0.json")),
    ("common_public", include_str!("../data/profiles/common_public.json")),
    ("creative", include_str!("../data/profiles/creative.json")),
    ("collections", include_str!("../data/profiles/collections.json")),
];

pub fn templates() -> LoadResult<ProfileTemplates> {
    let templates = TEMPLATES
        .iter()
        .map(|(_, content)| TemplateLoader::parse(content))
        .collect::<LoadResult<Vec<_>>>()?;
    Ok(ProfileTemplates::new(templates))
}

impl ContentBundle {
    /// The embedded defaults.
    pub fn embedded() -> LoadResult<Self> {
        Self::embedded_with(ConfigLoader::parse(ENGINE_CONFIG)?)
    }

    /// Embedded content under another engine configuration. Fails when no
    /// season table is embedded for `config.season`.
    pub fn embedded_with(config: EngineConfig) -> LoadResult<Self> {
        let season = SEASONS
            .iter()
            .find(|(number, _)| *number == config.season)
            .map(|(_, content)| *content)
            .ok_or_else(|| anyhow::anyhow!("No embedded rewards for season {}", config.season))?;

        let catalog = StaticCatalog::new(
            CatalogLoader::parse(CATALOG)?,
            CatalogConfigLoader::parse(CATALOG_CONFIG)?,
        );
        let progression = Progression::new(XpTableLoader::parse(XP_TABLE)?, SeasonLoader::parse(season)?);
        Ok(Self {
            templates: templates()?,
            catalog,
            progression,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use profile_core::env::CatalogOracle;
    use profile_core::ids;

    use super::*;
    use crate::templates::PROFILE_IDS;

    #[test]
    fn embedded_bundle_is_consistent() {
        let bundle = ContentBundle::embedded().unwrap();
        assert_eq!(bundle.config.season, 8);
        assert_eq!(bundle.progression.xp.len(), 100);
        assert_eq!(bundle.progression.tier_count(), 100);
        let profile_ids: Vec<&str> = bundle.templates.profile_ids().collect();
        let mut expected = PROFILE_IDS.to_vec();
        expected.sort_unstable();
        assert_eq!(profile_ids, expected);
    }

    #[test]
    fn embedded_rejects_seasons_without_tables() {
        let config = EngineConfig {
            season: 3,
            ..EngineConfig::default()
        };
        let err = ContentBundle::embedded_with(config).unwrap_err();
        assert!(err.to_string().contains("season 3"));
    }

    #[test]
    fn embedded_pass_offers_resolve() {
        let bundle = ContentBundle::embedded().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let catalog = bundle.catalog.catalog(now);
        for offer_id in [
            &bundle.progression.battle_pass_offer_id,
            &bundle.progression.battle_bundle_offer_id,
            &bundle.progression.tier_offer_id,
        ] {
            assert!(bundle.progression.pass_offer(offer_id).is_some());
            assert!(catalog.resolve_offer(offer_id).is_ok(), "{offer_id} missing from catalog");
        }
    }

    #[test]
    fn embedded_auto_grants_land_in_storefronts() {
        let bundle = ContentBundle::embedded().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let catalog = bundle.catalog.catalog(now);
        let daily = catalog
            .storefronts
            .iter()
            .find(|storefront| storefront.name == "BRDailyStorefront")
            .unwrap();
        assert_eq!(daily.catalog_entries.len(), 6);
    }

    #[test]
    fn embedded_common_core_accepts_gifts() {
        let templates = templates().unwrap();
        let core = templates.get(ids::COMMON_CORE).unwrap();
        assert!(core.attributes().gifts_allowed());
        assert_eq!(core.attributes().current_mtx_platform.as_deref(), Some("EpicPC"));
        let athena = templates.get(ids::ATHENA).unwrap();
        assert_eq!(athena.attributes().active_loadout(), Some("sandbox_loadout"));
    }
}
