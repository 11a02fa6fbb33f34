//! Storefront catalog and auto-grant configuration loaders.

use std::path::Path;

use profile_core::{Catalog, CatalogConfig};

use crate::loaders::{LoadResult, read_file};

/// Loader for the hand-authored storefront catalog (JSON).
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load(path: &Path) -> LoadResult<Catalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Catalog> {
        let catalog: Catalog = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog JSON: {}", e))?;

        let offers: usize = catalog
            .storefronts
            .iter()
            .map(|storefront| storefront.catalog_entries.len())
            .sum();
        tracing::debug!(storefronts = catalog.storefronts.len(), offers, "catalog loaded");
        Ok(catalog)
    }
}

/// Loader for the auto-grant slots that expand into daily and featured offers.
pub struct CatalogConfigLoader;

impl CatalogConfigLoader {
    pub fn load(path: &Path) -> LoadResult<CatalogConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CatalogConfig> {
        let config: CatalogConfig = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog config JSON: {}", e))?;

        for (slot, offer) in &config {
            if !slot.starts_with("daily") && !slot.starts_with("featured") {
                tracing::warn!(slot = %slot, "auto-grant slot is neither daily nor featured");
            }
            if offer.price < 0 {
                anyhow::bail!("auto-grant slot {} has a negative price", slot);
            }
        }
        Ok(config)
    }
}
