//! Storefront catalog model and offer resolution.
//!
//! The catalog is rebuilt from static content on every lookup (see
//! [`generate`]); nothing here caches offers between requests.
pub mod generate;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::McpError;
use crate::profile::Profile;

pub use generate::{AutoOffer, CatalogConfig, StaticCatalog, build_catalog, offer_id, sale_expiration};

/// Currency type that is paid from the wallet.
pub const MTX_CURRENCY: &str = "MtxCurrency";

static STOREFRONT_PURCHASE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^BR(Daily|Weekly|Season)Storefront$").ok());

/// Whether offers of this storefront are paid item purchases.
pub fn is_storefront_purchase(storefront: &str) -> bool {
    STOREFRONT_PURCHASE
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(storefront))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub refresh_interval_hrs: i64,
    #[serde(default)]
    pub daily_purchase_hrs: i64,
    #[serde(default)]
    pub expiration: String,
    #[serde(default)]
    pub storefronts: Vec<Storefront>,
}

impl Catalog {
    pub fn storefront_mut(&mut self, name: &str) -> Option<&mut Storefront> {
        self.storefronts.iter_mut().find(|store| store.name == name)
    }

    /// Scans every storefront for the offer.
    pub fn resolve_offer(&self, offer_id: &str) -> Result<(&str, &CatalogEntry), McpError> {
        self.storefronts
            .iter()
            .find_map(|store| {
                store
                    .catalog_entries
                    .iter()
                    .find(|entry| entry.offer_id == offer_id)
                    .map(|entry| (store.name.as_str(), entry))
            })
            .ok_or_else(|| McpError::OfferNotFound {
                offer_id: offer_id.to_owned(),
            })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storefront {
    pub name: String,
    #[serde(default)]
    pub catalog_entries: Vec<CatalogEntry>,
}

/// One purchasable offer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntry {
    pub dev_name: String,
    pub offer_id: String,
    pub fulfillment_ids: Vec<String>,
    pub daily_limit: i64,
    pub weekly_limit: i64,
    pub monthly_limit: i64,
    pub categories: Vec<String>,
    pub prices: Vec<Price>,
    pub meta: Map<String, Value>,
    pub match_filter: String,
    pub filter_weight: i64,
    pub app_store_id: Vec<String>,
    pub requirements: Vec<Requirement>,
    pub offer_type: String,
    pub gift_info: GiftInfo,
    pub refundable: bool,
    pub meta_info: Vec<MetaInfo>,
    pub display_asset_path: String,
    pub item_grants: Vec<ItemGrant>,
    pub sort_priority: i64,
    pub catalog_group_priority: i64,
}

impl CatalogEntry {
    /// Final price of the first price entry when it is paid in wallet currency.
    pub fn mtx_price(&self) -> Option<i64> {
        self.prices
            .first()
            .filter(|price| price.currency_type.eq_ignore_ascii_case(MTX_CURRENCY))
            .map(|price| price.final_price)
    }

    /// Rejects the offer if any granted template is already in `profile`.
    pub fn ensure_not_owned(&self, profile: &Profile) -> Result<(), McpError> {
        match self
            .item_grants
            .iter()
            .find(|grant| profile.owns_template(&grant.template_id))
        {
            Some(grant) => Err(McpError::AlreadyOwned {
                template_id: grant.template_id.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Price {
    pub currency_type: String,
    pub currency_sub_type: String,
    pub regular_price: i64,
    pub final_price: i64,
    pub sale_expiration: String,
    pub base_price: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Requirement {
    pub requirement_type: String,
    pub required_id: String,
    pub min_quantity: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemGrant {
    pub template_id: String,
    pub quantity: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GiftInfo {
    #[serde(rename = "bIsEnabled")]
    pub is_enabled: bool,
    pub forced_gift_box_template_id: String,
    pub purchase_requirements: Vec<Value>,
    pub gift_record_ids: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Item, ItemAttributes, ids};

    fn entry(offer_id: &str, grants: &[&str], price: i64) -> CatalogEntry {
        CatalogEntry {
            offer_id: offer_id.into(),
            prices: vec![Price {
                currency_type: MTX_CURRENCY.into(),
                final_price: price,
                ..Price::default()
            }],
            item_grants: grants
                .iter()
                .map(|id| ItemGrant {
                    template_id: (*id).into(),
                    quantity: 1,
                })
                .collect(),
            ..CatalogEntry::default()
        }
    }

    #[test]
    fn resolves_offer_with_storefront_name() {
        let catalog = Catalog {
            storefronts: vec![
                Storefront {
                    name: "BRDailyStorefront".into(),
                    catalog_entries: vec![entry("a", &[], 100)],
                },
                Storefront {
                    name: "BRSeasonStorefront".into(),
                    catalog_entries: vec![entry("b", &[], 950)],
                },
            ],
            ..Catalog::default()
        };

        let (store, offer) = catalog.resolve_offer("b").unwrap();
        assert_eq!(store, "BRSeasonStorefront");
        assert_eq!(offer.mtx_price(), Some(950));
        assert!(matches!(
            catalog.resolve_offer("zzz"),
            Err(McpError::OfferNotFound { .. })
        ));
    }

    #[test]
    fn storefront_pattern_is_anchored() {
        assert!(is_storefront_purchase("BRDailyStorefront"));
        assert!(is_storefront_purchase("BRWeeklyStorefront"));
        assert!(!is_storefront_purchase("BRStarterKits"));
        assert!(!is_storefront_purchase("XBRDailyStorefront"));
    }

    #[test]
    fn ownership_check_ignores_case() {
        let mut athena = Profile::new(ids::ATHENA);
        athena.items.insert(
            "x".into(),
            Item::new("AthenaCharacter:CID_030", ItemAttributes::granted(), 1),
        );
        let offer = entry("o", &["athenacharacter:cid_030"], 1200);
        assert!(matches!(
            offer.ensure_not_owned(&athena),
            Err(McpError::AlreadyOwned { .. })
        ));
        assert!(entry("o", &["AthenaCharacter:CID_031"], 1).ensure_not_owned(&athena).is_ok());
    }
}
