//! Expansion of the auto-grant configuration into synthetic offers.
//!
//! Each configuration key (`daily1`, `featured3`, ...) becomes one offer in
//! either the daily or the weekly storefront. Offer ids are a digest of the
//! grants and the price, so the same configuration always yields the same id.
use std::collections::BTreeMap;

use chrono::{DateTime, Days, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::{Catalog, CatalogEntry, GiftInfo, ItemGrant, MTX_CURRENCY, MetaInfo, Price, Requirement};
use crate::env::CatalogOracle;

pub const DAILY_STOREFRONT: &str = "BRDailyStorefront";
pub const WEEKLY_STOREFRONT: &str = "BRWeeklyStorefront";

/// One auto-grant slot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoOffer {
    #[serde(default)]
    pub item_grants: Vec<String>,
    #[serde(default)]
    pub price: i64,
}

/// Auto-grant slots keyed by slot name; iteration order is the key order.
pub type CatalogConfig = BTreeMap<String, AutoOffer>;

/// Stable id for an auto-generated offer.
pub fn offer_id(item_grants: &[String], price: i64) -> String {
    let key = format!("[{}]_{price}", item_grants.join(" "));
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// One minute before the next UTC midnight.
pub fn sale_expiration(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(now, |midnight| midnight.and_utc())
        - TimeDelta::minutes(1)
}

fn daily_categories(slot: &str, total: usize) -> Vec<String> {
    let category = match (total, slot) {
        (7 | 8, "daily1" | "daily2") => Some("daily1"),
        (8, "daily7" | "daily8") => Some("daily2"),
        _ => None,
    };
    category.into_iter().map(str::to_owned).collect()
}

fn featured_categories(slot: &str, total: usize) -> Vec<String> {
    let category = match (total, slot) {
        (4, "featured3" | "featured4") => Some("Featured1"),
        (5, "featured2" | "featured3" | "featured4") => Some("Featured1"),
        (6, "featured1" | "featured2") => Some("Featured1"),
        (6, "featured3" | "featured4") => Some("Featured2"),
        (6, "featured5" | "featured6") => Some("Featured3"),
        _ => None,
    };
    category.into_iter().map(str::to_owned).collect()
}

fn auto_entry(slot: &str, offer: &AutoOffer, expiration: &str, daily_total: usize, featured_total: usize) -> Option<CatalogEntry> {
    let grants: Vec<&String> = offer.item_grants.iter().filter(|id| !id.is_empty()).collect();
    if grants.is_empty() {
        return None;
    }

    let daily = slot.starts_with("daily");
    let tile_size = if daily { "Small" } else { "Normal" };
    let id = offer_id(&offer.item_grants, offer.price);

    let mut meta = Map::new();
    meta.insert("SectionId".into(), Value::from("Featured"));
    meta.insert("TileSize".into(), Value::from(tile_size));

    Some(CatalogEntry {
        dev_name: id.clone(),
        offer_id: id,
        daily_limit: -1,
        weekly_limit: -1,
        monthly_limit: -1,
        categories: if daily {
            daily_categories(slot, daily_total)
        } else {
            featured_categories(slot, featured_total)
        },
        prices: vec![Price {
            currency_type: MTX_CURRENCY.to_owned(),
            currency_sub_type: String::new(),
            regular_price: offer.price,
            final_price: offer.price,
            sale_expiration: expiration.to_owned(),
            base_price: offer.price,
        }],
        meta,
        requirements: grants
            .iter()
            .map(|id| Requirement {
                requirement_type: "DenyOnItemOwnership".into(),
                required_id: (*id).clone(),
                min_quantity: 1,
            })
            .collect(),
        offer_type: "StaticPrice".into(),
        gift_info: GiftInfo {
            is_enabled: true,
            ..GiftInfo::default()
        },
        refundable: true,
        meta_info: vec![
            MetaInfo {
                key: "SectionId".into(),
                value: "Featured".into(),
            },
            MetaInfo {
                key: "TileSize".into(),
                value: tile_size.into(),
            },
        ],
        item_grants: grants
            .iter()
            .map(|id| ItemGrant {
                template_id: (*id).clone(),
                quantity: 1,
            })
            .collect(),
        sort_priority: if daily { -1 } else { 0 },
        ..CatalogEntry::default()
    })
}

/// Builds the full catalog: the hand-authored storefronts plus one synthetic
/// offer per configured slot.
pub fn build_catalog(base: &Catalog, config: &CatalogConfig, now: DateTime<Utc>) -> Catalog {
    let expiration = sale_expiration(now).to_rfc3339_opts(SecondsFormat::Secs, true);
    let daily_total = config.keys().filter(|key| key.starts_with("daily")).count();
    let featured_total = config.keys().filter(|key| key.starts_with("featured")).count();

    let mut catalog = base.clone();
    for (slot, offer) in config {
        let Some(entry) = auto_entry(slot, offer, &expiration, daily_total, featured_total) else {
            continue;
        };
        let store = if slot.starts_with("daily") {
            DAILY_STOREFRONT
        } else {
            WEEKLY_STOREFRONT
        };
        match catalog.storefront_mut(store) {
            Some(storefront) => storefront.catalog_entries.push(entry),
            None => tracing::warn!(store, slot = %slot, "storefront missing from catalog; offer dropped"),
        }
    }
    catalog
}

/// Catalog oracle backed by static content.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    base: Catalog,
    config: CatalogConfig,
}

impl StaticCatalog {
    pub fn new(base: Catalog, config: CatalogConfig) -> Self {
        Self { base, config }
    }
}

impl CatalogOracle for StaticCatalog {
    fn catalog(&self, now: DateTime<Utc>) -> Catalog {
        build_catalog(&self.base, &self.config, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Storefront;
    use chrono::TimeZone;

    fn base() -> Catalog {
        Catalog {
            storefronts: vec![
                Storefront {
                    name: DAILY_STOREFRONT.into(),
                    catalog_entries: vec![],
                },
                Storefront {
                    name: WEEKLY_STOREFRONT.into(),
                    catalog_entries: vec![],
                },
            ],
            ..Catalog::default()
        }
    }

    fn slot(grants: &[&str], price: i64) -> AutoOffer {
        AutoOffer {
            item_grants: grants.iter().map(|id| (*id).to_owned()).collect(),
            price,
        }
    }

    #[test]
    fn offer_ids_are_stable() {
        let grants = vec!["AthenaCharacter:cid_028_athena_commando_f".to_owned()];
        assert_eq!(offer_id(&grants, 1200), offer_id(&grants, 1200));
        assert_ne!(offer_id(&grants, 1200), offer_id(&grants, 1500));
        assert_eq!(offer_id(&grants, 1200).len(), 64);
    }

    #[test]
    fn sale_expires_just_before_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 15, 30, 0).unwrap();
        assert_eq!(
            sale_expiration(now),
            Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 0).unwrap()
        );
    }

    #[test]
    fn slots_land_in_their_storefronts() {
        let mut config = CatalogConfig::new();
        config.insert("daily1".into(), slot(&["AthenaPickaxe:pickaxe_id_011_medieval"], 800));
        config.insert("featured1".into(), slot(&["AthenaCharacter:cid_029_athena_commando_f_halloween"], 1500));
        config.insert("featured2".into(), slot(&[], 0));

        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let catalog = build_catalog(&base(), &config, now);

        let daily = &catalog.storefronts[0].catalog_entries;
        let weekly = &catalog.storefronts[1].catalog_entries;
        assert_eq!(daily.len(), 1);
        assert_eq!(weekly.len(), 1);

        assert_eq!(daily[0].sort_priority, -1);
        assert_eq!(daily[0].meta["TileSize"], "Small");
        assert_eq!(weekly[0].meta["TileSize"], "Normal");
        assert_eq!(weekly[0].requirements[0].requirement_type, "DenyOnItemOwnership");
        assert_eq!(weekly[0].prices[0].sale_expiration, "2026-03-01T23:59:00Z");

        let (store, _) = catalog.resolve_offer(&weekly[0].offer_id).unwrap();
        assert_eq!(store, WEEKLY_STOREFRONT);
    }

    #[test]
    fn category_tables_follow_slot_count() {
        assert_eq!(daily_categories("daily7", 8), vec!["daily2"]);
        assert!(daily_categories("daily7", 7).is_empty());
        assert_eq!(featured_categories("featured5", 6), vec!["Featured3"]);
        assert!(featured_categories("featured1", 5).is_empty());
    }
}
