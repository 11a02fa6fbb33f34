//! Typed `stats.attributes` with a residual extension map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::item::LootEntry;

/// Fixed stat fields are typed; unknown ones land in `extra`.
///
/// Every typed field is optional because the same struct backs all profile
/// kinds: `athena` carries the progression and loadout stats, `common_core`
/// carries the wallet platform and the purchase history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_xp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_purchased: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_match_boost: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_friend_match_boost: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_season_boost: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_loadout_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loadouts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_applied_loadout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_dance: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_itemwraps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_mtx_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtx_purchase_history: Option<PurchaseHistory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_to_receive_gifts: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatAttributes {
    pub fn level(&self) -> i64 {
        self.level.unwrap_or(1)
    }

    pub fn xp(&self) -> i64 {
        self.xp.unwrap_or(0)
    }

    pub fn book_level(&self) -> i64 {
        self.book_level.unwrap_or(0)
    }

    pub fn book_xp(&self) -> i64 {
        self.book_xp.unwrap_or(0)
    }

    pub fn book_purchased(&self) -> bool {
        self.book_purchased.unwrap_or(false)
    }

    pub fn season_match_boost(&self) -> i64 {
        self.season_match_boost.unwrap_or(0)
    }

    /// Gift receipt must be explicitly enabled.
    pub fn gifts_allowed(&self) -> bool {
        self.allowed_to_receive_gifts.unwrap_or(false)
    }

    /// Item id of the loadout selected by `active_loadout_index`.
    pub fn active_loadout(&self) -> Option<&str> {
        let index = usize::try_from(self.active_loadout_index.unwrap_or(0)).ok()?;
        self.loadouts.as_ref()?.get(index).map(String::as_str)
    }

    /// Reads a stat that has no typed field.
    pub fn extra_stat(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Writes a stat that has no typed field.
    pub fn set_extra_stat(&mut self, name: impl Into<String>, value: Value) {
        self.extra.insert(name.into(), value);
    }
}

/// `stats.attributes.mtx_purchase_history` on the currency profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistory {
    #[serde(default)]
    pub refunds_used: i64,
    #[serde(default)]
    pub refund_credits: i64,
    #[serde(default)]
    pub purchases: Vec<PurchaseEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PurchaseHistory {
    pub fn find_mut(&mut self, purchase_id: &str) -> Option<&mut PurchaseEntry> {
        self.purchases
            .iter_mut()
            .find(|entry| entry.purchase_id == purchase_id)
    }
}

/// One paid storefront purchase. Never deleted; a refund only stamps `refund_date`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEntry {
    pub purchase_id: String,
    pub offer_id: String,
    pub purchase_date: DateTime<Utc>,
    #[serde(default)]
    pub free_refund_eligible: bool,
    #[serde(default)]
    pub fulfillments: Vec<Value>,
    #[serde(default)]
    pub loot_result: Vec<LootEntry>,
    #[serde(default)]
    pub total_mtx_paid: i64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub game_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_date: Option<DateTime<Utc>>,
}

impl PurchaseEntry {
    pub fn new(
        purchase_id: impl Into<String>,
        purchase_date: DateTime<Utc>,
        loot_result: Vec<LootEntry>,
        total_mtx_paid: i64,
    ) -> Self {
        let purchase_id = purchase_id.into();
        Self {
            offer_id: format!("v2:/{purchase_id}"),
            purchase_id,
            purchase_date,
            free_refund_eligible: false,
            fulfillments: Vec::new(),
            loot_result,
            total_mtx_paid,
            metadata: Map::new(),
            game_context: String::new(),
            refund_date: None,
        }
    }

    pub fn is_refunded(&self) -> bool {
        self.refund_date.is_some()
    }
}
