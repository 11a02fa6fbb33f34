//! Inventory items and their attribute bags.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Template-id prefix (lower-cased) shared by every currency instance.
pub const CURRENCY_PREFIX: &str = "currency:mtx";

/// Template-id prefix for gift-box containers.
pub const GIFT_BOX_PREFIX: &str = "GiftBox:";

/// One entry of a profile's `items` map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub template_id: String,
    #[serde(default)]
    pub attributes: ItemAttributes,
    #[serde(default)]
    pub quantity: i64,
}

impl Item {
    pub fn new(template_id: impl Into<String>, attributes: ItemAttributes, quantity: i64) -> Self {
        Self {
            template_id: template_id.into(),
            attributes,
            quantity,
        }
    }

    /// The `Category` half of a `Category:Subtype` template id.
    pub fn category(&self) -> &str {
        self.template_id
            .split_once(':')
            .map_or(self.template_id.as_str(), |(category, _)| category)
    }

    /// Case-insensitive template comparison.
    pub fn has_template(&self, template_id: &str) -> bool {
        self.template_id.eq_ignore_ascii_case(template_id)
    }

    pub fn is_currency(&self) -> bool {
        self.template_id.to_ascii_lowercase().starts_with(CURRENCY_PREFIX)
    }

    pub fn is_gift_box(&self) -> bool {
        self.template_id.starts_with(GIFT_BOX_PREFIX)
    }
}

/// Typed view over an item's attribute bag.
///
/// Known fields are typed; anything else is kept verbatim in `extra` so that
/// documents written by newer clients survive a round trip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_level_bonus: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_seen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(rename = "fromAccountId", default, skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<String>,
    #[serde(rename = "lootList", default, skip_serializing_if = "Option::is_none")]
    pub loot_list: Option<Vec<LootEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(rename = "giftedOn", default, skip_serializing_if = "Option::is_none")]
    pub gifted_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locker_slots_data: Option<LockerSlotsData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_icon_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_color_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItemAttributes {
    /// Attributes of a freshly granted cosmetic reward.
    pub fn cosmetic() -> Self {
        Self {
            max_level_bonus: Some(0),
            level: Some(1),
            item_seen: Some(false),
            xp: Some(0),
            variants: Some(Vec::new()),
            favorite: Some(false),
            ..Self::default()
        }
    }

    /// Attributes of an item delivered through a purchase or a gift.
    pub fn granted() -> Self {
        Self {
            item_seen: Some(false),
            variants: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Attributes of a newly unlocked banner.
    pub fn unseen() -> Self {
        Self {
            item_seen: Some(false),
            ..Self::default()
        }
    }

    /// Attributes of a gift-box container.
    pub fn gift_box(from_account_id: impl Into<String>, loot: Vec<LootEntry>) -> Self {
        Self {
            max_level_bonus: Some(0),
            from_account_id: Some(from_account_id.into()),
            loot_list: Some(loot),
            ..Self::default()
        }
    }

    pub fn currency(platform: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
            ..Self::default()
        }
    }
}

/// A cosmetic style selection keyed by channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub channel: String,
    pub active: String,
    #[serde(default)]
    pub owned: Vec<String>,
}

/// A granted item reference, used by gift boxes, notifications and purchase history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootEntry {
    pub item_type: String,
    pub item_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_profile: Option<String>,
    pub quantity: i64,
}

impl LootEntry {
    pub fn new(item_type: impl Into<String>, item_guid: impl Into<String>, quantity: i64) -> Self {
        Self {
            item_type: item_type.into(),
            item_guid: item_guid.into(),
            item_profile: None,
            quantity,
        }
    }

    #[must_use]
    pub fn in_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.item_profile = Some(profile_id.into());
        self
    }
}

/// Slot contents stored on a loadout item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LockerSlotsData {
    #[serde(default)]
    pub slots: BTreeMap<String, LockerSlot>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerSlot {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub active_variants: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_attributes_survive_round_trip() {
        let raw = json!({
            "templateId": "AthenaCharacter:cid_001",
            "attributes": { "item_seen": true, "rnd_sel_cnt": 3 },
            "quantity": 1
        });
        let item: Item = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.attributes.item_seen, Some(true));
        assert_eq!(item.attributes.extra["rnd_sel_cnt"], json!(3));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn category_and_currency_detection() {
        let wallet = Item::new("Currency:MtxPurchased", ItemAttributes::currency("Shared"), 10);
        assert_eq!(wallet.category(), "Currency");
        assert!(wallet.is_currency());
        assert!(!wallet.is_gift_box());
        assert!(wallet.has_template("currency:mtxpurchased"));
    }
}
