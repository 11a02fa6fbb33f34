//! Profile documents and the per-account profile set.
//!
//! A [`ProfileSet`] is the unit the store hands out: every named sub-profile
//! of one account. Operations resolve the sub-profile they target through
//! [`ProfileSet::resolve`], which reports unknown ids as a distinct
//! forbidden error rather than a generic miss.
mod item;
mod stats;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::McpError;

pub use item::{
    CURRENCY_PREFIX, GIFT_BOX_PREFIX, Item, ItemAttributes, LockerSlot, LockerSlotsData,
    LootEntry, Variant,
};
pub use stats::{PurchaseEntry, PurchaseHistory, StatAttributes};

/// Well-known profile ids.
pub mod ids {
    /// Battle royale inventory, progression and loadouts.
    pub const ATHENA: &str = "athena";
    /// Wallet, purchase history, banners and gift boxes.
    pub const COMMON_CORE: &str = "common_core";
    /// Legacy profile that doubles as the currency profile on old builds.
    pub const PROFILE0: &str = "profile0";
    pub const COMMON_PUBLIC: &str = "common_public";
    pub const CREATIVE: &str = "creative";
    pub const COLLECTIONS: &str = "collections";
}

/// One named game-state document of an account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub rvn: i64,
    #[serde(default)]
    pub wipe_number: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    pub profile_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub items: BTreeMap<String, Item>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub command_revision: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub attributes: StatAttributes,
}

impl Profile {
    /// Creates an empty profile; mostly useful for tests and templates.
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            created: DateTime::<Utc>::default(),
            updated: DateTime::<Utc>::default(),
            rvn: 0,
            wipe_number: 1,
            account_id: String::new(),
            profile_id: profile_id.into(),
            version: String::new(),
            items: BTreeMap::new(),
            stats: Stats::default(),
            command_revision: 0,
            extra: Map::new(),
        }
    }

    pub fn attributes(&self) -> &StatAttributes {
        &self.stats.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut StatAttributes {
        &mut self.stats.attributes
    }

    /// First item (in id order) whose template matches case-insensitively.
    pub fn find_by_template(&self, template_id: &str) -> Option<(&str, &Item)> {
        self.items
            .iter()
            .find(|(_, item)| item.has_template(template_id))
            .map(|(id, item)| (id.as_str(), item))
    }

    pub fn owns_template(&self, template_id: &str) -> bool {
        self.find_by_template(template_id).is_some()
    }
}

/// Every sub-profile of one account, keyed by profile id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSet {
    pub account_id: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfileSet {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            profiles: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.profile_id.clone(), profile);
    }

    pub fn contains(&self, profile_id: &str) -> bool {
        self.profiles.contains_key(profile_id)
    }

    /// Returns the named profile or `ProfileNotFound`.
    pub fn resolve(&self, profile_id: &str) -> Result<&Profile, McpError> {
        self.profiles
            .get(profile_id)
            .ok_or_else(|| McpError::ProfileNotFound {
                profile_id: profile_id.to_owned(),
            })
    }

    pub fn resolve_mut(&mut self, profile_id: &str) -> Result<&mut Profile, McpError> {
        self.profiles
            .get_mut(profile_id)
            .ok_or_else(|| McpError::ProfileNotFound {
                profile_id: profile_id.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_unknown_profile_is_forbidden() {
        let mut set = ProfileSet::new("acc");
        set.insert(Profile::new(ids::ATHENA));

        assert!(set.resolve(ids::ATHENA).is_ok());
        let err = set.resolve("campaign").unwrap_err();
        assert_eq!(err.status(), 403);
    }

    #[test]
    fn template_lookup_ignores_case() {
        let mut profile = Profile::new(ids::ATHENA);
        profile.items.insert(
            "b".into(),
            Item::new("AthenaCharacter:CID_002", ItemAttributes::granted(), 1),
        );
        profile.items.insert(
            "a".into(),
            Item::new("AthenaCharacter:cid_002", ItemAttributes::granted(), 1),
        );

        let (id, _) = profile.find_by_template("athenacharacter:cid_002").unwrap();
        assert_eq!(id, "a");
        assert!(!profile.owns_template("AthenaCharacter:cid_003"));
    }
}
