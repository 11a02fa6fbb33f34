//! Observable mutation records and the per-request change log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::profile::{Item, Profile};

/// One observable mutation, serialized with a `changeType` tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "changeType",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ChangeRecord {
    ItemAdded { item_id: String, item: Item },
    ItemRemoved { item_id: String },
    ItemQuantityChanged { item_id: String, quantity: i64 },
    ItemAttrChanged {
        item_id: String,
        attribute_name: String,
        attribute_value: Value,
    },
    StatModified { name: String, value: Value },
    FullProfileUpdate { profile: Box<Profile> },
}

impl ChangeRecord {
    pub fn item_added(item_id: impl Into<String>, item: Item) -> Self {
        Self::ItemAdded {
            item_id: item_id.into(),
            item,
        }
    }

    pub fn item_removed(item_id: impl Into<String>) -> Self {
        Self::ItemRemoved {
            item_id: item_id.into(),
        }
    }

    pub fn quantity_changed(item_id: impl Into<String>, quantity: i64) -> Self {
        Self::ItemQuantityChanged {
            item_id: item_id.into(),
            quantity,
        }
    }

    pub fn attr_changed(
        item_id: impl Into<String>,
        attribute_name: impl Into<String>,
        attribute_value: impl Serialize,
    ) -> Self {
        Self::ItemAttrChanged {
            item_id: item_id.into(),
            attribute_name: attribute_name.into(),
            attribute_value: to_value(attribute_value),
        }
    }

    pub fn stat_modified(name: impl Into<String>, value: impl Serialize) -> Self {
        Self::StatModified {
            name: name.into(),
            value: to_value(value),
        }
    }

    pub fn full(profile: &Profile) -> Self {
        Self::FullProfileUpdate {
            profile: Box::new(profile.clone()),
        }
    }
}

// Values handed in here are plain data types; a failure would mean a map with
// non-string keys, which none of the profile types contain.
fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Change records accumulated per profile id during one operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeLog {
    entries: BTreeMap<String, Vec<ChangeRecord>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, profile_id: &str, record: ChangeRecord) {
        self.entries
            .entry(profile_id.to_owned())
            .or_default()
            .push(record);
    }

    pub fn extend(&mut self, profile_id: &str, records: impl IntoIterator<Item = ChangeRecord>) {
        for record in records {
            self.push(profile_id, record);
        }
    }

    pub fn changes(&self, profile_id: &str) -> &[ChangeRecord] {
        self.entries.get(profile_id).map_or(&[], Vec::as_slice)
    }

    pub fn take(&mut self, profile_id: &str) -> Vec<ChangeRecord> {
        self.entries.remove(profile_id).unwrap_or_default()
    }

    /// Profile ids with at least one recorded change, in id order.
    pub fn touched(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(id, _)| id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.touched().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_serialize_with_change_type_tag() {
        let record = ChangeRecord::attr_changed("item1", "item_seen", true);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "changeType": "itemAttrChanged",
                "itemId": "item1",
                "attributeName": "item_seen",
                "attributeValue": true
            })
        );

        let stat = ChangeRecord::stat_modified("book_level", 12);
        assert_eq!(
            serde_json::to_value(&stat).unwrap(),
            json!({ "changeType": "statModified", "name": "book_level", "value": 12 })
        );
    }

    #[test]
    fn log_tracks_touched_profiles() {
        let mut log = ChangeLog::new();
        assert!(log.is_empty());

        log.push("athena", ChangeRecord::item_removed("x"));
        log.extend("common_core", Vec::new());

        assert_eq!(log.touched().collect::<Vec<_>>(), vec!["athena"]);
        assert_eq!(log.changes("athena").len(), 1);
        assert!(log.changes("common_core").is_empty());
        assert_eq!(log.take("athena").len(), 1);
        assert!(log.is_empty());
    }
}
