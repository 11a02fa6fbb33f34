//! Response and error envelopes returned to game clients.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::change::ChangeRecord;
use crate::profile::LootEntry;

/// Per-profile part of a response; also used for `multiUpdate` entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub profile_revision: i64,
    pub profile_id: String,
    pub profile_changes_base_revision: i64,
    pub profile_changes: Vec<ChangeRecord>,
    pub profile_command_revision: i64,
}

/// The envelope every operation returns on success.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpResponse {
    #[serde(flatten)]
    pub primary: ProfileUpdate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<Notification>>,
    #[serde(with = "rfc3339_millis")]
    pub server_time: DateTime<Utc>,
    #[serde(default)]
    pub multi_update: Vec<ProfileUpdate>,
    pub response_version: u32,
}

impl McpResponse {
    pub fn new(primary: ProfileUpdate, server_time: DateTime<Utc>) -> Self {
        Self {
            primary,
            notifications: None,
            server_time,
            multi_update: Vec::new(),
            response_version: 1,
        }
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.primary.profile_changes
    }

    /// Whether the primary change list was replaced by a full snapshot.
    pub fn is_full_update(&self) -> bool {
        matches!(
            self.primary.profile_changes.as_slice(),
            [ChangeRecord::FullProfileUpdate { .. }]
        )
    }
}

/// Client-visible notifications attached to a response or pushed to a peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    #[serde(rename = "CatalogPurchase")]
    CatalogPurchase {
        primary: bool,
        #[serde(rename = "lootResult")]
        loot_result: LootResult,
    },
    #[serde(rename = "com.epicgames.gift.received")]
    GiftReceived {
        payload: Map<String, Value>,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LootResult {
    pub items: Vec<LootEntry>,
}

/// Client-facing error body plus the transport hints that go with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "errorCode")]
    pub error_code: String,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
    #[serde(rename = "messageVars")]
    pub message_vars: Vec<String>,
    #[serde(rename = "numericErrorCode")]
    pub numeric_error_code: u32,
    #[serde(rename = "originatingService")]
    pub originating_service: String,
    pub intent: String,
    pub error_description: String,
    pub error: String,
    #[serde(skip)]
    pub status: u16,
}

impl ErrorEnvelope {
    pub const ERROR_NAME_HEADER: &'static str = "X-Epic-Error-Name";
    pub const ERROR_CODE_HEADER: &'static str = "X-Epic-Error-Code";

    pub fn new(
        error_code: &str,
        message: String,
        message_vars: Vec<String>,
        numeric_error_code: u32,
        status: u16,
    ) -> Self {
        Self {
            error_code: error_code.to_owned(),
            error_description: message.clone(),
            error_message: message,
            message_vars,
            numeric_error_code,
            originating_service: "any".to_owned(),
            intent: "prod".to_owned(),
            error: reason_phrase(status).to_owned(),
            status,
        }
    }

    /// Header pairs a transport should echo next to the body.
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            (Self::ERROR_NAME_HEADER, self.error_code.clone()),
            (Self::ERROR_CODE_HEADER, self.numeric_error_code.to_string()),
        ]
    }
}

mod rfc3339_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|time| time.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// HTTP reason phrase carried in the envelope's `error` field.
const fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn response_flattens_primary_update() {
        let time = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let response = McpResponse::new(
            ProfileUpdate {
                profile_revision: 4,
                profile_id: "athena".into(),
                profile_changes_base_revision: 3,
                profile_changes: vec![],
                profile_command_revision: 4,
            },
            time,
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["profileRevision"], json!(4));
        assert_eq!(value["profileChangesBaseRevision"], json!(3));
        assert_eq!(value["serverTime"], json!("2026-03-01T12:00:00.000Z"));
        assert_eq!(value["multiUpdate"], json!([]));
        assert_eq!(value["responseVersion"], json!(1));
        assert!(value.get("notifications").is_none());
    }

    #[test]
    fn error_envelope_echoes_headers() {
        let envelope = ErrorEnvelope::new(
            "errors.com.epicgames.offer.already_owned",
            "You have already bought this item before.".into(),
            vec![],
            1040,
            400,
        );
        let [name, code] = envelope.headers();
        assert_eq!(name.1, "errors.com.epicgames.offer.already_owned");
        assert_eq!(code.1, "1040");

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["originatingService"], json!("any"));
        assert_eq!(value["error"], json!("Bad Request"));
        assert!(value.get("status").is_none());

        let missing = ErrorEnvelope::new("errors.com.epicgames.common.not_found", "Not found".into(), vec![], 1004, 404);
        assert_eq!(missing.error, "Not Found");
    }
}
