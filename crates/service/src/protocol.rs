//! Newline-delimited JSON protocol spoken over stdin/stdout.
//!
//! Each input line is either a client operation
//! (`{"accountId", "operation", "profileId", "rvn"?, "userAgent"?, "dedicated"?, "body"?}`)
//! or an administrative command tagged with `"admin"`. Each produces exactly
//! one [`Reply`] line.
use std::collections::BTreeMap;
use std::sync::Arc;

use profile_core::{BuildVersion, ErrorEnvelope, OperationRequest, ids, wallet};
use runtime::{InMemoryFriends, ProfileService, RuntimeError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Line {
    Admin(AdminCommand),
    Operation(OperationLine),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "admin", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AdminCommand {
    Register { account_id: String },
    Delete { account_id: String },
    GrantXp { account_id: String, amount: i64 },
    GrantCurrency { account_id: String, amount: i64 },
    Befriend { account_id: String, friend_id: String },
    Unfriend { account_id: String, friend_id: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLine {
    pub account_id: String,
    pub operation: String,
    pub profile_id: String,
    #[serde(default)]
    pub rvn: Option<i64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub dedicated: bool,
    #[serde(default)]
    pub body: Value,
}

impl OperationLine {
    pub fn into_request(self) -> OperationRequest {
        let mut request =
            OperationRequest::new(self.account_id, self.operation, self.profile_id).with_body(self.body);
        if let Some(rvn) = self.rvn {
            request = request.with_revision(rvn);
        }
        if let Some(user_agent) = &self.user_agent {
            request = request.with_build(BuildVersion::from_user_agent(user_agent));
        }
        if self.dedicated {
            request = request.dedicated();
        }
        request
    }
}

/// One output line: an HTTP-like status, the error headers, and the body.
#[derive(Debug, Serialize)]
pub struct Reply {
    pub status: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<&'static str, String>,
    pub body: Value,
}

impl Reply {
    fn ok(body: &impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status: 200,
                headers: BTreeMap::new(),
                body,
            },
            Err(err) => Self::envelope(&ErrorEnvelope::new(
                "errors.com.epicgames.common.server_error",
                format!("Response could not be encoded: {err}"),
                Vec::new(),
                1000,
                500,
            )),
        }
    }

    fn error(err: &RuntimeError) -> Self {
        Self::envelope(&err.to_envelope())
    }

    fn malformed(err: &serde_json::Error) -> Self {
        Self::envelope(&ErrorEnvelope::new(
            "errors.com.epicgames.validation.validation_failed",
            format!("Malformed request line: {err}"),
            Vec::new(),
            1040,
            400,
        ))
    }

    fn envelope(envelope: &ErrorEnvelope) -> Self {
        Self {
            status: envelope.status,
            headers: envelope.headers().into_iter().collect(),
            body: serde_json::to_value(envelope).unwrap_or(Value::Null),
        }
    }
}

/// Routes parsed lines to the profile service.
#[derive(Clone)]
pub struct Dispatcher {
    service: ProfileService,
    friends: Arc<InMemoryFriends>,
}

impl Dispatcher {
    pub fn new(service: ProfileService, friends: Arc<InMemoryFriends>) -> Self {
        Self { service, friends }
    }

    pub async fn handle_line(&self, line: &str) -> Reply {
        let line: Line = match serde_json::from_str(line) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "malformed request line");
                return Reply::malformed(&err);
            }
        };
        let result = match line {
            Line::Operation(op) => self.service.execute(op.into_request()).await.map(|response| Reply::ok(&response)),
            Line::Admin(command) => self.admin(command).await.map(|body| Reply::ok(&body)),
        };
        result.unwrap_or_else(|err| Reply::error(&err))
    }

    async fn admin(&self, command: AdminCommand) -> Result<Value, RuntimeError> {
        let platform = &self.service.oracles().config().default_mtx_platform;
        match command {
            AdminCommand::Register { account_id } => {
                let set = self.service.register_account(&account_id).await?;
                Ok(json!({
                    "accountId": account_id,
                    "profileIds": set.profiles.keys().collect::<Vec<_>>(),
                }))
            }
            AdminCommand::Delete { account_id } => {
                let deleted = self.service.delete_account(&account_id).await?;
                Ok(json!({ "accountId": account_id, "deleted": deleted }))
            }
            AdminCommand::GrantXp { account_id, amount } => {
                let outcome = self.service.grant_xp(&account_id, amount).await?;
                let athena = outcome.profiles.resolve(ids::ATHENA)?.attributes();
                Ok(json!({
                    "accountId": account_id,
                    "level": athena.level(),
                    "xp": athena.xp(),
                    "bookLevel": athena.book_level(),
                }))
            }
            AdminCommand::GrantCurrency { account_id, amount } => {
                let outcome = self.service.grant_currency(&account_id, amount).await?;
                let balance = wallet::balance(outcome.profiles.resolve(ids::COMMON_CORE)?, platform);
                Ok(json!({ "accountId": account_id, "balance": balance }))
            }
            AdminCommand::Befriend { account_id, friend_id } => {
                self.friends.add(&account_id, &friend_id);
                Ok(json!({ "accountId": account_id, "friendId": friend_id, "friends": true }))
            }
            AdminCommand::Unfriend { account_id, friend_id } => {
                self.friends.remove(&account_id, &friend_id);
                Ok(json!({ "accountId": account_id, "friendId": friend_id, "friends": false }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use runtime::FriendsOracle;
    use service_bootstrap::{ServiceBuilder, ServiceConfig};

    use super::*;

    fn dispatcher() -> Dispatcher {
        let setup = ServiceBuilder::new(ServiceConfig::default()).build().unwrap();
        Dispatcher::new(setup.runtime.handle(), setup.friends)
    }

    #[test]
    fn operation_lines_carry_client_hints() {
        let line: Line = serde_json::from_str(
            r#"{"accountId":"alice","operation":"QueryProfile","profileId":"athena","rvn":3,
                "userAgent":"Fortnite/++Fortnite+Release-8.51-CL-6165369 Windows/10","dedicated":true}"#,
        )
        .unwrap();
        let Line::Operation(op) = line else {
            panic!("parsed as admin command");
        };
        let request = op.into_request();
        assert_eq!(request.client_revision, Some(3));
        assert_eq!(request.build.season, 8);
        assert!(request.dedicated_server);
        assert_eq!(request.body, Value::Null);
    }

    #[test]
    fn admin_lines_are_tagged() {
        let line: Line =
            serde_json::from_str(r#"{"admin":"grantCurrency","accountId":"alice","amount":500}"#).unwrap();
        assert!(matches!(
            line,
            Line::Admin(AdminCommand::GrantCurrency { amount: 500, .. })
        ));
    }

    #[tokio::test]
    async fn register_then_query() {
        let dispatcher = dispatcher();

        let reply = dispatcher.handle_line(r#"{"admin":"register","accountId":"alice"}"#).await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["profileIds"].as_array().map(Vec::len), Some(6));

        let reply = dispatcher
            .handle_line(r#"{"accountId":"alice","operation":"QueryProfile","profileId":"common_core"}"#)
            .await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["profileId"], json!("common_core"));
        assert_eq!(reply.body["profileChanges"][0]["changeType"], json!("fullProfileUpdate"));
    }

    #[tokio::test]
    async fn errors_become_envelopes_with_headers() {
        let dispatcher = dispatcher();

        let reply = dispatcher
            .handle_line(r#"{"accountId":"ghost","operation":"QueryProfile","profileId":"athena"}"#)
            .await;
        assert_eq!(reply.status, 404);
        assert_eq!(
            reply.headers.get(ErrorEnvelope::ERROR_NAME_HEADER).map(String::as_str),
            Some("errors.com.epicgames.modules.profiles.not_found")
        );
        assert_eq!(reply.body["numericErrorCode"], json!(12804));
    }

    #[tokio::test]
    async fn malformed_lines_are_rejected() {
        let reply = dispatcher().handle_line("{ nope").await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["errorCode"], json!("errors.com.epicgames.validation.validation_failed"));
    }

    #[tokio::test]
    async fn admin_grants_report_new_totals() {
        let dispatcher = dispatcher();
        dispatcher.handle_line(r#"{"admin":"register","accountId":"alice"}"#).await;

        let reply = dispatcher
            .handle_line(r#"{"admin":"grantCurrency","accountId":"alice","amount":750}"#)
            .await;
        assert_eq!(reply.body["balance"], json!(750));

        let reply = dispatcher
            .handle_line(r#"{"admin":"befriend","accountId":"alice","friendId":"bob"}"#)
            .await;
        assert_eq!(reply.status, 200);
        assert!(dispatcher.friends.friends_of("alice").contains(&"bob".to_owned()));
    }
}
