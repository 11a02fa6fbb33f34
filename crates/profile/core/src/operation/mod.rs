//! Named client operations.
//!
//! Every operation follows the same pipeline: the body is decoded and its
//! required fields checked ([`prepare`]), domain preconditions are checked
//! against the unmodified profiles ([`ProfileOperation::pre_validate`]), and
//! only then are profiles mutated ([`ProfileOperation::apply`]). Each handler
//! declares which profile ids it accepts through [`OperationKind`].
pub mod body;
mod context;
mod cosmetics;
mod gift;
mod gift_box;
mod purchase;
mod query;
mod refund;

use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::McpError;
use crate::profile::{ProfileSet, ids};
use crate::revision::{BuildVersion, RevisionMode};

pub use context::{Delivery, OperationContext, Peers};
pub use cosmetics::{EquipCustomization, MarkItemSeen, SetBanner, SetFavoriteBatch, VariantUpdate};
pub use gift::GiftCatalogEntry;
pub use gift_box::RemoveGiftBox;
pub use purchase::PurchaseCatalogEntry;
pub use query::QueryProfile;
pub use refund::RefundMtxPurchase;

/// Every operation name the engine recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::AsRefStr, strum::Display)]
pub enum OperationKind {
    QueryProfile,
    ClientQuestLogin,
    RefreshExpeditions,
    GetMcpTimeForLogin,
    IncrementNamedCounterStat,
    SetHardcoreModifier,
    SetMtxPlatform,
    BulkEquipBattleRoyaleCustomization,
    MarkItemSeen,
    SetItemFavoriteStatusBatch,
    SetBattleRoyaleBanner,
    EquipBattleRoyaleCustomization,
    PurchaseCatalogEntry,
    GiftCatalogEntry,
    RefundMtxPurchase,
    RemoveGiftBox,
    SetAffiliateName,
}

impl OperationKind {
    /// Profile ids the operation may target; `None` accepts any profile in the set.
    pub const fn allowed_profiles(self) -> Option<&'static [&'static str]> {
        match self {
            Self::SetItemFavoriteStatusBatch
            | Self::SetBattleRoyaleBanner
            | Self::EquipBattleRoyaleCustomization => Some(&[ids::ATHENA]),
            Self::PurchaseCatalogEntry | Self::RefundMtxPurchase => {
                Some(&[ids::COMMON_CORE, ids::PROFILE0])
            }
            Self::GiftCatalogEntry => Some(&[ids::COMMON_CORE]),
            Self::RemoveGiftBox => Some(&[ids::ATHENA, ids::COMMON_CORE, ids::PROFILE0]),
            _ => None,
        }
    }

    /// Read-mostly operations answered from the stored profile.
    pub const fn is_query(self) -> bool {
        matches!(
            self,
            Self::QueryProfile
                | Self::ClientQuestLogin
                | Self::RefreshExpeditions
                | Self::GetMcpTimeForLogin
                | Self::IncrementNamedCounterStat
                | Self::SetHardcoreModifier
                | Self::SetMtxPlatform
                | Self::BulkEquipBattleRoyaleCustomization
        )
    }
}

/// One inbound operation call.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationRequest {
    pub account_id: String,
    pub operation: String,
    pub profile_id: String,
    /// The client's cached revision; `None` or `-1` asks for a snapshot.
    pub client_revision: Option<i64>,
    pub build: BuildVersion,
    /// Requests from a dedicated game server always compare against `rvn`.
    pub dedicated_server: bool,
    pub body: Value,
}

impl OperationRequest {
    pub fn new(account_id: impl Into<String>, operation: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            operation: operation.into(),
            profile_id: profile_id.into(),
            client_revision: None,
            build: BuildVersion::default(),
            dedicated_server: false,
            body: Value::Null,
        }
    }

    #[must_use]
    pub fn with_revision(mut self, rvn: i64) -> Self {
        self.client_revision = Some(rvn);
        self
    }

    #[must_use]
    pub fn with_build(mut self, build: BuildVersion) -> Self {
        self.build = build;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn dedicated(mut self) -> Self {
        self.dedicated_server = true;
        self
    }

    pub fn revision_mode(&self, command_revision_build: f64) -> RevisionMode {
        if self.dedicated_server {
            RevisionMode::Rvn
        } else {
            self.build.revision_mode(command_revision_build)
        }
    }
}

/// A single operation's three-phase contract.
pub trait ProfileOperation: Sized {
    /// Decodes the body; fails on missing or malformed fields without reading any profile.
    fn parse(body: &Value) -> Result<Self, McpError>;

    /// Structural checks that depend on engine limits rather than profile state.
    fn validate(&self, _config: &EngineConfig) -> Result<(), McpError> {
        Ok(())
    }

    /// Validates domain preconditions against the profiles **before** mutation.
    fn pre_validate(&self, _set: &ProfileSet, _ctx: &OperationContext<'_>) -> Result<(), McpError> {
        Ok(())
    }

    /// Mutates the profiles and records every change. Runs only after
    /// `pre_validate` succeeded.
    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError>;

    /// Other accounts whose profiles the operation reads or writes.
    fn peer_accounts(&self, _caller: &str) -> Vec<String> {
        Vec::new()
    }
}

/// A decoded operation body.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Query(QueryProfile),
    MarkItemSeen(MarkItemSeen),
    SetFavoriteBatch(SetFavoriteBatch),
    SetBanner(SetBanner),
    Equip(EquipCustomization),
    Purchase(PurchaseCatalogEntry),
    Gift(GiftCatalogEntry),
    Refund(RefundMtxPurchase),
    RemoveGiftBox(RemoveGiftBox),
}

macro_rules! dispatch {
    ($command:expr, $op:ident => $body:expr) => {
        match $command {
            Command::Query($op) => $body,
            Command::MarkItemSeen($op) => $body,
            Command::SetFavoriteBatch($op) => $body,
            Command::SetBanner($op) => $body,
            Command::Equip($op) => $body,
            Command::Purchase($op) => $body,
            Command::Gift($op) => $body,
            Command::Refund($op) => $body,
            Command::RemoveGiftBox($op) => $body,
        }
    };
}

impl Command {
    pub fn parse(kind: OperationKind, body: &Value) -> Result<Self, McpError> {
        Ok(match kind {
            _ if kind.is_query() => Self::Query(QueryProfile::parse(body)?),
            OperationKind::MarkItemSeen => Self::MarkItemSeen(MarkItemSeen::parse(body)?),
            OperationKind::SetItemFavoriteStatusBatch => Self::SetFavoriteBatch(SetFavoriteBatch::parse(body)?),
            OperationKind::SetBattleRoyaleBanner => Self::SetBanner(SetBanner::parse(body)?),
            OperationKind::EquipBattleRoyaleCustomization => Self::Equip(EquipCustomization::parse(body)?),
            OperationKind::PurchaseCatalogEntry => Self::Purchase(PurchaseCatalogEntry::parse(body)?),
            OperationKind::GiftCatalogEntry => Self::Gift(GiftCatalogEntry::parse(body)?),
            OperationKind::RefundMtxPurchase => Self::Refund(RefundMtxPurchase::parse(body)?),
            OperationKind::RemoveGiftBox => Self::RemoveGiftBox(RemoveGiftBox::parse(body)?),
            OperationKind::SetAffiliateName => {
                return Err(McpError::FeatureDisabled {
                    feature: "SAC Codes".into(),
                });
            }
            _ => {
                return Err(McpError::OperationNotFound {
                    operation: kind.to_string(),
                });
            }
        })
    }

    pub fn validate(&self, config: &EngineConfig) -> Result<(), McpError> {
        dispatch!(self, op => op.validate(config))
    }

    pub fn pre_validate(&self, set: &ProfileSet, ctx: &OperationContext<'_>) -> Result<(), McpError> {
        dispatch!(self, op => op.pre_validate(set, ctx))
    }

    pub fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        dispatch!(self, op => op.apply(set, ctx))
    }

    pub fn peer_accounts(&self, caller: &str) -> Vec<String> {
        dispatch!(self, op => op.peer_accounts(caller))
    }
}

/// A request that passed every structural check.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedOperation {
    pub request: OperationRequest,
    pub kind: OperationKind,
    pub command: Command,
}

impl PreparedOperation {
    /// Accounts other than the caller that must be loaded alongside it.
    pub fn peer_accounts(&self) -> Vec<String> {
        self.command.peer_accounts(&self.request.account_id)
    }
}

/// Resolves the operation name, enforces its profile restriction, decodes the
/// body and checks it against the engine limits. Nothing here touches a
/// stored profile.
pub fn prepare(request: OperationRequest, config: &EngineConfig) -> Result<PreparedOperation, McpError> {
    let kind: OperationKind = request
        .operation
        .parse()
        .map_err(|_| McpError::OperationNotFound {
            operation: request.operation.clone(),
        })?;

    if let Some(allowed) = kind.allowed_profiles()
        && !allowed.contains(&request.profile_id.as_str())
    {
        return Err(McpError::invalid_command(kind.as_ref(), &request.profile_id));
    }

    let command = Command::parse(kind, &request.body)?;
    command.validate(config)?;
    Ok(PreparedOperation {
        request,
        kind,
        command,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prepare(request: OperationRequest) -> Result<PreparedOperation, McpError> {
        super::prepare(request, &EngineConfig::default())
    }

    #[test]
    fn unknown_operation_is_not_found() {
        let err = prepare(OperationRequest::new("acc", "DoSomethingElse", ids::ATHENA)).unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(err.numeric_code(), 16035);
    }

    #[test]
    fn restricted_operation_rejects_other_profiles() {
        let request = OperationRequest::new("acc", "PurchaseCatalogEntry", ids::ATHENA)
            .with_body(json!({ "offerId": "x", "purchaseQuantity": 1 }));
        let err = prepare(request).unwrap_err();
        assert_eq!(err, McpError::invalid_command("PurchaseCatalogEntry", ids::ATHENA));
    }

    #[test]
    fn affiliate_name_is_disabled() {
        let err = prepare(OperationRequest::new("acc", "SetAffiliateName", ids::COMMON_CORE)).unwrap_err();
        assert!(matches!(err, McpError::FeatureDisabled { .. }));
    }

    #[test]
    fn query_family_shares_one_handler() {
        for name in ["QueryProfile", "ClientQuestLogin", "SetMtxPlatform"] {
            let prepared = prepare(OperationRequest::new("acc", name, ids::COMMON_CORE)).unwrap();
            assert!(matches!(prepared.command, Command::Query(_)));
        }
    }

    #[test]
    fn dedicated_server_always_compares_rvn() {
        let request = OperationRequest::new("acc", "QueryProfile", ids::ATHENA)
            .with_build(BuildVersion::new(19, 19.10))
            .dedicated();
        assert_eq!(request.revision_mode(12.20), RevisionMode::Rvn);
    }
}
