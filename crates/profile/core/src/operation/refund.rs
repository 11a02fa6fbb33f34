use serde::Deserialize;
use serde_json::Value;

use crate::change::ChangeRecord;
use crate::error::{McpError, ParameterCheck};
use crate::profile::{ProfileSet, PurchaseEntry, ids};
use crate::wallet;

use super::body::{decode, require};
use super::{OperationContext, ProfileOperation};

/// Reverses a storefront purchase: credits the wallet back and removes the
/// granted items from `athena`. The history entry stays, stamped with
/// `refundDate`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundMtxPurchase {
    pub purchase_id: String,
}

impl RefundMtxPurchase {
    fn find<'s>(&self, set: &'s ProfileSet, profile_id: &str) -> Result<&'s PurchaseEntry, McpError> {
        set.resolve(profile_id)?
            .attributes()
            .mtx_purchase_history
            .as_ref()
            .and_then(|history| {
                history
                    .purchases
                    .iter()
                    .find(|entry| entry.purchase_id == self.purchase_id)
            })
            .ok_or_else(|| McpError::PurchaseNotFound {
                purchase_id: self.purchase_id.clone(),
            })
    }
}

impl ProfileOperation for RefundMtxPurchase {
    fn parse(body: &Value) -> Result<Self, McpError> {
        require(body, &["purchaseId"])?;
        decode(body)
    }

    fn pre_validate(&self, set: &ProfileSet, ctx: &OperationContext<'_>) -> Result<(), McpError> {
        set.resolve(ids::ATHENA)?;
        let entry = self.find(set, ctx.profile_id())?;
        if entry.is_refunded() {
            return Err(McpError::invalid(
                ParameterCheck::InvalidId,
                format!("Purchase {} has already been refunded", self.purchase_id),
                vec![self.purchase_id.clone()],
            ));
        }
        Ok(())
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        let env = ctx.env;
        let purchasing = ctx.request.profile_id.as_str();

        let attrs = set.resolve_mut(purchasing)?.attributes_mut();
        let history = attrs
            .mtx_purchase_history
            .as_mut()
            .ok_or_else(|| McpError::PurchaseNotFound {
                purchase_id: self.purchase_id.clone(),
            })?;
        history.refunds_used += 1;
        history.refund_credits -= 1;
        let entry = history
            .find_mut(&self.purchase_id)
            .ok_or_else(|| McpError::PurchaseNotFound {
                purchase_id: self.purchase_id.clone(),
            })?;
        entry.refund_date = Some(env.now());
        let refunded = entry.total_mtx_paid;
        let loot = entry.loot_result.clone();
        ctx.log.push(purchasing, ChangeRecord::stat_modified("mtx_purchase_history", &*history));

        if refunded > 0 {
            let profile = set.resolve_mut(purchasing)?;
            let change = wallet::credit(profile, refunded, || env.next_id(), &env.config.default_mtx_platform);
            ctx.log.push(purchasing, change);
        }

        let athena = set.resolve_mut(ids::ATHENA)?;
        for granted in &loot {
            if athena.items.remove(&granted.item_guid).is_some() {
                ctx.log.push(ids::ATHENA, ChangeRecord::item_removed(granted.item_guid.as_str()));
            } else {
                tracing::debug!(item_id = %granted.item_guid, "refunded item already gone");
            }
        }

        tracing::debug!(purchase_id = %self.purchase_id, refunded, "purchase refunded");
        Ok(())
    }
}
