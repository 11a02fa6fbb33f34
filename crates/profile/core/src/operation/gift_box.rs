use serde::Deserialize;
use serde_json::Value;

use crate::change::ChangeRecord;
use crate::error::{McpError, ParameterCheck};
use crate::profile::{Profile, ProfileSet};

use super::body::decode;
use super::{OperationContext, ProfileOperation};

/// Deletes opened gift boxes.
///
/// `giftBoxItemId` must name an existing gift box; ids in `giftBoxItemIds`
/// that are missing or not gift boxes are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveGiftBox {
    #[serde(default)]
    pub gift_box_item_id: Option<String>,
    #[serde(default)]
    pub gift_box_item_ids: Vec<String>,
}

impl RemoveGiftBox {
    fn check_single(&self, profile: &Profile) -> Result<(), McpError> {
        let Some(item_id) = self.gift_box_item_id.as_deref().filter(|id| !id.is_empty()) else {
            return Ok(());
        };
        match profile.items.get(item_id) {
            None => Err(McpError::invalid(
                ParameterCheck::InvalidId,
                format!("Item (id: '{item_id}') not found"),
                vec![item_id.to_owned()],
            )),
            Some(item) if !item.is_gift_box() => Err(McpError::invalid(
                ParameterCheck::InvalidId,
                "The specified item id is not a giftbox.",
                vec![item_id.to_owned()],
            )),
            Some(_) => Ok(()),
        }
    }
}

impl ProfileOperation for RemoveGiftBox {
    fn parse(body: &Value) -> Result<Self, McpError> {
        decode(body)
    }

    fn pre_validate(&self, set: &ProfileSet, ctx: &OperationContext<'_>) -> Result<(), McpError> {
        self.check_single(set.resolve(ctx.profile_id())?)
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        let profile_id = ctx.request.profile_id.as_str();
        let profile = set.resolve_mut(profile_id)?;
        let candidates = self
            .gift_box_item_id
            .iter()
            .filter(|id| !id.is_empty())
            .chain(&self.gift_box_item_ids);
        for item_id in candidates {
            if !profile.items.get(item_id).is_some_and(|item| item.is_gift_box()) {
                continue;
            }
            profile.items.remove(item_id);
            ctx.log.push(profile_id, ChangeRecord::item_removed(item_id.as_str()));
        }
        Ok(())
    }
}
