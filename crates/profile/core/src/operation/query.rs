use serde_json::Value;

use crate::change::ChangeRecord;
use crate::error::McpError;
use crate::profile::{ProfileSet, ids};

use super::{OperationContext, ProfileOperation};

/// Snapshot-style operations that only report the current profile.
///
/// The one mutation is initialising `last_applied_loadout` on `athena` when a
/// profile created from an old template is queried for the first time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryProfile;

impl ProfileOperation for QueryProfile {
    fn parse(_body: &Value) -> Result<Self, McpError> {
        Ok(Self)
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        if ctx.profile_id() != ids::ATHENA {
            return Ok(());
        }
        let attrs = set.resolve_mut(ids::ATHENA)?.attributes_mut();
        let unset = attrs.last_applied_loadout.as_deref().is_none_or(str::is_empty);
        let first = attrs.loadouts.as_ref().and_then(|loadouts| loadouts.first()).cloned();
        if unset && let Some(first) = first {
            ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified("last_applied_loadout", &first));
            attrs.last_applied_loadout = Some(first);
        }
        Ok(())
    }
}
