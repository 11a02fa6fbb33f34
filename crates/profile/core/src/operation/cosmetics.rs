//! Locker operations on `athena`: seen/favorite flags, banner and loadout slots.
use serde::Deserialize;
use serde_json::Value;

use crate::change::ChangeRecord;
use crate::error::{McpError, ParameterCheck};
use crate::profile::{LockerSlotsData, Profile, ProfileSet, Variant, ids};

use super::body::{decode, require};
use super::{OperationContext, ProfileOperation};

/// Template ids that may be slotted without owning them.
pub const RANDOM_COSMETICS: [&str; 8] = [
    "AthenaCharacter:cid_random",
    "AthenaBackpack:bid_random",
    "AthenaPickaxe:pickaxe_random",
    "AthenaGlider:glider_random",
    "AthenaSkyDiveContrail:trails_random",
    "AthenaItemWrap:wrap_random",
    "AthenaMusicPack:musicpack_random",
    "AthenaLoadingScreen:lsid_random",
];

const DANCE_SLOTS: usize = 6;
const WRAP_SLOTS: usize = 8;

/// Sets `item_seen` on every listed item of the target profile.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkItemSeen {
    pub item_ids: Vec<String>,
}

impl ProfileOperation for MarkItemSeen {
    fn parse(body: &Value) -> Result<Self, McpError> {
        require(body, &["itemIds"])?;
        decode(body)
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        let profile_id = ctx.request.profile_id.as_str();
        let profile = set.resolve_mut(profile_id)?;
        for item_id in &self.item_ids {
            let Some(item) = profile.items.get_mut(item_id) else {
                tracing::debug!(%item_id, "mark seen skipped unknown item");
                continue;
            };
            if item.attributes.item_seen == Some(true) {
                continue;
            }
            item.attributes.item_seen = Some(true);
            ctx.log.push(profile_id, ChangeRecord::attr_changed(item_id.as_str(), "item_seen", true));
        }
        Ok(())
    }
}

/// Pairs `itemIds[i]` with `itemFavStatus[i]`; extra entries on either side are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFavoriteBatch {
    pub item_ids: Vec<String>,
    pub item_fav_status: Vec<bool>,
}

impl ProfileOperation for SetFavoriteBatch {
    fn parse(body: &Value) -> Result<Self, McpError> {
        require(body, &["itemIds", "itemFavStatus"])?;
        decode(body)
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        let profile = set.resolve_mut(ids::ATHENA)?;
        for (item_id, &favorite) in self.item_ids.iter().zip(&self.item_fav_status) {
            let Some(item) = profile.items.get_mut(item_id) else {
                tracing::debug!(%item_id, "favorite skipped unknown item");
                continue;
            };
            if item.attributes.favorite == Some(favorite) {
                continue;
            }
            item.attributes.favorite = Some(favorite);
            ctx.log.push(ids::ATHENA, ChangeRecord::attr_changed(item_id.as_str(), "favorite", favorite));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBanner {
    pub homebase_banner_icon_id: String,
    pub homebase_banner_color_id: String,
}

impl SetBanner {
    fn banner_profile(ctx: &OperationContext<'_>) -> &'static str {
        if ctx.request.build.build < ctx.env.config.legacy_banner_build {
            ids::PROFILE0
        } else {
            ids::COMMON_CORE
        }
    }
}

impl ProfileOperation for SetBanner {
    fn parse(body: &Value) -> Result<Self, McpError> {
        require(body, &["homebaseBannerIconId", "homebaseBannerColorId"])?;
        decode(body)
    }

    fn pre_validate(&self, set: &ProfileSet, ctx: &OperationContext<'_>) -> Result<(), McpError> {
        let banners = set.resolve(Self::banner_profile(ctx))?;
        for template_id in [
            format!("HomebaseBannerIcon:{}", self.homebase_banner_icon_id),
            format!("HomebaseBannerColor:{}", self.homebase_banner_color_id),
        ] {
            if !banners.owns_template(&template_id) {
                return Err(McpError::ItemNotFound {
                    item_id: template_id,
                });
            }
        }
        active_loadout(set.resolve(ids::ATHENA)?)?;
        Ok(())
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        let athena = set.resolve_mut(ids::ATHENA)?;
        let loadout_id = active_loadout(athena)?;
        let icon = self.homebase_banner_icon_id.clone();
        let color = self.homebase_banner_color_id.clone();

        let attrs = athena.attributes_mut();
        attrs.banner_icon = Some(icon.clone());
        attrs.banner_color = Some(color.clone());
        ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified("banner_icon", &icon));
        ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified("banner_color", &color));

        if let Some(loadout) = athena.items.get_mut(&loadout_id) {
            loadout.attributes.banner_icon_template = Some(icon.clone());
            loadout.attributes.banner_color_template = Some(color.clone());
            ctx.log.push(
                ids::ATHENA,
                ChangeRecord::attr_changed(loadout_id.as_str(), "banner_icon_template", icon),
            );
            ctx.log.push(
                ids::ATHENA,
                ChangeRecord::attr_changed(loadout_id.as_str(), "banner_color_template", color),
            );
        }
        Ok(())
    }
}

/// Style change requested alongside an equip.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VariantUpdate {
    pub channel: String,
    pub active: String,
}

/// How a locker slot stores its selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotShape {
    /// Six emote slots addressed by index.
    Dance,
    /// Eight wrap slots; index `-1` writes all of them.
    ItemWrap,
    /// One item, mirrored into `favorite_<slot>`.
    Single,
}

impl SlotShape {
    fn of(slot_name: &str) -> Option<Self> {
        match slot_name {
            "Dance" => Some(Self::Dance),
            "ItemWrap" => Some(Self::ItemWrap),
            "Character" | "Backpack" | "Pickaxe" | "Glider" | "SkyDiveContrail" | "MusicPack"
            | "LoadingScreen" => Some(Self::Single),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipCustomization {
    pub slot_name: String,
    #[serde(default)]
    pub item_to_slot: String,
    #[serde(default)]
    pub index_within_slot: Option<i64>,
    #[serde(default)]
    pub variant_updates: Vec<VariantUpdate>,
}

impl EquipCustomization {
    fn shape(&self) -> Result<SlotShape, McpError> {
        SlotShape::of(&self.slot_name).ok_or_else(|| {
            McpError::invalid(
                ParameterCheck::Value,
                format!("Invalid slot name {}", self.slot_name),
                vec![self.slot_name.clone()],
            )
        })
    }

    /// Template stored in the loadout for the requested item.
    fn template(&self, athena: &Profile) -> Result<String, McpError> {
        if self.item_to_slot.is_empty() {
            return Ok(String::new());
        }
        let template = match athena.items.get(&self.item_to_slot) {
            Some(item) => item.template_id.clone(),
            None if RANDOM_COSMETICS.contains(&self.item_to_slot.as_str()) => self.item_to_slot.clone(),
            None => {
                return Err(McpError::invalid(
                    ParameterCheck::InvalidId,
                    format!("Item (id: '{}') not found", self.item_to_slot),
                    vec![self.item_to_slot.clone()],
                ));
            }
        };
        if !template.starts_with(&format!("Athena{}:", self.slot_name)) {
            let category = template.split(':').next().unwrap_or_default().to_owned();
            return Err(McpError::invalid(
                ParameterCheck::InvalidId,
                format!("Cannot slot item of type {category} in slot of category {}", self.slot_name),
                vec![category, self.slot_name.clone()],
            ));
        }
        Ok(template)
    }

    fn slot_index(&self, shape: SlotShape) -> Result<Option<usize>, McpError> {
        let width = match shape {
            SlotShape::Single => return Ok(None),
            SlotShape::Dance => DANCE_SLOTS,
            SlotShape::ItemWrap => WRAP_SLOTS,
        };
        let Some(index) = self.index_within_slot else {
            return Err(McpError::invalid(
                ParameterCheck::Value,
                format!("indexWithinSlot is required for {} slot", self.slot_name),
                vec!["indexWithinSlot".to_owned()],
            ));
        };
        if shape == SlotShape::ItemWrap && index == -1 {
            return Ok(None);
        }
        usize::try_from(index)
            .ok()
            .filter(|&index| index < width)
            .map(Some)
            .ok_or_else(|| {
                McpError::invalid(
                    ParameterCheck::Value,
                    format!("indexWithinSlot out of range for {} slot", self.slot_name),
                    vec!["indexWithinSlot".to_owned()],
                )
            })
    }

    fn apply_variants(&self, athena: &mut Profile, ctx: &mut OperationContext<'_>) {
        if self.variant_updates.is_empty() {
            return;
        }
        let Some(item) = athena.items.get_mut(&self.item_to_slot) else {
            return;
        };
        let variants = item.attributes.variants.get_or_insert_with(Vec::new);
        for update in &self.variant_updates {
            match variants.iter_mut().find(|variant| variant.channel == update.channel) {
                Some(variant) => variant.active = update.active.clone(),
                None => variants.push(Variant {
                    channel: update.channel.clone(),
                    active: update.active.clone(),
                    owned: vec![update.active.clone()],
                }),
            }
        }
        ctx.log.push(
            ids::ATHENA,
            ChangeRecord::attr_changed(self.item_to_slot.as_str(), "variants", &*variants),
        );
    }
}

impl ProfileOperation for EquipCustomization {
    fn parse(body: &Value) -> Result<Self, McpError> {
        require(body, &["slotName"])?;
        let op: Self = decode(body)?;
        op.shape()?;
        Ok(op)
    }

    fn pre_validate(&self, set: &ProfileSet, _ctx: &OperationContext<'_>) -> Result<(), McpError> {
        let athena = set.resolve(ids::ATHENA)?;
        let shape = self.shape()?;
        self.template(athena)?;
        if matches!(self.slot_name.as_str(), "Pickaxe" | "Glider") && self.item_to_slot.is_empty() {
            return Err(McpError::invalid(
                ParameterCheck::InvalidId,
                format!("{} can not be empty.", self.slot_name),
                vec![self.slot_name.clone()],
            ));
        }
        self.slot_index(shape)?;
        active_loadout(athena)?;
        Ok(())
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        let athena = set.resolve_mut(ids::ATHENA)?;
        let shape = self.shape()?;
        let template = self.template(athena)?;
        let index = self.slot_index(shape)?;
        let loadout_id = active_loadout(athena)?;

        self.apply_variants(athena, ctx);

        let attrs = athena.attributes_mut();
        let slot_items = match shape {
            SlotShape::Dance | SlotShape::ItemWrap => {
                let (width, stat, favorites) = if shape == SlotShape::Dance {
                    (DANCE_SLOTS, "favorite_dance", &mut attrs.favorite_dance)
                } else {
                    (WRAP_SLOTS, "favorite_itemwraps", &mut attrs.favorite_itemwraps)
                };
                let favorites = favorites.get_or_insert_with(Vec::new);
                favorites.resize(width, String::new());
                match index {
                    Some(index) => favorites[index] = self.item_to_slot.clone(),
                    None => favorites.fill(self.item_to_slot.clone()),
                }
                ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified(stat, &*favorites));
                SlotWrite::Indexed { width, index, template }
            }
            SlotShape::Single => {
                let stat = format!("favorite_{}", self.slot_name.to_ascii_lowercase());
                attrs.set_extra_stat(stat.clone(), Value::String(self.item_to_slot.clone()));
                ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified(stat, &self.item_to_slot));
                SlotWrite::Replace(if template.is_empty() { Vec::new() } else { vec![template] })
            }
        };

        let Some(loadout) = athena.items.get_mut(&loadout_id) else {
            return Err(McpError::ItemNotFound { item_id: loadout_id });
        };
        let data = loadout
            .attributes
            .locker_slots_data
            .get_or_insert_with(LockerSlotsData::default);
        let slot = data.slots.entry(self.slot_name.clone()).or_default();
        match slot_items {
            SlotWrite::Indexed { width, index, template } => {
                slot.items.resize(width.max(slot.items.len()), String::new());
                match index {
                    Some(index) => slot.items[index] = template,
                    None => slot.items[..width].fill(template),
                }
            }
            SlotWrite::Replace(items) => slot.items = items,
        }
        ctx.log.push(
            ids::ATHENA,
            ChangeRecord::attr_changed(loadout_id.as_str(), "locker_slots_data", &*data),
        );
        Ok(())
    }
}

enum SlotWrite {
    Indexed {
        width: usize,
        index: Option<usize>,
        template: String,
    },
    Replace(Vec<String>),
}

/// Item id of the active loadout, which must exist in `athena`.
fn active_loadout(athena: &Profile) -> Result<String, McpError> {
    let loadout_id = athena
        .attributes()
        .active_loadout()
        .ok_or_else(|| McpError::ItemNotFound {
            item_id: "loadouts".to_owned(),
        })?;
    if !athena.items.contains_key(loadout_id) {
        return Err(McpError::ItemNotFound {
            item_id: loadout_id.to_owned(),
        });
    }
    Ok(loadout_id.to_owned())
}
