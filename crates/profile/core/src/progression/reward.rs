//! Reward classification and application.
use crate::change::{ChangeLog, ChangeRecord};
use crate::env::Env;
use crate::error::McpError;
use crate::profile::{CURRENCY_PREFIX, Item, ItemAttributes, LootEntry, ProfileSet, StatAttributes, ids};
use crate::wallet;

/// Additive XP boost stats on `athena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoostStat {
    SeasonMatch,
    SeasonFriendMatch,
    NextSeason,
}

impl BoostStat {
    pub const fn stat_name(self) -> &'static str {
        match self {
            Self::SeasonMatch => "season_match_boost",
            Self::SeasonFriendMatch => "season_friend_match_boost",
            Self::NextSeason => "next_season_boost",
        }
    }

    fn slot(self, attrs: &mut StatAttributes) -> &mut Option<i64> {
        match self {
            Self::SeasonMatch => &mut attrs.season_match_boost,
            Self::SeasonFriendMatch => &mut attrs.season_friend_match_boost,
            Self::NextSeason => &mut attrs.next_season_boost,
        }
    }
}

/// What a reward template does when granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardKind {
    Boost(BoostStat),
    /// Account XP paid straight into `athena`.
    SeasonXp,
    Currency,
    Banner,
    Cosmetic,
    /// Style unlocks; not tracked as items.
    VariantToken,
    Unknown,
}

impl RewardKind {
    pub fn classify(template_id: &str) -> Self {
        let lower = template_id.to_ascii_lowercase();
        match lower.as_str() {
            "token:athenaseasonxpboost" | "season_match_boost" => Self::Boost(BoostStat::SeasonMatch),
            "token:athenaseasonfriendxpboost" | "season_friend_match_boost" => {
                Self::Boost(BoostStat::SeasonFriendMatch)
            }
            "token:athenanextseasonxpboost" | "next_season_boost" => Self::Boost(BoostStat::NextSeason),
            "accountresource:athenaseasonalxp" => Self::SeasonXp,
            other if other.starts_with(CURRENCY_PREFIX) => Self::Currency,
            other if other.starts_with("homebasebanner") => Self::Banner,
            other if other.starts_with("cosmeticvarianttoken:") => Self::VariantToken,
            other if other.starts_with("athena") => Self::Cosmetic,
            _ => Self::Unknown,
        }
    }
}

/// A reward entry with its classification resolved up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reward {
    pub template_id: String,
    pub quantity: i64,
    pub kind: RewardKind,
}

impl Reward {
    pub fn new(template_id: impl Into<String>, quantity: i64) -> Self {
        let template_id = template_id.into();
        Self {
            kind: RewardKind::classify(&template_id),
            template_id,
            quantity,
        }
    }
}

/// Profiles that receive inventory rewards and currency/banner rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrantTargets<'a> {
    pub inventory: &'a str,
    pub currency: &'a str,
}

impl<'a> GrantTargets<'a> {
    pub const fn new(currency: &'a str) -> Self {
        Self {
            inventory: ids::ATHENA,
            currency,
        }
    }
}

impl Default for GrantTargets<'_> {
    fn default() -> Self {
        Self::new(ids::COMMON_CORE)
    }
}

/// Applies one reward, returning its gift-box loot entry when it granted something.
pub fn apply_reward(
    set: &mut ProfileSet,
    targets: GrantTargets<'_>,
    reward: &Reward,
    env: &Env<'_>,
    log: &mut ChangeLog,
) -> Result<Option<LootEntry>, McpError> {
    match reward.kind {
        RewardKind::Boost(stat) => {
            let attrs = set.resolve_mut(targets.inventory)?.attributes_mut();
            let slot = stat.slot(attrs);
            let value = slot.unwrap_or(0) + reward.quantity;
            *slot = Some(value);
            log.push(targets.inventory, ChangeRecord::stat_modified(stat.stat_name(), value));
        }
        RewardKind::SeasonXp => {
            let attrs = set.resolve_mut(targets.inventory)?.attributes_mut();
            let value = attrs.xp() + reward.quantity;
            attrs.xp = Some(value);
            log.push(targets.inventory, ChangeRecord::stat_modified("xp", value));
        }
        RewardKind::Currency => {
            let profile = set.resolve_mut(targets.currency)?;
            let change = wallet::credit(profile, reward.quantity, || env.next_id(), &env.config.default_mtx_platform);
            log.push(targets.currency, change);
        }
        RewardKind::Banner => {
            grant_or_mark_unseen(set, targets.currency, reward, ItemAttributes::unseen(), 1, env, log)?;
        }
        RewardKind::Cosmetic => {
            grant_or_mark_unseen(
                set,
                targets.inventory,
                reward,
                ItemAttributes::cosmetic(),
                reward.quantity,
                env,
                log,
            )?;
        }
        RewardKind::VariantToken => {
            tracing::debug!(template_id = %reward.template_id, "variant token reward skipped");
            return Ok(None);
        }
        RewardKind::Unknown => {
            tracing::warn!(template_id = %reward.template_id, "unrecognized reward category skipped");
            return Ok(None);
        }
    }

    Ok(Some(LootEntry::new(
        reward.template_id.clone(),
        reward.template_id.clone(),
        reward.quantity,
    )))
}

/// Adds a gift-box container to `profile_id` and returns its item id.
pub fn drop_gift_box(
    set: &mut ProfileSet,
    profile_id: &str,
    template_id: &str,
    attributes: ItemAttributes,
    env: &Env<'_>,
    log: &mut ChangeLog,
) -> Result<String, McpError> {
    let profile = set.resolve_mut(profile_id)?;
    let item_id = env.next_id();
    let item = Item::new(template_id, attributes, 1);
    profile.items.insert(item_id.clone(), item.clone());
    log.push(profile_id, ChangeRecord::item_added(item_id.clone(), item));
    Ok(item_id)
}

/// Resets `item_seen` on every owned copy, or inserts a fresh item.
fn grant_or_mark_unseen(
    set: &mut ProfileSet,
    profile_id: &str,
    reward: &Reward,
    attributes: ItemAttributes,
    quantity: i64,
    env: &Env<'_>,
    log: &mut ChangeLog,
) -> Result<(), McpError> {
    let profile = set.resolve_mut(profile_id)?;
    let mut owned = false;
    for (item_id, item) in profile
        .items
        .iter_mut()
        .filter(|(_, item)| item.has_template(&reward.template_id))
    {
        owned = true;
        item.attributes.item_seen = Some(false);
        log.push(profile_id, ChangeRecord::attr_changed(item_id.as_str(), "item_seen", false));
    }

    if !owned {
        let item_id = env.next_id();
        let item = Item::new(reward.template_id.clone(), attributes, quantity);
        profile.items.insert(item_id.clone(), item.clone());
        log.push(profile_id, ChangeRecord::item_added(item_id, item));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_by_prefix() {
        assert_eq!(
            RewardKind::classify("Token:AthenaSeasonXpBoost"),
            RewardKind::Boost(BoostStat::SeasonMatch)
        );
        assert_eq!(RewardKind::classify("Currency:MtxGiveaway"), RewardKind::Currency);
        assert_eq!(RewardKind::classify("HomebaseBannerIcon:brseason01"), RewardKind::Banner);
        assert_eq!(RewardKind::classify("AthenaDance:eid_floss"), RewardKind::Cosmetic);
        assert_eq!(
            RewardKind::classify("CosmeticVariantToken:vtid_001"),
            RewardKind::VariantToken
        );
        assert_eq!(RewardKind::classify("AccountResource:AthenaSeasonalXP"), RewardKind::SeasonXp);
        assert_eq!(RewardKind::classify("Quest:daily_elim"), RewardKind::Unknown);
    }
}
