//! Account level and battle-pass progression.
//!
//! Static tables ([`XpTable`], [`SeasonRewards`]) are classified once into a
//! [`Progression`]; the loops in [`level`] and the reward dispatch in
//! [`reward`] run against it.
pub mod level;
pub mod reward;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use level::{LevelOutcome, apply_xp, claim_book_levels, level_up, replay_tiers};
pub use reward::{BoostStat, GrantTargets, Reward, RewardKind, apply_reward, drop_gift_box};

/// Gift box dropped for tiers reached by playing.
pub const LEVEL_UP_GIFT_BOX: &str = "GiftBox:gb_battlepass";
/// Gift box dropped when the pass or bundle is bought.
pub const PURCHASE_GIFT_BOX: &str = "GiftBox:gb_battlepasspurchased";

/// XP needed to leave `level`, plus what leaving it pays out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRequirement {
    pub level: i64,
    pub xp_required: i64,
    #[serde(default)]
    pub book_xp_reward: i64,
    #[serde(default)]
    pub xp_reward: i64,
}

/// Level thresholds keyed by level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XpTable {
    levels: BTreeMap<i64, LevelRequirement>,
}

impl XpTable {
    pub fn new(requirements: impl IntoIterator<Item = LevelRequirement>) -> Self {
        Self {
            levels: requirements.into_iter().map(|req| (req.level, req)).collect(),
        }
    }

    pub fn requirement(&self, level: i64) -> Option<&LevelRequirement> {
        self.levels.get(&level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Raw battle-pass definition of one season.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRewards {
    #[serde(default)]
    pub battle_pass_offer_id: String,
    #[serde(default)]
    pub battle_bundle_offer_id: String,
    #[serde(default)]
    pub tier_offer_id: String,
    #[serde(default)]
    pub free_rewards: Vec<BTreeMap<String, i64>>,
    #[serde(default)]
    pub paid_rewards: Vec<BTreeMap<String, i64>>,
}

/// Which battle-pass product an offer id refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOffer {
    Pass,
    Bundle,
    Tier,
}

/// Classified rewards of one tier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TierRewards {
    pub free: Vec<Reward>,
    pub paid: Vec<Reward>,
}

/// Classified progression tables for the active season.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Progression {
    pub xp: XpTable,
    pub battle_pass_offer_id: String,
    pub battle_bundle_offer_id: String,
    pub tier_offer_id: String,
    tiers: Vec<TierRewards>,
}

impl Progression {
    pub fn new(xp: XpTable, season: SeasonRewards) -> Self {
        let classify = |tier: Option<&BTreeMap<String, i64>>| -> Vec<Reward> {
            tier.map(|rewards| {
                rewards
                    .iter()
                    .map(|(template, quantity)| Reward::new(template, *quantity))
                    .collect()
            })
            .unwrap_or_default()
        };

        let count = season.free_rewards.len().max(season.paid_rewards.len());
        let tiers = (0..count)
            .map(|index| TierRewards {
                free: classify(season.free_rewards.get(index)),
                paid: classify(season.paid_rewards.get(index)),
            })
            .collect();

        Self {
            xp,
            battle_pass_offer_id: season.battle_pass_offer_id,
            battle_bundle_offer_id: season.battle_bundle_offer_id,
            tier_offer_id: season.tier_offer_id,
            tiers,
        }
    }

    /// Rewards of a 1-based tier.
    pub fn tier(&self, tier: i64) -> Option<&TierRewards> {
        let index = usize::try_from(tier.checked_sub(1)?).ok()?;
        self.tiers.get(index)
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn pass_offer(&self, offer_id: &str) -> Option<PassOffer> {
        if offer_id.is_empty() {
            None
        } else if offer_id == self.battle_pass_offer_id {
            Some(PassOffer::Pass)
        } else if offer_id == self.battle_bundle_offer_id {
            Some(PassOffer::Bundle)
        } else if offer_id == self.tier_offer_id {
            Some(PassOffer::Tier)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_one_based_and_padded() {
        let mut free = BTreeMap::new();
        free.insert("Token:AthenaSeasonXpBoost".to_owned(), 10);
        let season = SeasonRewards {
            battle_pass_offer_id: "pass".into(),
            battle_bundle_offer_id: "bundle".into(),
            tier_offer_id: "tier".into(),
            free_rewards: vec![free],
            paid_rewards: vec![BTreeMap::new(), BTreeMap::new()],
        };
        let progression = Progression::new(XpTable::default(), season);

        assert_eq!(progression.tier_count(), 2);
        assert_eq!(progression.tier(1).unwrap().free.len(), 1);
        assert!(progression.tier(2).unwrap().free.is_empty());
        assert!(progression.tier(0).is_none());
        assert!(progression.tier(3).is_none());

        assert_eq!(progression.pass_offer("bundle"), Some(PassOffer::Bundle));
        assert_eq!(progression.pass_offer(""), None);
    }
}
