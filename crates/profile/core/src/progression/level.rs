//! Level-up and battle-pass tier loops.
use std::ops::RangeInclusive;

use crate::change::{ChangeLog, ChangeRecord};
use crate::env::Env;
use crate::error::McpError;
use crate::profile::{ItemAttributes, LootEntry, ProfileSet};
use crate::wallet;

use super::LEVEL_UP_GIFT_BOX;
use super::reward::{GrantTargets, apply_reward, drop_gift_box};

/// Summary of one progression pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelOutcome {
    pub levels_gained: i64,
    pub tiers_gained: i64,
    pub loot: Vec<LootEntry>,
}

/// Converts accumulated account XP into levels.
///
/// Each level pays either battle-pass XP or, once the pass is maxed, its
/// currency reward. Reaching the level cap zeroes the remaining XP.
pub fn level_up(
    set: &mut ProfileSet,
    targets: GrantTargets<'_>,
    env: &Env<'_>,
    log: &mut ChangeLog,
) -> Result<i64, McpError> {
    let max = env.config.max_level;
    let attrs = set.resolve(targets.inventory)?.attributes();
    let (start_level, start_xp, start_book_xp) = (attrs.level(), attrs.xp(), attrs.book_xp());
    let book_level = attrs.book_level();

    let (mut level, mut xp, mut book_xp) = (start_level, start_xp, start_book_xp);
    let mut currency = 0;
    while level < max {
        let Some(req) = env.progression.xp.requirement(level) else {
            break;
        };
        if xp < req.xp_required {
            break;
        }
        xp -= req.xp_required;
        level += 1;
        if book_level >= max {
            currency += req.xp_reward;
        } else {
            book_xp += req.book_xp_reward;
        }
    }
    if level >= max {
        xp = 0;
    }

    let attrs = set.resolve_mut(targets.inventory)?.attributes_mut();
    if level != start_level {
        attrs.level = Some(level);
        log.push(targets.inventory, ChangeRecord::stat_modified("level", level));
    }
    if xp != start_xp {
        attrs.xp = Some(xp);
        log.push(targets.inventory, ChangeRecord::stat_modified("xp", xp));
    }
    if book_xp != start_book_xp {
        attrs.book_xp = Some(book_xp);
        log.push(targets.inventory, ChangeRecord::stat_modified("book_xp", book_xp));
    }

    if currency > 0 {
        let profile = set.resolve_mut(targets.currency)?;
        let change = wallet::credit(profile, currency, || env.next_id(), &env.config.default_mtx_platform);
        log.push(targets.currency, change);
    }

    let gained = level - start_level;
    if gained > 0 {
        tracing::debug!(from = start_level, to = level, "account levelled up");
    }
    Ok(gained)
}

/// Converts battle-pass XP into tiers and claims every tier crossed.
pub fn claim_book_levels(
    set: &mut ProfileSet,
    targets: GrantTargets<'_>,
    env: &Env<'_>,
    log: &mut ChangeLog,
) -> Result<(i64, Vec<LootEntry>), McpError> {
    let max = env.config.max_level;
    let per_level = env.config.book_xp_per_level;
    let attrs = set.resolve(targets.inventory)?.attributes();
    let (book_xp, book_level) = (attrs.book_xp(), attrs.book_level());

    if per_level <= 0 || book_xp < per_level || book_level >= max {
        return Ok((0, Vec::new()));
    }

    let new_level = (book_level + book_xp / per_level).min(max);
    let remainder = book_xp % per_level;

    let attrs = set.resolve_mut(targets.inventory)?.attributes_mut();
    attrs.book_xp = Some(remainder);
    attrs.book_level = Some(new_level);
    log.push(targets.inventory, ChangeRecord::stat_modified("book_xp", remainder));
    log.push(targets.inventory, ChangeRecord::stat_modified("book_level", new_level));

    let loot = replay_tiers(set, targets, book_level + 1..=new_level, LEVEL_UP_GIFT_BOX, env, log)?;
    Ok((new_level - book_level, loot))
}

/// Applies the rewards of each tier in order and drops one gift box listing them.
///
/// Paid rewards only apply while `book_purchased` is set. Tiers beyond the
/// season table are skipped.
pub fn replay_tiers(
    set: &mut ProfileSet,
    targets: GrantTargets<'_>,
    tiers: RangeInclusive<i64>,
    gift_box: &str,
    env: &Env<'_>,
    log: &mut ChangeLog,
) -> Result<Vec<LootEntry>, McpError> {
    let mut loot = Vec::new();
    for tier in tiers {
        let Some(rewards) = env.progression.tier(tier) else {
            tracing::debug!(tier, "no rewards defined for tier");
            continue;
        };
        for reward in &rewards.free {
            loot.extend(apply_reward(set, targets, reward, env, log)?);
        }
        if set.resolve(targets.inventory)?.attributes().book_purchased() {
            for reward in &rewards.paid {
                loot.extend(apply_reward(set, targets, reward, env, log)?);
            }
        }
    }

    if !loot.is_empty() {
        drop_gift_box(
            set,
            targets.currency,
            gift_box,
            ItemAttributes::gift_box("", loot.clone()),
            env,
            log,
        )?;
    }
    Ok(loot)
}

/// Runs the level loop followed by the tier loop.
pub fn apply_xp(
    set: &mut ProfileSet,
    targets: GrantTargets<'_>,
    env: &Env<'_>,
    log: &mut ChangeLog,
) -> Result<LevelOutcome, McpError> {
    let levels_gained = level_up(set, targets, env, log)?;
    let (tiers_gained, loot) = claim_book_levels(set, targets, env, log)?;
    Ok(LevelOutcome {
        levels_gained,
        tiers_gained,
        loot,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::config::EngineConfig;
    use crate::env::{FixedClock, SequentialIds};
    use crate::profile::{Item, Profile, ids};
    use crate::progression::{LevelRequirement, Progression, SeasonRewards, XpTable};

    struct Fixture {
        catalog: StaticCatalog,
        progression: Progression,
        config: EngineConfig,
        clock: FixedClock,
        ids: SequentialIds,
    }

    impl Fixture {
        fn new() -> Self {
            let xp = XpTable::new((1..=100).map(|level| LevelRequirement {
                level,
                xp_required: 100,
                book_xp_reward: 5,
                xp_reward: 50,
            }));
            let tier = |template: &str, quantity: i64| {
                let mut rewards = BTreeMap::new();
                rewards.insert(template.to_owned(), quantity);
                rewards
            };
            let season = SeasonRewards {
                free_rewards: (1..=100)
                    .map(|t| tier(&format!("AthenaDance:eid_tier{t}"), 1))
                    .collect(),
                paid_rewards: (1..=100).map(|_| tier("Currency:MtxGiveaway", 100)).collect(),
                ..SeasonRewards::default()
            };
            Self {
                catalog: StaticCatalog::default(),
                progression: Progression::new(xp, season),
                config: EngineConfig::default(),
                clock: FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()),
                ids: SequentialIds::new("id"),
            }
        }

        fn env(&self) -> Env<'_> {
            Env::new(&self.catalog, &self.progression, &self.config, &self.clock, &self.ids)
        }
    }

    fn account(level: i64, xp: i64, book_level: i64) -> ProfileSet {
        let mut athena = Profile::new(ids::ATHENA);
        let attrs = athena.attributes_mut();
        attrs.level = Some(level);
        attrs.xp = Some(xp);
        attrs.book_level = Some(book_level);
        attrs.book_xp = Some(0);

        let mut core = Profile::new(ids::COMMON_CORE);
        core.items.insert(
            "wallet".into(),
            Item::new("Currency:MtxPurchased", ItemAttributes::currency("Shared"), 0),
        );

        let mut set = ProfileSet::new("acc");
        set.insert(athena);
        set.insert(core);
        set
    }

    #[test]
    fn levels_clamp_at_cap_with_zero_xp() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let mut set = account(98, 1_000_000, 0);
        let mut log = ChangeLog::new();

        let gained = level_up(&mut set, GrantTargets::default(), &env, &mut log).unwrap();
        assert_eq!(gained, 2);

        let attrs = set.resolve(ids::ATHENA).unwrap().attributes();
        assert_eq!(attrs.level(), 100);
        assert_eq!(attrs.xp(), 0);
        assert_eq!(attrs.book_xp(), 10);
    }

    #[test]
    fn maxed_pass_pays_currency_instead_of_book_xp() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let mut set = account(10, 250, 100);
        let mut log = ChangeLog::new();

        level_up(&mut set, GrantTargets::default(), &env, &mut log).unwrap();

        let core = set.resolve(ids::COMMON_CORE).unwrap();
        assert_eq!(core.items["wallet"].quantity, 100);
        assert_eq!(set.resolve(ids::ATHENA).unwrap().attributes().xp(), 50);
        assert_eq!(set.resolve(ids::ATHENA).unwrap().attributes().book_xp(), 0);
    }

    #[test]
    fn book_xp_converts_to_tiers_and_claims_rewards() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let mut set = account(1, 0, 3);
        set.resolve_mut(ids::ATHENA).unwrap().attributes_mut().book_xp = Some(25);
        let mut log = ChangeLog::new();

        let (tiers, loot) = claim_book_levels(&mut set, GrantTargets::default(), &env, &mut log).unwrap();
        assert_eq!(tiers, 2);
        assert_eq!(
            loot.iter().map(|entry| entry.item_type.as_str()).collect::<Vec<_>>(),
            vec!["AthenaDance:eid_tier4", "AthenaDance:eid_tier5"]
        );

        let athena = set.resolve(ids::ATHENA).unwrap();
        assert_eq!(athena.attributes().book_level(), 5);
        assert_eq!(athena.attributes().book_xp(), 5);
        assert!(athena.owns_template("AthenaDance:eid_tier4"));

        // paid track is locked, so the wallet is untouched and one gift box is dropped
        let core = set.resolve(ids::COMMON_CORE).unwrap();
        assert_eq!(core.items["wallet"].quantity, 0);
        assert_eq!(
            core.items.values().filter(|item| item.template_id == LEVEL_UP_GIFT_BOX).count(),
            1
        );
    }

    #[test]
    fn owned_cosmetic_is_not_duplicated() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let mut set = account(1, 0, 0);
        set.resolve_mut(ids::ATHENA).unwrap().items.insert(
            "owned".into(),
            Item::new("AthenaDance:eid_tier1", ItemAttributes { item_seen: Some(true), ..ItemAttributes::cosmetic() }, 1),
        );
        let mut log = ChangeLog::new();

        replay_tiers(&mut set, GrantTargets::default(), 1..=1, LEVEL_UP_GIFT_BOX, &env, &mut log).unwrap();

        let athena = set.resolve(ids::ATHENA).unwrap();
        assert_eq!(athena.items.len(), 1);
        assert_eq!(athena.items["owned"].attributes.item_seen, Some(false));
        assert_eq!(
            log.changes(ids::ATHENA),
            &[ChangeRecord::attr_changed("owned", "item_seen", false)]
        );
    }

    #[test]
    fn paid_track_applies_once_purchased() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let mut set = account(1, 0, 0);
        set.resolve_mut(ids::ATHENA).unwrap().attributes_mut().book_purchased = Some(true);
        let mut log = ChangeLog::new();

        let loot = replay_tiers(&mut set, GrantTargets::default(), 1..=3, LEVEL_UP_GIFT_BOX, &env, &mut log).unwrap();
        assert_eq!(loot.len(), 6);
        assert_eq!(set.resolve(ids::COMMON_CORE).unwrap().items["wallet"].quantity, 300);
    }
}
