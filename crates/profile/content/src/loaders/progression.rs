//! XP table and battle-pass season loaders.

use std::path::Path;

use profile_core::{LevelRequirement, SeasonRewards, XpTable};

use crate::loaders::{LoadResult, read_file};

/// Loader for the level thresholds (a JSON array of level requirements).
pub struct XpTableLoader;

impl XpTableLoader {
    pub fn load(path: &Path) -> LoadResult<XpTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Levels must start at 1 and be contiguous; a gap would stall the level loop.
    pub fn parse(content: &str) -> LoadResult<XpTable> {
        let mut levels: Vec<LevelRequirement> = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse XP table JSON: {}", e))?;
        levels.sort_by_key(|req| req.level);

        for (expected, req) in (1..).zip(&levels) {
            if req.level != expected {
                anyhow::bail!("XP table skips from level {} to {}", expected - 1, req.level);
            }
            if req.xp_required <= 0 {
                anyhow::bail!("level {} requires non-positive XP", req.level);
            }
        }
        Ok(XpTable::new(levels))
    }
}

/// Loader for one season's battle-pass rewards and offer ids.
pub struct SeasonLoader;

impl SeasonLoader {
    pub fn load(path: &Path) -> LoadResult<SeasonRewards> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<SeasonRewards> {
        let season: SeasonRewards = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse season JSON: {}", e))?;

        if season.free_rewards.len() != season.paid_rewards.len() {
            tracing::warn!(
                free = season.free_rewards.len(),
                paid = season.paid_rewards.len(),
                "free and paid reward tracks differ in length"
            );
        }
        Ok(season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_table_sorts_levels() {
        let table = XpTableLoader::parse(
            r#"[{ "level": 2, "xpRequired": 200 }, { "level": 1, "xpRequired": 100, "bookXpReward": 5 }]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.requirement(1).unwrap().book_xp_reward, 5);
        assert_eq!(table.requirement(2).unwrap().xp_reward, 0);
    }

    #[test]
    fn xp_table_rejects_gaps() {
        let err = XpTableLoader::parse(r#"[{ "level": 1, "xpRequired": 100 }, { "level": 3, "xpRequired": 100 }]"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "XP table skips from level 1 to 3");
    }

    #[test]
    fn season_defaults_missing_tracks() {
        let season = SeasonLoader::parse(r#"{ "battlePassOfferId": "pass" }"#).unwrap();
        assert_eq!(season.battle_pass_offer_id, "pass");
        assert!(season.free_rewards.is_empty());
    }
}
