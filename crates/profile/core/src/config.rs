/// Tunables of the mutation engine.
///
/// Loaded from TOML by `profile-content`; the defaults match the live
/// protocol and are what the tests run against.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Battle-pass season whose offers are purchasable.
    pub season: u32,
    /// Account level and battle-pass tier ceiling.
    pub max_level: i64,
    /// Battle-pass XP converted into one tier.
    pub book_xp_per_level: i64,
    /// Tiers granted on top of the pass by the bundle offer.
    pub bundle_bonus_tiers: i64,
    pub max_gift_recipients: usize,
    pub max_gift_message_len: usize,
    /// Gift wrap templates a sender may choose from.
    pub gift_wraps: Vec<String>,
    /// Wallet platform assumed when a profile does not declare one.
    pub default_mtx_platform: String,
    /// First client build that compares against `commandRevision`.
    pub command_revision_build: f64,
    /// Builds below this keep banners in `profile0`.
    pub legacy_banner_build: f64,
}

impl EngineConfig {
    pub fn is_valid_gift_wrap(&self, template_id: &str) -> bool {
        self.gift_wraps.iter().any(|wrap| wrap == template_id)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            season: 8,
            max_level: 100,
            book_xp_per_level: 10,
            bundle_bonus_tiers: 25,
            max_gift_recipients: 5,
            max_gift_message_len: 100,
            gift_wraps: vec![
                "GiftBox:gb_default".to_owned(),
                "GiftBox:gb_giftwrap1".to_owned(),
                "GiftBox:gb_giftwrap2".to_owned(),
                "GiftBox:gb_giftwrap3".to_owned(),
            ],
            default_mtx_platform: "EpicPC".to_owned(),
            command_revision_build: 12.20,
            legacy_banner_build: 3.5,
        }
    }
}
