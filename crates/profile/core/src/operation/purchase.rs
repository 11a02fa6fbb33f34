//! `PurchaseCatalogEntry`: battle-pass products and storefront items.
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{CatalogEntry, is_storefront_purchase};
use crate::change::ChangeRecord;
use crate::config::EngineConfig;
use crate::error::{McpError, ParameterCheck};
use crate::profile::{Item, ItemAttributes, LootEntry, ProfileSet, PurchaseEntry, PurchaseHistory, ids};
use crate::progression::{GrantTargets, LEVEL_UP_GIFT_BOX, PURCHASE_GIFT_BOX, PassOffer, replay_tiers};
use crate::response::{LootResult, Notification};
use crate::wallet;

use super::body::{decode, require};
use super::{OperationContext, ProfileOperation};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCatalogEntry {
    pub offer_id: String,
    #[serde(default)]
    pub purchase_quantity: i64,
}

/// What a resolved offer turns into.
#[derive(Clone, Debug, PartialEq)]
enum Plan {
    /// `tiers` counts the tiers actually granted by a tier offer, after the cap.
    BattlePass { offer: PassOffer, tiers: i64, total_price: i64 },
    Storefront { entry: CatalogEntry },
    /// Offer exists but belongs to neither path; the purchase records nothing.
    Unsupported,
}

impl PurchaseCatalogEntry {
    fn plan(&self, set: &ProfileSet, ctx: &OperationContext<'_>) -> Result<Plan, McpError> {
        let env = ctx.env;
        let catalog = env.catalog.catalog(env.now());
        let (storefront, entry) = catalog.resolve_offer(&self.offer_id)?;

        if ctx.request.build.season == env.config.season
            && let Some(offer) = env.progression.pass_offer(&self.offer_id)
        {
            let tiers = match offer {
                PassOffer::Tier => {
                    let start = set.resolve(ids::ATHENA)?.attributes().book_level();
                    (start.saturating_add(self.purchase_quantity).min(env.config.max_level) - start).max(0)
                }
                _ if self.purchase_quantity > 1 => return Err(quantity_out_of_range(1)),
                _ => 1,
            };
            let total_price = entry
                .mtx_price()
                .unwrap_or(0)
                .checked_mul(tiers)
                .ok_or_else(|| quantity_out_of_range(env.config.max_level))?;
            return Ok(Plan::BattlePass {
                offer,
                tiers,
                total_price,
            });
        }
        if is_storefront_purchase(storefront) {
            return Ok(Plan::Storefront {
                entry: entry.clone(),
            });
        }
        tracing::debug!(offer_id = %self.offer_id, storefront, "offer has no purchase path");
        Ok(Plan::Unsupported)
    }

    fn purchase_pass(
        &self,
        offer: PassOffer,
        tiers: i64,
        set: &mut ProfileSet,
        ctx: &mut OperationContext<'_>,
    ) -> Result<(), McpError> {
        let env = ctx.env;
        let purchasing = ctx.request.profile_id.as_str();
        let targets = GrantTargets::new(purchasing);
        let max = env.config.max_level;

        if offer == PassOffer::Tier {
            let start = set.resolve(ids::ATHENA)?.attributes().book_level();
            let end = start + tiers;
            set.resolve_mut(ids::ATHENA)?.attributes_mut().book_level = Some(end);
            ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified("book_level", end));
            replay_tiers(set, targets, start + 1..=end, LEVEL_UP_GIFT_BOX, &env, &mut ctx.log)?;
            return Ok(());
        }

        let attrs = set.resolve_mut(ids::ATHENA)?.attributes_mut();
        attrs.book_purchased = Some(true);
        let mut book_level = attrs.book_level();
        if offer == PassOffer::Bundle {
            book_level = (book_level + env.config.bundle_bonus_tiers).min(max);
            attrs.book_level = Some(book_level);
        }
        ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified("book_purchased", true));
        ctx.log.push(ids::ATHENA, ChangeRecord::stat_modified("book_level", book_level));

        let season = env.config.season;
        let token_id = format!("Token:Athena_S{season}_NoBattleBundleOption_Token");
        let profile = set.resolve_mut(purchasing)?;
        if !profile.items.contains_key(&token_id) {
            let token = Item::new(
                format!("Token:athena_s{season}_nobattlebundleoption_token"),
                ItemAttributes {
                    max_level_bonus: Some(0),
                    level: Some(1),
                    item_seen: Some(true),
                    xp: Some(0),
                    favorite: Some(false),
                    ..ItemAttributes::default()
                },
                1,
            );
            profile.items.insert(token_id.clone(), token.clone());
            ctx.log.push(purchasing, ChangeRecord::item_added(token_id, token));
        }

        replay_tiers(set, targets, 1..=book_level, PURCHASE_GIFT_BOX, &env, &mut ctx.log)?;
        Ok(())
    }

    fn purchase_items(
        &self,
        entry: &CatalogEntry,
        set: &mut ProfileSet,
        ctx: &mut OperationContext<'_>,
    ) -> Result<(), McpError> {
        let env = ctx.env;
        let purchasing = ctx.request.profile_id.as_str();
        let price = entry.mtx_price().unwrap_or(0);

        if price > 0 {
            let change = wallet::debit(set.resolve_mut(purchasing)?, price, ctx.default_platform())?;
            ctx.log.push(purchasing, change);
        }

        let athena = set.resolve_mut(ids::ATHENA)?;
        let mut loot = Vec::with_capacity(entry.item_grants.len());
        for grant in &entry.item_grants {
            let item_id = env.next_id();
            let item = Item::new(grant.template_id.clone(), ItemAttributes::granted(), 1);
            athena.items.insert(item_id.clone(), item.clone());
            ctx.log.push(ids::ATHENA, ChangeRecord::item_added(item_id.clone(), item));
            loot.push(LootEntry::new(grant.template_id.clone(), item_id, 1).in_profile(ids::ATHENA));
        }

        ctx.notifications.push(Notification::CatalogPurchase {
            primary: true,
            loot_result: LootResult { items: loot.clone() },
        });

        let attrs = set.resolve_mut(purchasing)?.attributes_mut();
        let history = attrs.mtx_purchase_history.get_or_insert_with(PurchaseHistory::default);
        history
            .purchases
            .push(PurchaseEntry::new(env.next_id(), env.now(), loot, price));
        ctx.log.push(purchasing, ChangeRecord::stat_modified("mtx_purchase_history", &*history));
        tracing::debug!(offer_id = %self.offer_id, price, "storefront purchase recorded");
        Ok(())
    }
}

fn quantity_out_of_range(max: i64) -> McpError {
    McpError::invalid(
        ParameterCheck::QuantityRange,
        format!("Validation Failed. 'purchaseQuantity' must be between 1 and {max}."),
        vec!["purchaseQuantity".to_owned(), max.to_string()],
    )
}

impl ProfileOperation for PurchaseCatalogEntry {
    fn parse(body: &Value) -> Result<Self, McpError> {
        require(body, &["offerId"])?;
        let op: Self = decode(body)?;
        if op.purchase_quantity < 1 {
            return Err(McpError::invalid(
                ParameterCheck::Value,
                "Validation Failed. 'purchaseQuantity' is less than 1.",
                vec!["purchaseQuantity".to_owned()],
            ));
        }
        Ok(op)
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), McpError> {
        if self.purchase_quantity > config.max_level {
            return Err(quantity_out_of_range(config.max_level));
        }
        Ok(())
    }

    fn pre_validate(&self, set: &ProfileSet, ctx: &OperationContext<'_>) -> Result<(), McpError> {
        let purchasing = set.resolve(ctx.profile_id())?;
        let athena = set.resolve(ids::ATHENA)?;
        match self.plan(set, ctx)? {
            Plan::BattlePass { total_price, .. } if total_price > 0 => {
                wallet::ensure_funds(purchasing, total_price, ctx.default_platform())
            }
            Plan::Storefront { entry } => {
                entry.ensure_not_owned(athena)?;
                match entry.mtx_price() {
                    Some(price) if price > 0 => wallet::ensure_funds(purchasing, price, ctx.default_platform()),
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        match self.plan(set, ctx)? {
            Plan::BattlePass {
                offer: PassOffer::Tier,
                tiers: 0,
                ..
            } => Ok(()),
            Plan::BattlePass {
                offer,
                tiers,
                total_price,
            } => {
                if total_price > 0 {
                    let purchasing = ctx.request.profile_id.as_str();
                    let change = wallet::debit(set.resolve_mut(purchasing)?, total_price, ctx.default_platform())?;
                    ctx.log.push(purchasing, change);
                }
                self.purchase_pass(offer, tiers, set, ctx)
            }
            Plan::Storefront { entry } => self.purchase_items(&entry, set, ctx),
            Plan::Unsupported => Ok(()),
        }
    }
}
