//! `GiftCatalogEntry`: buy an offer once per recipient and deliver it wrapped.
//!
//! Every recipient is validated (friendship, existence, gift preference)
//! before the sender is charged, so a rejected recipient never leaves the
//! other recipients half-gifted.
use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::CatalogEntry;
use crate::change::{ChangeLog, ChangeRecord};
use crate::config::EngineConfig;
use crate::env::Env;
use crate::error::{McpError, ParameterCheck};
use crate::profile::{Item, ItemAttributes, LootEntry, ProfileSet, ids};
use crate::response::Notification;
use crate::wallet;

use super::body::{decode, require};
use super::{OperationContext, ProfileOperation};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCatalogEntry {
    pub offer_id: String,
    pub receiver_account_ids: Vec<String>,
    pub gift_wrap_template_id: String,
    #[serde(default)]
    pub personal_message: String,
}

impl GiftCatalogEntry {
    fn offer(&self, ctx: &OperationContext<'_>) -> Result<CatalogEntry, McpError> {
        let catalog = ctx.env.catalog.catalog(ctx.env.now());
        let (_, entry) = catalog.resolve_offer(&self.offer_id)?;
        Ok(entry.clone())
    }

    fn total_price(&self, entry: &CatalogEntry) -> i64 {
        let recipients = i64::try_from(self.receiver_account_ids.len()).unwrap_or(i64::MAX);
        entry.mtx_price().unwrap_or(0).saturating_mul(recipients)
    }

    /// Grants the offer into one recipient's set and drops the wrapped gift box.
    fn deliver(
        &self,
        entry: &CatalogEntry,
        sender: &str,
        recipient: &mut ProfileSet,
        env: &Env<'_>,
        log: &mut ChangeLog,
    ) -> Result<(), McpError> {
        let athena = recipient.resolve_mut(ids::ATHENA)?;
        let mut loot = Vec::with_capacity(entry.item_grants.len());
        for grant in &entry.item_grants {
            let item_id = env.next_id();
            let item = Item::new(grant.template_id.clone(), ItemAttributes::granted(), 1);
            athena.items.insert(item_id.clone(), item.clone());
            log.push(ids::ATHENA, ChangeRecord::item_added(item_id.clone(), item));
            loot.push(LootEntry::new(grant.template_id.clone(), item_id, 1).in_profile(ids::ATHENA));
        }

        let mut params = Map::new();
        params.insert("userMessage".to_owned(), Value::String(self.personal_message.clone()));
        let attributes = ItemAttributes {
            max_level_bonus: None,
            level: Some(1),
            params: Some(params),
            gifted_on: Some(env.now()),
            ..ItemAttributes::gift_box(sender, loot)
        };
        let core = recipient.resolve_mut(ids::COMMON_CORE)?;
        let gift_box_id = env.next_id();
        let gift_box = Item::new(self.gift_wrap_template_id.clone(), attributes, 1);
        core.items.insert(gift_box_id.clone(), gift_box.clone());
        log.push(ids::COMMON_CORE, ChangeRecord::item_added(gift_box_id, gift_box));
        Ok(())
    }
}

impl ProfileOperation for GiftCatalogEntry {
    fn parse(body: &Value) -> Result<Self, McpError> {
        require(body, &["offerId", "receiverAccountIds", "giftWrapTemplateId"])?;
        decode(body)
    }

    fn validate(&self, config: &EngineConfig) -> Result<(), McpError> {
        if self.personal_message.chars().count() > config.max_gift_message_len {
            return Err(McpError::invalid(
                ParameterCheck::StringLength,
                format!(
                    "The personalMessage you provided is longer than {} characters, please make sure your personal message is less than {} characters long and try again.",
                    config.max_gift_message_len, config.max_gift_message_len
                ),
                vec!["personalMessage".to_owned(), config.max_gift_message_len.to_string()],
            ));
        }
        if !config.is_valid_gift_wrap(&self.gift_wrap_template_id) {
            return Err(McpError::invalid(
                ParameterCheck::GiftBox,
                "The giftbox you provided is invalid, please provide a valid giftbox and try again.",
                Vec::new(),
            ));
        }
        let count = self.receiver_account_ids.len();
        if count < 1 || count > config.max_gift_recipients {
            return Err(McpError::invalid(
                ParameterCheck::QuantityRange,
                format!(
                    "There are {count} recipients, please make sure there are between 1 and {} recipients.",
                    config.max_gift_recipients
                ),
                vec!["1".to_owned(), config.max_gift_recipients.to_string()],
            ));
        }
        let distinct: BTreeSet<&str> = self.receiver_account_ids.iter().map(String::as_str).collect();
        if distinct.len() != count {
            return Err(McpError::invalid(
                ParameterCheck::Duplicate,
                "There are duplicate accountIds in receiverAccountIds, please remove the duplicates and try again.",
                Vec::new(),
            ));
        }
        Ok(())
    }

    fn pre_validate(&self, set: &ProfileSet, ctx: &OperationContext<'_>) -> Result<(), McpError> {
        let sender = ctx.account_id();
        for receiver in &self.receiver_account_ids {
            if receiver != sender && !ctx.peers.is_friend(receiver) {
                return Err(McpError::NotFriends {
                    sender: sender.to_owned(),
                    receiver: receiver.clone(),
                });
            }
        }

        let entry = self.offer(ctx)?;

        for receiver in &self.receiver_account_ids {
            let recipient = if receiver == sender {
                set
            } else {
                ctx.peers.account(receiver)?
            };
            recipient.resolve(ids::ATHENA)?;
            if !recipient.resolve(ids::COMMON_CORE)?.attributes().gifts_allowed() {
                return Err(McpError::GiftsDisabled {
                    receiver: receiver.clone(),
                });
            }
        }

        let total = self.total_price(&entry);
        if total > 0 {
            wallet::ensure_funds(set.resolve(ctx.profile_id())?, total, ctx.default_platform())?;
        }
        Ok(())
    }

    fn apply(&self, set: &mut ProfileSet, ctx: &mut OperationContext<'_>) -> Result<(), McpError> {
        let env = ctx.env;
        let entry = self.offer(ctx)?;
        let request = ctx.request;
        let sender = request.account_id.as_str();
        let purchasing = request.profile_id.as_str();

        let total = self.total_price(&entry);
        if total > 0 {
            let change = wallet::debit(set.resolve_mut(purchasing)?, total, ctx.default_platform())?;
            ctx.log.push(purchasing, change);
        }

        for receiver in &self.receiver_account_ids {
            if receiver == sender {
                self.deliver(&entry, sender, set, &env, &mut ctx.log)?;
            } else {
                let recipient = ctx.peers.account_mut(receiver)?;
                let log = ctx.peer_logs.entry(receiver.clone()).or_default();
                self.deliver(&entry, sender, recipient, &env, log)?;
            }

            ctx.deliver(
                receiver.clone(),
                Notification::GiftReceived {
                    payload: Map::new(),
                    timestamp: env.now(),
                },
            );
        }

        tracing::debug!(
            offer_id = %self.offer_id,
            recipients = self.receiver_account_ids.len(),
            total,
            "gift delivered"
        );
        Ok(())
    }

    fn peer_accounts(&self, caller: &str) -> Vec<String> {
        self.receiver_account_ids
            .iter()
            .filter(|receiver| receiver.as_str() != caller)
            .cloned()
            .collect()
    }
}
