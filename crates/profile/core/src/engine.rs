//! Operation execution over an in-memory profile set.
//!
//! The engine never mutates its inputs: it clones the caller's set, runs the
//! operation against the clone and hands back the mutated profiles together
//! with the writes the caller has to persist. A failed operation therefore
//! leaves nothing behind, and revision counters only move for profiles whose
//! change list is non-empty.
use std::collections::BTreeMap;

use crate::change::{ChangeLog, ChangeRecord};
use crate::env::Env;
use crate::error::{McpError, ParameterCheck};
use crate::operation::{Delivery, OperationContext, Peers, PreparedOperation};
use crate::profile::{ItemAttributes, LootEntry, Profile, ProfileSet, ids};
use crate::progression::{GrantTargets, LevelOutcome, apply_xp, drop_gift_box};
use crate::response::McpResponse;
use crate::revision::{RevisionMode, RevisionSnapshot, RevisionTracker};
use crate::wallet;

/// Gift box dropped by administrative currency grants.
pub const MAKE_GOOD_GIFT_BOX: &str = "GiftBox:GB_MakeGood";
const ADMINISTRATOR: &str = "[Administrator]";
const GIVEAWAY_CURRENCY: &str = "Currency:MtxGiveaway";

/// One sub-profile to persist, guarded by the `rvn` it was read at.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileWrite {
    pub profile: Profile,
    pub expected_rvn: i64,
}

/// Every write of one account produced by an operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Commit {
    pub account_id: String,
    pub writes: Vec<ProfileWrite>,
}

impl Commit {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn profile_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.writes.iter().map(|write| write.profile.profile_id.as_str())
    }
}

/// Result of a successful client operation.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationOutcome {
    pub response: McpResponse,
    /// The caller's set after the operation, counters already bumped.
    pub profiles: ProfileSet,
    pub commit: Commit,
    /// Writes to other accounts, one commit per account.
    pub peer_commits: Vec<Commit>,
    /// Notifications for other accounts, sent after the commits succeed.
    pub deliveries: Vec<Delivery>,
}

/// Result of an administrative grant.
#[derive(Clone, Debug, PartialEq)]
pub struct GrantOutcome {
    pub profiles: ProfileSet,
    pub commit: Commit,
    pub levels: LevelOutcome,
}

type Snapshots = BTreeMap<String, RevisionSnapshot>;

fn snapshot(set: &ProfileSet) -> Snapshots {
    set.profiles
        .iter()
        .map(|(id, profile)| (id.clone(), RevisionSnapshot::of(profile)))
        .collect()
}

/// Runs operations against profile sets loaded by the caller.
#[derive(Clone, Copy)]
pub struct ProfileEngine<'a> {
    env: Env<'a>,
}

impl<'a> ProfileEngine<'a> {
    pub fn new(env: Env<'a>) -> Self {
        Self { env }
    }

    pub fn env(&self) -> Env<'a> {
        self.env
    }

    /// Validates and applies `prepared` to a copy of `set`.
    ///
    /// `peers` must hold the profile sets of every account named by
    /// [`PreparedOperation::peer_accounts`], plus the caller's friend list.
    pub fn execute(
        &self,
        prepared: &PreparedOperation,
        set: &ProfileSet,
        peers: Peers,
    ) -> Result<OperationOutcome, McpError> {
        let request = &prepared.request;
        let primary_id = request.profile_id.as_str();
        set.resolve(primary_id)?;

        let before = snapshot(set);
        let peer_before: BTreeMap<String, Snapshots> = peers
            .accounts
            .iter()
            .map(|(account, peer_set)| (account.clone(), snapshot(peer_set)))
            .collect();

        let mut working = set.clone();
        let mut ctx = OperationContext::new(self.env, request, peers);
        prepared.command.pre_validate(&working, &ctx)?;
        prepared.command.apply(&mut working, &mut ctx)?;

        let commit = self.commit(&mut working, &ctx.log, &before);

        let mut peer_commits = Vec::new();
        for (account, log) in &ctx.peer_logs {
            let peer_set = ctx.peers.account_mut(account)?;
            let snapshots = peer_before.get(account).cloned().unwrap_or_default();
            let peer_commit = self.commit(peer_set, log, &snapshots);
            if !peer_commit.is_empty() {
                peer_commits.push(peer_commit);
            }
        }

        let mode = request.revision_mode(self.env.config.command_revision_build);
        let tracker = RevisionTracker::new(mode);
        let primary_before = before.get(primary_id).copied().unwrap_or(RevisionSnapshot {
            rvn: 0,
            command_revision: 0,
        });
        // dedicated servers that omit `rvn` are treated as already in sync
        let client_revision = match request.client_revision {
            None if request.dedicated_server => Some(RevisionMode::Rvn.select(primary_before)),
            other => other,
        };

        let mut log = ctx.log;
        let primary_changes = log.take(primary_id);
        let primary = tracker.respond(working.resolve(primary_id)?, primary_before, client_revision, primary_changes);
        let mut response = McpResponse::new(primary, self.env.now());

        let secondary_ids: Vec<String> = log.touched().map(str::to_owned).collect();
        for profile_id in secondary_ids {
            let profile = working.resolve(&profile_id)?;
            let profile_before = before.get(&profile_id).copied().unwrap_or_else(|| RevisionSnapshot::of(profile));
            response
                .multi_update
                .push(RevisionTracker::secondary(profile, profile_before, log.take(&profile_id)));
        }
        if !ctx.notifications.is_empty() {
            response.notifications = Some(ctx.notifications);
        }

        tracing::debug!(
            account_id = %request.account_id,
            profile_id = primary_id,
            operation = %prepared.kind,
            rvn = response.primary.profile_revision,
            written = commit.writes.len(),
            peers = peer_commits.len(),
            "operation applied"
        );

        Ok(OperationOutcome {
            response,
            profiles: working,
            commit,
            peer_commits,
            deliveries: ctx.deliveries,
        })
    }

    /// Adds account XP, boosted by `season_match_boost` percent, then runs the
    /// level and battle-pass loops.
    pub fn grant_xp(&self, set: &ProfileSet, amount: i64) -> Result<GrantOutcome, McpError> {
        ensure_positive(amount)?;
        let max_level = self.env.config.max_level;
        let athena = set.resolve(ids::ATHENA)?;
        if athena.attributes().level() >= max_level {
            return Err(McpError::MaxLevelReached { max_level });
        }
        let boost = athena.attributes().season_match_boost();
        let boosted = amount.saturating_add(amount.saturating_mul(boost) / 100);

        let before = snapshot(set);
        let mut working = set.clone();
        let mut log = ChangeLog::new();

        let attrs = working.resolve_mut(ids::ATHENA)?.attributes_mut();
        let xp = attrs.xp().saturating_add(boosted);
        attrs.xp = Some(xp);
        log.push(ids::ATHENA, ChangeRecord::stat_modified("xp", xp));

        let levels = apply_xp(&mut working, GrantTargets::default(), &self.env, &mut log)?;
        let commit = self.commit(&mut working, &log, &before);
        tracing::info!(
            account_id = %set.account_id,
            amount,
            boosted,
            levels = levels.levels_gained,
            tiers = levels.tiers_gained,
            "xp granted"
        );
        Ok(GrantOutcome {
            profiles: working,
            commit,
            levels,
        })
    }

    /// Credits `amount` to the `common_core` wallet and drops a make-good gift box.
    pub fn grant_currency(&self, set: &ProfileSet, amount: i64) -> Result<GrantOutcome, McpError> {
        ensure_positive(amount)?;
        let before = snapshot(set);
        let mut working = set.clone();
        let mut log = ChangeLog::new();
        let env = self.env;

        let core = working.resolve_mut(ids::COMMON_CORE)?;
        let change = wallet::credit(core, amount, || env.next_id(), &env.config.default_mtx_platform);
        log.push(ids::COMMON_CORE, change);

        let loot = vec![LootEntry::new(GIVEAWAY_CURRENCY, GIVEAWAY_CURRENCY, amount)];
        let attributes = ItemAttributes {
            gifted_on: Some(env.now()),
            ..ItemAttributes::gift_box(ADMINISTRATOR, loot)
        };
        drop_gift_box(&mut working, ids::COMMON_CORE, MAKE_GOOD_GIFT_BOX, attributes, &env, &mut log)?;

        let commit = self.commit(&mut working, &log, &before);
        tracing::info!(account_id = %set.account_id, amount, "currency granted");
        Ok(GrantOutcome {
            profiles: working,
            commit,
            levels: LevelOutcome::default(),
        })
    }

    /// Bumps every touched profile exactly once and collects its write.
    fn commit(&self, set: &mut ProfileSet, log: &ChangeLog, before: &Snapshots) -> Commit {
        let now = self.env.now();
        let mut writes = Vec::new();
        for profile_id in log.touched() {
            if !RevisionTracker::should_persist(log.changes(profile_id)) {
                continue;
            }
            let Some(profile) = set.profiles.get_mut(profile_id) else {
                continue;
            };
            let expected_rvn = before.get(profile_id).map_or(profile.rvn, |snapshot| snapshot.rvn);
            RevisionTracker::bump(profile, now);
            writes.push(ProfileWrite {
                profile: profile.clone(),
                expected_rvn,
            });
        }
        Commit {
            account_id: set.account_id.clone(),
            writes,
        }
    }
}

fn ensure_positive(amount: i64) -> Result<(), McpError> {
    if amount > 0 {
        return Ok(());
    }
    Err(McpError::invalid(
        ParameterCheck::Value,
        "Validation Failed. 'amount' must be positive.",
        vec!["amount".to_owned()],
    ))
}
