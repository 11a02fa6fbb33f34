//! The profile service: one entry point per client or administrative call.
//!
//! Every call runs the same cycle. The request is parsed and checked against
//! the engine limits before anything is loaded. The service then locks every
//! involved account, loads fresh profile sets from the store, runs the engine
//! on copies and persists the returned writes with revision guards.
//! Notifications for other accounts go out only after their writes landed.
use std::sync::Arc;

use profile_core::{
    Commit, GrantOutcome, McpError, McpResponse, OperationRequest, Peers, ProfileEngine,
    ProfileSet, prepare,
};

use crate::api::{RepositoryError, Result, RuntimeError};
use crate::events::{Event, EventBus, Messenger, ProfileEvent};
use crate::locks::AccountLocks;
use crate::oracle::{FriendsOracle, OracleManager};
use crate::repository::ProfileStore;

/// Cloneable handle over the store, content and collaborators.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    oracles: OracleManager,
    friends: Arc<dyn FriendsOracle>,
    messenger: Arc<dyn Messenger>,
    locks: Arc<AccountLocks>,
    bus: EventBus,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        oracles: OracleManager,
        friends: Arc<dyn FriendsOracle>,
        messenger: Arc<dyn Messenger>,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            oracles,
            friends,
            messenger,
            locks: Arc::new(AccountLocks::new()),
            bus,
        }
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Runs one client operation and returns its response envelope.
    pub async fn execute(&self, request: OperationRequest) -> Result<McpResponse> {
        let account_id = request.account_id.clone();
        let operation = request.operation.clone();
        let result = self.run(request).await;
        if let Err(err) = &result {
            let mcp = err.to_mcp();
            if mcp.severity().is_internal() {
                tracing::error!(account_id = %account_id, operation = %operation, error = %err, "operation failed");
            } else {
                tracing::warn!(
                    account_id = %account_id,
                    operation = %operation,
                    code = mcp.error_code(),
                    error = %err,
                    "operation rejected"
                );
            }
        }
        result
    }

    async fn run(&self, request: OperationRequest) -> Result<McpResponse> {
        let prepared = prepare(request, self.oracles.config())?;
        let caller = prepared.request.account_id.clone();
        let peer_accounts = prepared.peer_accounts();

        let _guard = self
            .locks
            .acquire(std::iter::once(caller.as_str()).chain(peer_accounts.iter().map(String::as_str)))
            .await?;

        let set = self.load(&caller).await?;
        let peers = self.load_peers(&caller, &peer_accounts).await?;

        let outcome = ProfileEngine::new(self.oracles.as_env()).execute(&prepared, &set, peers)?;

        self.persist(&outcome.commit).await?;
        let mut written = vec![caller.clone()];
        for peer_commit in &outcome.peer_commits {
            if let Err(err) = self.persist(peer_commit).await {
                tracing::error!(
                    account_id = %caller,
                    recipient = %peer_commit.account_id,
                    error = %err,
                    "recipient write failed after sender committed"
                );
                return Err(McpError::PartialCommit {
                    written,
                    failed: peer_commit.account_id.clone(),
                }
                .into());
            }
            written.push(peer_commit.account_id.clone());
        }

        let operation = prepared.kind.to_string();
        for commit in std::iter::once(&outcome.commit).chain(&outcome.peer_commits) {
            self.publish_commit(&operation, commit);
        }
        for delivery in &outcome.deliveries {
            if !self.messenger.notify(&delivery.account_id, &delivery.notification) {
                tracing::warn!(recipient = %delivery.account_id, "notification not delivered; recipient offline");
            }
        }

        tracing::debug!(
            account_id = %caller,
            profile_id = %prepared.request.profile_id,
            operation = %prepared.kind,
            rvn = outcome.response.primary.profile_revision,
            "operation committed"
        );
        Ok(outcome.response)
    }

    /// Creates an account's profiles from the content templates.
    pub async fn register_account(&self, account_id: &str) -> Result<ProfileSet> {
        let _guard = self.locks.acquire([account_id]).await?;
        if self.store.exists(account_id).await? {
            return Err(McpError::AccountExists {
                account_id: account_id.to_owned(),
            }
            .into());
        }

        let set = self
            .oracles
            .content()
            .templates
            .instantiate(account_id, self.oracles.clock().now());
        self.store.insert(&set).await?;
        self.bus.publish(Event::Profile(ProfileEvent::Registered {
            account_id: account_id.to_owned(),
        }));
        tracing::info!(account_id, profiles = set.profiles.len(), "account registered");
        Ok(set)
    }

    /// Deletes every profile of an account. Returns whether it existed.
    pub async fn delete_account(&self, account_id: &str) -> Result<bool> {
        let _guard = self.locks.acquire([account_id]).await?;
        let deleted = self.store.delete(account_id).await?;
        if deleted {
            self.bus.publish(Event::Profile(ProfileEvent::Deleted {
                account_id: account_id.to_owned(),
            }));
            tracing::info!(account_id, "account deleted");
        }
        Ok(deleted)
    }

    /// Current profiles of an account, without locking.
    pub async fn profiles(&self, account_id: &str) -> Result<ProfileSet> {
        self.load(account_id).await
    }

    /// Administrative XP grant.
    pub async fn grant_xp(&self, account_id: &str, amount: i64) -> Result<GrantOutcome> {
        self.grant(account_id, "GrantXp", |engine, set| engine.grant_xp(set, amount))
            .await
    }

    /// Administrative currency grant.
    pub async fn grant_currency(&self, account_id: &str, amount: i64) -> Result<GrantOutcome> {
        self.grant(account_id, "GrantCurrency", |engine, set| engine.grant_currency(set, amount))
            .await
    }

    async fn grant<F>(&self, account_id: &str, operation: &str, apply: F) -> Result<GrantOutcome>
    where
        F: FnOnce(ProfileEngine<'_>, &ProfileSet) -> std::result::Result<GrantOutcome, McpError>,
    {
        let _guard = self.locks.acquire([account_id]).await?;
        let set = self.load(account_id).await?;
        let outcome = apply(ProfileEngine::new(self.oracles.as_env()), &set)?;
        self.persist(&outcome.commit).await?;

        self.publish_commit(operation, &outcome.commit);
        Ok(outcome)
    }

    async fn load(&self, account_id: &str) -> Result<ProfileSet> {
        self.store
            .fetch(account_id)
            .await?
            .ok_or_else(|| {
                McpError::AccountNotFound {
                    account_id: account_id.to_owned(),
                }
                .into()
            })
    }

    /// Friend list of the caller plus the stored sets of every peer that exists.
    ///
    /// Missing peers are left out; the operation decides whether that is an error.
    async fn load_peers(&self, caller: &str, accounts: &[String]) -> Result<Peers> {
        let mut peers = Peers::new().with_friends(self.friends.friends_of(caller));
        for account in accounts {
            if let Some(set) = self.store.fetch(account).await? {
                peers = peers.with_account(set);
            }
        }
        Ok(peers)
    }

    async fn persist(&self, commit: &Commit) -> Result<()> {
        if commit.is_empty() {
            return Ok(());
        }
        self.store
            .replace_profiles(&commit.account_id, &commit.writes)
            .await
            .map_err(|err: RepositoryError| {
                tracing::error!(account_id = %commit.account_id, error = %err, "profile write failed");
                RuntimeError::from(err)
            })
    }

    /// Publishes a commit on the profile topic. `rvn` is the highest revision written.
    fn publish_commit(&self, operation: &str, commit: &Commit) {
        let Some(rvn) = commit.writes.iter().map(|write| write.profile.rvn).max() else {
            return;
        };
        self.bus.publish(Event::Profile(ProfileEvent::Committed {
            account_id: commit.account_id.clone(),
            operation: operation.to_owned(),
            profile_ids: commit.profile_ids().map(str::to_owned).collect(),
            rvn,
        }));
    }
}
