use std::collections::{BTreeMap, BTreeSet};

use crate::change::ChangeLog;
use crate::env::Env;
use crate::error::McpError;
use crate::profile::ProfileSet;
use crate::response::Notification;

use super::OperationRequest;

/// Other accounts an operation may read or write, loaded by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Peers {
    /// Accepted friends of the requesting account.
    pub friends: BTreeSet<String>,
    /// Profile sets of peer accounts, keyed by account id.
    pub accounts: BTreeMap<String, ProfileSet>,
}

impl Peers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_friends<I, S>(mut self, friends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.friends.extend(friends.into_iter().map(Into::into));
        self
    }

    pub fn with_account(mut self, set: ProfileSet) -> Self {
        self.accounts.insert(set.account_id.clone(), set);
        self
    }

    pub fn is_friend(&self, account_id: &str) -> bool {
        self.friends.contains(account_id)
    }

    pub fn account(&self, account_id: &str) -> Result<&ProfileSet, McpError> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| McpError::AccountNotFound {
                account_id: account_id.to_owned(),
            })
    }

    pub fn account_mut(&mut self, account_id: &str) -> Result<&mut ProfileSet, McpError> {
        self.accounts
            .get_mut(account_id)
            .ok_or_else(|| McpError::AccountNotFound {
                account_id: account_id.to_owned(),
            })
    }
}

/// A notification addressed to another account.
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub account_id: String,
    pub notification: Notification,
}

/// Mutable state threaded through one operation.
pub struct OperationContext<'a> {
    pub env: Env<'a>,
    pub request: &'a OperationRequest,
    /// Changes to the requesting account's profiles.
    pub log: ChangeLog,
    /// Notifications returned with the response.
    pub notifications: Vec<Notification>,
    pub peers: Peers,
    /// Changes to peer accounts' profiles, keyed by account id.
    pub peer_logs: BTreeMap<String, ChangeLog>,
    pub deliveries: Vec<Delivery>,
}

impl<'a> OperationContext<'a> {
    pub fn new(env: Env<'a>, request: &'a OperationRequest, peers: Peers) -> Self {
        Self {
            env,
            request,
            log: ChangeLog::new(),
            notifications: Vec::new(),
            peers,
            peer_logs: BTreeMap::new(),
            deliveries: Vec::new(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.request.account_id
    }

    pub fn profile_id(&self) -> &str {
        &self.request.profile_id
    }

    pub fn default_platform(&self) -> &str {
        &self.env.config.default_mtx_platform
    }

    pub fn deliver(&mut self, account_id: impl Into<String>, notification: Notification) {
        self.deliveries.push(Delivery {
            account_id: account_id.into(),
            notification,
        });
    }
}
