//! Friendship lookups consulted by gifting.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// Source of an account's accepted friendships.
pub trait FriendsOracle: Send + Sync {
    fn friends_of(&self, account_id: &str) -> Vec<String>;

    fn are_friends(&self, a: &str, b: &str) -> bool {
        self.friends_of(a).iter().any(|friend| friend == b)
    }
}

/// Symmetric friendship table held in memory.
#[derive(Default)]
pub struct InMemoryFriends {
    friends: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl InMemoryFriends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_friendships<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let oracle = Self::new();
        for (a, b) in pairs {
            oracle.add(a, b);
        }
        oracle
    }

    /// Records a friendship in both directions.
    pub fn add(&self, a: &str, b: &str) {
        let Ok(mut friends) = self.friends.write() else {
            tracing::warn!(a, b, "friend table lock poisoned; friendship not recorded");
            return;
        };
        friends.entry(a.to_owned()).or_default().insert(b.to_owned());
        friends.entry(b.to_owned()).or_default().insert(a.to_owned());
    }

    pub fn remove(&self, a: &str, b: &str) {
        let Ok(mut friends) = self.friends.write() else {
            tracing::warn!(a, b, "friend table lock poisoned; friendship not removed");
            return;
        };
        if let Some(list) = friends.get_mut(a) {
            list.remove(b);
        }
        if let Some(list) = friends.get_mut(b) {
            list.remove(a);
        }
    }
}

impl FriendsOracle for InMemoryFriends {
    fn friends_of(&self, account_id: &str) -> Vec<String> {
        self.friends
            .read()
            .map(|friends| {
                friends
                    .get(account_id)
                    .map(|list| list.iter().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendships_are_symmetric() {
        let oracle = InMemoryFriends::with_friendships([("a", "b")]);
        assert!(oracle.are_friends("a", "b"));
        assert!(oracle.are_friends("b", "a"));
        assert!(!oracle.are_friends("a", "c"));

        oracle.remove("b", "a");
        assert!(oracle.friends_of("a").is_empty());
    }
}
