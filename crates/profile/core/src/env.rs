//! Read-only collaborators the engine consults while mutating profiles.
//!
//! [`Env`] bundles static content (catalog, progression tables, config) with
//! the two sources of nondeterminism an operation needs: the clock and the
//! item-id generator. Swapping those two for fixed implementations makes
//! every operation reproducible in tests.
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::progression::Progression;

/// Wall-clock source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Generator for item, purchase and gift-box identifiers.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs; collisions are treated as impossible.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Monotonic `prefix-N` identifiers for deterministic runs.
#[derive(Debug, Default)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n}", self.prefix)
    }
}

/// Storefront catalog provider, recomputed on each call.
pub trait CatalogOracle: Send + Sync {
    fn catalog(&self, now: DateTime<Utc>) -> Catalog;
}

/// Aggregated access to everything an operation reads but never writes.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    pub catalog: &'a dyn CatalogOracle,
    pub progression: &'a Progression,
    pub config: &'a EngineConfig,
    pub clock: &'a dyn Clock,
    pub ids: &'a dyn IdSource,
}

impl<'a> Env<'a> {
    pub fn new(
        catalog: &'a dyn CatalogOracle,
        progression: &'a Progression,
        config: &'a EngineConfig,
        clock: &'a dyn Clock,
        ids: &'a dyn IdSource,
    ) -> Self {
        Self {
            catalog,
            progression,
            config,
            clock,
            ids,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_unique() {
        let ids = SequentialIds::new("item");
        assert_eq!(ids.next_id(), "item-1");
        assert_eq!(ids.next_id(), "item-2");
    }
}
