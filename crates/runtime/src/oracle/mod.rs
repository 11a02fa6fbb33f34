//! Runtime wrappers around static content and the engine's read-only collaborators.
//!
//! [`OracleManager`] bundles the loaded content with the clock and id source
//! so the service can build [`profile_core::Env`] snapshots on demand. The
//! data is immutable at runtime; profile documents live in repositories.
mod friends;

use std::sync::Arc;

use profile_content::ContentBundle;
use profile_core::{Clock, EngineConfig, Env, IdSource, SystemClock, UuidIds};

pub use friends::{FriendsOracle, InMemoryFriends};

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) content: Arc<ContentBundle>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdSource>,
}

impl OracleManager {
    /// Creates a new oracle manager
    pub fn new(content: Arc<ContentBundle>, clock: Arc<dyn Clock>, ids: Arc<dyn IdSource>) -> Self {
        Self { content, clock, ids }
    }

    /// Wall clock and random UUIDs.
    pub fn with_system_sources(content: Arc<ContentBundle>) -> Self {
        Self::new(content, Arc::new(SystemClock), Arc::new(UuidIds))
    }

    /// Borrows everything as the engine's environment.
    pub fn as_env(&self) -> Env<'_> {
        Env::new(
            &self.content.catalog,
            &self.content.progression,
            &self.content.config,
            self.clock.as_ref(),
            self.ids.as_ref(),
        )
    }

    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    pub fn config(&self) -> &EngineConfig {
        &self.content.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
