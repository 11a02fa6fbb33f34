//! High-level runtime assembly.
//!
//! The runtime owns the event bus and wires the store, content and
//! collaborators into a [`ProfileService`]. Clients talk to the service
//! through cloned handles.

use std::sync::Arc;

use tokio::sync::broadcast;

use profile_content::ContentBundle;

use crate::api::{Result, RuntimeError};
use crate::events::{BusMessenger, Event, EventBus, Messenger, Topic};
use crate::oracle::{FriendsOracle, InMemoryFriends, OracleManager};
use crate::repository::{InMemoryProfileStore, ProfileStore};
use crate::service::ProfileService;

/// Runtime configuration shared across the service and event bus.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Buffered events per topic before slow subscribers start lagging.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { event_capacity: 100 }
    }
}

/// Assembled profile runtime.
///
/// [`ProfileService`] handles are cheap to clone and can be shared across
/// connection tasks.
pub struct Runtime {
    service: ProfileService,
    bus: EventBus,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to the profile service
    pub fn handle(&self) -> ProfileService {
        self.service.clone()
    }

    /// Subscribe to a specific event topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleManager>,
    store: Option<Arc<dyn ProfileStore>>,
    friends: Option<Arc<dyn FriendsOracle>>,
    messenger: Option<Arc<dyn Messenger>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            store: None,
            friends: None,
            messenger: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Shorthand for [`oracles`](Self::oracles) with the wall clock and random ids.
    pub fn content(self, content: ContentBundle) -> Self {
        self.oracles(OracleManager::with_system_sources(Arc::new(content)))
    }

    /// Profile store. Defaults to an empty in-memory store.
    pub fn store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Friend graph. Defaults to an empty in-memory graph.
    pub fn friends(mut self, friends: Arc<dyn FriendsOracle>) -> Self {
        self.friends = Some(friends);
        self
    }

    /// Gift notification sink. Defaults to publishing on [`Topic::Gift`].
    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Build the runtime
    pub fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingContent)?;
        let bus = EventBus::with_capacity(self.config.event_capacity);

        let store: Arc<dyn ProfileStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryProfileStore::new()),
        };
        let friends: Arc<dyn FriendsOracle> = match self.friends {
            Some(friends) => friends,
            None => Arc::new(InMemoryFriends::new()),
        };
        let messenger: Arc<dyn Messenger> = match self.messenger {
            Some(messenger) => messenger,
            None => Arc::new(BusMessenger::new(bus.clone())),
        };

        tracing::info!(
            season = oracles.config().season,
            max_level = oracles.config().max_level,
            templates = oracles.content().templates.len(),
            "profile runtime ready"
        );

        let service = ProfileService::new(store, oracles, friends, messenger, bus.clone());
        Ok(Runtime { service, bus })
    }
}
