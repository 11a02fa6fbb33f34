//! Runtime orchestration for the profile engine.
//!
//! This crate wires profile storage, static content, per-account locking and
//! notification delivery around the synchronous [`profile_core`] engine.
//! Consumers build a [`Runtime`] and drive it through [`ProfileService`]
//! handles.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the builder and owns the event bus
//! - [`service`] runs the load, mutate and persist cycle per call
//! - [`api`] exposes the error types downstream clients interact with
//! - [`events`] provides a topic-based event bus and gift delivery
//! - [`locks`] serializes operations per account
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
pub mod api;
pub mod events;
pub mod locks;
pub mod oracle;
pub mod repository;
pub mod runtime;
pub mod service;

pub use api::{Result, RuntimeError};
pub use events::{BusMessenger, Event, EventBus, GiftEvent, Messenger, NullMessenger, ProfileEvent, Topic};
pub use locks::{AccountGuard, AccountLocks};
pub use oracle::{FriendsOracle, InMemoryFriends, OracleManager};
pub use repository::{FileProfileStore, InMemoryProfileStore, ProfileStore, RepositoryError};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use service::ProfileService;
