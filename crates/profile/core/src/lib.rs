//! Profile documents and the rules that mutate them.
//!
//! `profile-core` holds the data model (profiles, items, change records), the
//! revision protocol, the wallet, catalog and progression subsystems, and the
//! named client operations. Everything is synchronous and free of I/O: a
//! caller loads profile sets, runs them through [`engine::ProfileEngine`] and
//! persists the writes it gets back.
pub mod catalog;
pub mod change;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod operation;
pub mod profile;
pub mod progression;
pub mod response;
pub mod revision;
pub mod wallet;

pub use catalog::{Catalog, CatalogConfig, CatalogEntry, StaticCatalog, Storefront};
pub use change::{ChangeLog, ChangeRecord};
pub use config::EngineConfig;
pub use engine::{Commit, GrantOutcome, OperationOutcome, ProfileEngine, ProfileWrite};
pub use env::{CatalogOracle, Clock, Env, FixedClock, IdSource, SequentialIds, SystemClock, UuidIds};
pub use error::{ErrorSeverity, McpError, ParameterCheck};
pub use operation::{
    Command, Delivery, OperationKind, OperationRequest, Peers, PreparedOperation, ProfileOperation,
    prepare,
};
pub use profile::{Item, ItemAttributes, LootEntry, Profile, ProfileSet, StatAttributes, ids};
pub use progression::{LevelRequirement, Progression, SeasonRewards, XpTable};
pub use response::{ErrorEnvelope, McpResponse, Notification, ProfileUpdate};
pub use revision::{BuildVersion, RevisionMode, RevisionTracker};
