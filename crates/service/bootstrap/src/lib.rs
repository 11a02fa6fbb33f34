//! Shared bootstrap utilities for the profile service front-ends.
//!
//! Provides configuration loading, logging setup and runtime assembly that
//! the binary (or an embedding transport) can reuse.
pub mod builder;
pub mod config;
pub mod dirs;
pub mod logging;

pub use builder::{ServiceBuilder, ServiceSetup};
pub use config::{ServiceConfig, StoreKind};
