//! Static content for the profile engine.
//!
//! This crate houses the data the engine reads but never writes:
//! - Profile templates copied into every new account
//! - The hand-authored storefront catalog (JSON)
//! - The auto-grant catalog configuration (JSON)
//! - The XP table and the battle-pass season tables (JSON)
//! - Engine tunables (TOML)
//!
//! A default copy of every file is embedded at compile time so the service
//! can start without a content directory.

pub mod bundle;
pub mod templates;

#[cfg(feature = "loaders")]
pub mod embedded;
#[cfg(feature = "loaders")]
pub mod loaders;

pub use bundle::ContentBundle;
pub use templates::{PROFILE_IDS, ProfileTemplates};

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogConfigLoader, CatalogLoader, ConfigLoader, ContentFactory, SeasonLoader, TemplateLoader,
    XpTableLoader,
};
