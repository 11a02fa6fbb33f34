//! Content loaders for reading profile data from files.
//!
//! Every loader has a `parse` function over file contents and a `load`
//! function over a path; the embedded defaults go through `parse`.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod progression;
pub mod templates;

pub use catalog::{CatalogConfigLoader, CatalogLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use progression::{SeasonLoader, XpTableLoader};
pub use templates::TemplateLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
