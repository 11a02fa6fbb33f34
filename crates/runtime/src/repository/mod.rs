//! Repository layer for per-account profile documents.
//!
//! Repositories hold data that CHANGES with every operation: the profile
//! sets of each account. Static content (catalog, XP tables, templates) comes
//! from `profile-content`, not from a repository.

mod error;
pub mod file;
pub mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileProfileStore;
pub use memory::InMemoryProfileStore;
pub use traits::ProfileStore;

pub(crate) use traits::apply_writes;
