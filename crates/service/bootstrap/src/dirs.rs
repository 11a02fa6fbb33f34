//! Platform-specific directory utilities
//!
//! Follows platform conventions for data directories.

use std::path::PathBuf;

const APP_NAME: &str = "profiled";

/// Get the platform-specific directory for stored profiles
///
/// - macOS: `~/Library/Application Support/profiled/profiles`
/// - Linux: `~/.local/share/profiled/profiles` (or `$XDG_DATA_HOME/profiled/profiles`)
/// - Windows: `%APPDATA%\profiled\profiles`
/// - Fallback: `./profile_data`
pub fn profile_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("profiles"))
        .unwrap_or_else(|| PathBuf::from("./profile_data"))
}
