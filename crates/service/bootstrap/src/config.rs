//! Service configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use runtime::RuntimeConfig;

/// Which profile store backs the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

/// Configuration required to bootstrap the profile service.
#[derive(Clone, Debug, Default)]
pub struct ServiceConfig {
    /// Directory with `engine.toml`, catalogs and `profiles/`; embedded content when unset.
    pub content_dir: Option<PathBuf>,
    /// Engine configuration file overriding the content's `engine.toml`.
    pub engine_config: Option<PathBuf>,
    /// Battle-pass season overriding the engine configuration.
    pub season: Option<u32>,
    pub store: StoreKind,
    /// Where the file store keeps account documents.
    pub profile_data_dir: Option<PathBuf>,
    /// Enables the rolling file log when set.
    pub log_dir: Option<PathBuf>,
    pub runtime: RuntimeConfig,
}

impl ServiceConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CONTENT_DIR` - Content directory (default: embedded content)
    /// - `ENGINE_CONFIG` - Engine TOML file (default: the content's `engine.toml`)
    /// - `SEASON` - Battle-pass season (default: from the engine configuration)
    /// - `PROFILE_STORE` - `memory` or `file` (default: memory)
    /// - `PROFILE_DATA_DIR` - File store directory (default: platform data dir)
    /// - `LOG_DIR` - Directory for daily log files (default: stderr only)
    /// - `EVENT_CAPACITY` - Buffered events per topic (default: 100)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let path = |key: &str| lookup(key).filter(|value| !value.is_empty()).map(PathBuf::from);

        config.content_dir = path("CONTENT_DIR");
        config.engine_config = path("ENGINE_CONFIG");
        config.season = parse(&lookup, "SEASON");

        if let Some(raw) = lookup("PROFILE_STORE") {
            match raw.parse() {
                Ok(kind) => config.store = kind,
                Err(_) => tracing::warn!(value = %raw, "unknown PROFILE_STORE; using memory"),
            }
        }
        config.profile_data_dir = path("PROFILE_DATA_DIR");
        config.log_dir = path("LOG_DIR");

        if let Some(capacity) = parse::<usize>(&lookup, "EVENT_CAPACITY") {
            config.runtime.event_capacity = capacity.max(1);
        }

        config
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServiceConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config(&[]);
        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.content_dir.is_none());
        assert!(config.season.is_none());
        assert_eq!(config.runtime.event_capacity, 100);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("CONTENT_DIR", "/srv/content"),
            ("ENGINE_CONFIG", "/etc/engine.toml"),
            ("SEASON", "9"),
            ("PROFILE_STORE", "File"),
            ("PROFILE_DATA_DIR", "/var/lib/profiles"),
            ("LOG_DIR", "/var/log/profiled"),
            ("EVENT_CAPACITY", "0"),
        ]);
        assert_eq!(config.content_dir, Some(PathBuf::from("/srv/content")));
        assert_eq!(config.engine_config, Some(PathBuf::from("/etc/engine.toml")));
        assert_eq!(config.season, Some(9));
        assert_eq!(config.store, StoreKind::File);
        assert_eq!(config.profile_data_dir, Some(PathBuf::from("/var/lib/profiles")));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/profiled")));
        assert_eq!(config.runtime.event_capacity, 1);
    }

    #[test]
    fn ignores_malformed_values() {
        let config = config(&[("SEASON", "eight"), ("PROFILE_STORE", "redis"), ("LOG_DIR", "")]);
        assert!(config.season.is_none());
        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.log_dir.is_none());
    }
}
