//! Database configuration.
//!
//! Defaults suit a local single-user install; every field can be overridden
//! from the environment or with the `with_*` builders.

use crate::error::{Result, RuntimeError};
use std::env;

/// Environment variable holding the database URL.
pub const DATABASE_URL_VAR: &str = "STOREFRONT_DATABASE_URL";
/// Environment variable holding the pool size.
pub const MAX_CONNECTIONS_VAR: &str = "STOREFRONT_MAX_CONNECTIONS";
/// Environment variable toggling seeding of fresh databases.
pub const SEED_ON_CREATE_VAR: &str = "STOREFRONT_SEED_ON_CREATE";

/// Where the catalog lives and what to do when it is first created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL
    ///
    /// Default: `sqlite://storefront.db`
    pub url: String,

    /// Maximum pooled connections
    ///
    /// Default: 4
    pub max_connections: u32,

    /// Load the demo catalog when the database is created
    ///
    /// Default: `true`
    pub seed_on_create: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://storefront.db".to_string(),
            max_connections: 4,
            seed_on_create: true,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for the database at `url`, other fields defaulted.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the connection URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the maximum pool size.
    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Enable or disable seeding of fresh databases.
    #[must_use]
    pub const fn with_seed_on_create(mut self, seed_on_create: bool) -> Self {
        self.seed_on_create = seed_on_create;
        self
    }

    /// Load configuration from `STOREFRONT_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] if a variable is set but cannot be
    /// parsed, or the resulting configuration is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR) {
            config.url = url;
        }
        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            config.max_connections = raw.trim().parse().map_err(|e| {
                RuntimeError::Config(format!("{MAX_CONNECTIONS_VAR}={raw}: {e}"))
            })?;
        }
        if let Some(raw) = lookup(SEED_ON_CREATE_VAR) {
            config.seed_on_create = parse_flag(&raw).ok_or_else(|| {
                RuntimeError::Config(format!("{SEED_ON_CREATE_VAR}={raw}: expected true or false"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values no store can work with.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] for an empty URL or a zero pool size.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(RuntimeError::Config("database URL is empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(RuntimeError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = DatabaseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DatabaseConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "sqlite::memory:"),
            (MAX_CONNECTIONS_VAR, " 8 "),
            (SEED_ON_CREATE_VAR, "off"),
        ]))
        .unwrap();

        assert_eq!(config.url, "sqlite::memory:");
        assert_eq!(config.max_connections, 8);
        assert!(!config.seed_on_create);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = DatabaseConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "many")]))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Config(msg) if msg.contains(MAX_CONNECTIONS_VAR)));

        let err = DatabaseConfig::from_lookup(lookup(&[(SEED_ON_CREATE_VAR, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));

        let err = DatabaseConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "0")]))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
    }

    #[test]
    fn test_builders() {
        let config = DatabaseConfig::new("sqlite://a.db")
            .with_max_connections(2)
            .with_seed_on_create(false)
            .with_url("sqlite://b.db");

        assert_eq!(config.url, "sqlite://b.db");
        assert_eq!(config.max_connections, 2);
        assert!(!config.seed_on_create);
        assert!(config.validate().is_ok());
    }
}
