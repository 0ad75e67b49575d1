//! Configuration types deserialized from `depsum.toml`.

use std::time::Duration;

use depsum_graph::script::DEFAULT_MAX_MODULES;
use depsum_graph::ScriptGraphOptions;
use serde::Deserialize;

use crate::duration::parse_duration;
use crate::error::ConfigError;

/// Registry file name used when none is configured.
pub const DEFAULT_REGISTRY_PATH: &str = ".depsum-hash";

/// The top-level configuration parsed from `depsum.toml`.
///
/// Every section is optional; an empty file yields [`DepsumConfig::default`].
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct DepsumConfig {
    /// Where the change registry lives.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// What participates in the aggregate digest.
    #[serde(default)]
    pub hash: HashConfig,
    /// Module resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// Registry location settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Path of the registry file, relative to the working directory.
    #[serde(default = "default_registry_path")]
    pub path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
        }
    }
}

fn default_registry_path() -> String {
    DEFAULT_REGISTRY_PATH.to_string()
}

/// Hashing settings.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct HashConfig {
    /// Module specifiers not traversed (e.g. third-party packages).
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Extra files outside the import graph that must participate.
    #[serde(default)]
    pub include: Vec<String>,
    /// Upper bound on a single hash computation (e.g. `"30s"`).
    #[serde(default)]
    pub timeout: Option<String>,
    /// Report a missing entry file as unchanged instead of failing.
    #[serde(default)]
    pub skip_missing: bool,
}

impl HashConfig {
    /// Parses the configured timeout, if any.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout.as_deref().map(parse_duration).transpose()
    }
}

/// Module resolution settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Extensions tried, in order, for extensionless specifiers.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Upper bound on modules visited in one walk.
    #[serde(default = "default_max_modules")]
    pub max_modules: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_modules: default_max_modules(),
        }
    }
}

impl ResolveConfig {
    /// Converts to resolver options.
    pub fn script_options(&self) -> ScriptGraphOptions {
        ScriptGraphOptions {
            extensions: self.extensions.clone(),
            max_modules: self.max_modules,
        }
    }
}

fn default_extensions() -> Vec<String> {
    ScriptGraphOptions::default().extensions
}

fn default_max_modules() -> usize {
    DEFAULT_MAX_MODULES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults_match_resolver_defaults() {
        assert_eq!(
            ResolveConfig::default().script_options(),
            ScriptGraphOptions::default()
        );
    }

    #[test]
    fn timeout_absent() {
        assert_eq!(HashConfig::default().timeout().unwrap(), None);
    }

    #[test]
    fn timeout_parsed() {
        let hash = HashConfig {
            timeout: Some("1500ms".to_string()),
            ..HashConfig::default()
        };
        assert_eq!(hash.timeout().unwrap(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn registry_default_path() {
        assert_eq!(RegistryConfig::default().path, ".depsum-hash");
    }
}
