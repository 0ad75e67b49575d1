//! Shared plumbing for the subcommands: config discovery and flag merging.
//!
//! Flags override scalar config values. List flags (`--exclude`, `--include`)
//! extend the configured lists rather than replacing them.

use std::path::{Path, PathBuf};

use depsum_cache::{DetectOptions, HashOptions};
use depsum_config::{ConfigError, DepsumConfig};
use depsum_graph::{ExcludeSet, ScriptGraph};

use crate::{CheckArgs, GlobalArgs, HashArgs};

/// Loads `--config` if given, else the nearest `depsum.toml` above the
/// working directory, else the defaults.
pub fn load_config(global: &GlobalArgs) -> Result<DepsumConfig, Box<dyn std::error::Error>> {
    let config = match &global.config {
        Some(path) => depsum_config::load_config_file(Path::new(path))?,
        None => {
            let cwd = std::env::current_dir()?;
            depsum_config::load_config_or_default(&cwd)?
        }
    };
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Builds the resolver described by the `[resolve]` section.
pub fn script_graph(config: &DepsumConfig) -> ScriptGraph {
    ScriptGraph::new(config.resolve.script_options())
}

/// Unions configured and command-line exclusions.
pub fn merge_exclude(config: &DepsumConfig, flags: &[String]) -> ExcludeSet {
    config.hash.exclude.iter().chain(flags).cloned().collect()
}

/// Configured include files followed by command-line ones, without duplicates.
pub fn merge_include(config: &DepsumConfig, flags: &[String]) -> Vec<PathBuf> {
    let mut include: Vec<PathBuf> = Vec::new();
    for path in config.hash.include.iter().chain(flags) {
        let path = PathBuf::from(path);
        if !include.contains(&path) {
            include.push(path);
        }
    }
    include
}

/// Resolves the timeout: the flag if given, else the configured one.
pub fn merge_timeout(
    config: &DepsumConfig,
    flag: Option<&str>,
) -> Result<Option<std::time::Duration>, ConfigError> {
    match flag {
        Some(value) => depsum_config::parse_duration(value).map(Some),
        None => config.hash.timeout(),
    }
}

/// Detector options for `depsum check`.
pub fn detect_options(config: &DepsumConfig, args: &CheckArgs) -> Result<DetectOptions, ConfigError> {
    Ok(DetectOptions {
        hash_file: PathBuf::from(args.hash_file.as_deref().unwrap_or(&config.registry.path)),
        exclude: merge_exclude(config, &args.exclude),
        include: merge_include(config, &args.include),
        skip_missing: args.skip_missing || config.hash.skip_missing,
        timeout: merge_timeout(config, args.timeout.as_deref())?,
    })
}

/// Aggregator options for `depsum hash`.
pub fn hash_options(config: &DepsumConfig, args: &HashArgs) -> Result<HashOptions, ConfigError> {
    Ok(HashOptions {
        exclude: merge_exclude(config, &args.exclude),
        include: merge_include(config, &args.include),
        timeout: merge_timeout(config, args.timeout.as_deref())?,
    })
}
