//! Parsing and validation of `depsum.toml` configuration files.
//!
//! This crate reads the optional project configuration file and produces a
//! strongly-typed [`DepsumConfig`] holding the registry location, the
//! exclude/include sets, the hashing timeout and resolver settings.

#![warn(missing_docs)]

pub mod duration;
pub mod error;
pub mod loader;
pub mod types;

pub use duration::parse_duration;
pub use error::ConfigError;
pub use loader::{
    find_config, load_config, load_config_file, load_config_from_str, load_config_or_default,
    CONFIG_FILE,
};
pub use types::*;
