//! Content-hash change detection for dependency graphs.
//!
//! This crate reduces the source files reachable from an entry module to one
//! deterministic aggregate digest ([`HashAggregator`]), remembers the last
//! digest per entry file in a JSON registry ([`Registry`]), and classifies a
//! run as changed or unchanged ([`ChangeDetector`]) so an expensive downstream
//! step can be skipped on a hit.

#![warn(missing_docs)]

pub mod aggregate;
pub mod detect;
pub mod error;
pub mod registry;

pub use aggregate::{aggregate_digest, HashAggregator, HashOptions, HashOutput, HashSnapshot};
pub use detect::{ChangeDetector, DetectOptions, DetectReport, DetectState};
pub use error::{DetectError, HashError, RegistryError};
pub use registry::{Registry, Verdict, DEFAULT_REGISTRY_FILE};
