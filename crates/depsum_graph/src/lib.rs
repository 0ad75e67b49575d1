//! Dependency graph traversal for depsum.
//!
//! This crate defines the [`DependencySource`] contract the hashing engine
//! pulls modules from, a concrete CommonJS/ES module resolver
//! ([`ScriptGraph`]), an in-memory source for tests and embedders
//! ([`MemorySource`]), and [`NodeStream`], which runs a walk on a blocking
//! worker and delivers nodes through a bounded channel.

#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod node;
pub mod resolve;
pub mod scan;
pub mod script;
pub mod source;
pub mod stream;

pub use error::SourceError;
pub use memory::MemorySource;
pub use node::DependencyNode;
pub use script::{ScriptGraph, ScriptGraphOptions};
pub use source::{DependencySource, ExcludeSet, NodeIter};
pub use stream::NodeStream;
