//! Shared foundational types used across the depsum workspace.
//!
//! This crate provides the content [`Digest`] used to fingerprint source files
//! and the aggregate of a whole dependency graph.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{Digest, DigestParseError};
