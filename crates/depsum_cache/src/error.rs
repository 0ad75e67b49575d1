//! Error types for hashing, registry and detection operations.
//!
//! Unlike a build cache that degrades to a miss on any problem, change
//! detection surfaces every failure: a caller must never see a spurious hit
//! or miss when the answer is actually unknown.

use std::path::PathBuf;
use std::time::Duration;

use depsum_graph::SourceError;

/// Errors that can occur while computing an aggregate digest.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The entry file does not exist.
    #[error("{path} does not exist")]
    NotFound {
        /// The entry path as given.
        path: PathBuf,
    },

    /// The entry file exists but is not a regular file.
    #[error("{path} is not a regular file")]
    NotARegularFile {
        /// The entry path as given.
        path: PathBuf,
    },

    /// An include file does not exist or is not a regular file.
    #[error("include file {path} does not exist or is not a regular file")]
    IncludeMissing {
        /// The include path as given.
        path: PathBuf,
    },

    /// An include file exists but could not be read.
    #[error("failed to read include file {path}: {source}")]
    IncludeRead {
        /// The include path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The dependency source reported an error during traversal.
    #[error("dependency traversal failed: {0}")]
    Source(#[from] SourceError),

    /// The traversal worker died without reporting a result.
    #[error("dependency traversal aborted: {reason}")]
    TraversalAborted {
        /// Description of the failure.
        reason: String,
    },

    /// The computation did not finish within the configured limit.
    #[error("hash computation timed out after {limit:?}")]
    Timeout {
        /// The configured limit.
        limit: Duration,
    },
}

/// Errors that can occur while loading or persisting the change registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry path exists but is not a regular file.
    #[error("registry {path} exists but is not a regular file")]
    InvalidPath {
        /// The registry path.
        path: PathBuf,
    },

    /// The registry file does not contain a JSON object of strings.
    #[error("registry {path} is corrupt: {reason}")]
    Corrupt {
        /// The registry path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// An I/O error occurred while reading or writing the registry.
    #[error("registry I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Terminal failure of a change detection run.
///
/// None of these are retried; the registry is left as it was before the run.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The entry file, or an include file, is missing or not a regular file.
    #[error("{path} is not a regular file, or does not exist")]
    NotFound {
        /// The offending path.
        path: PathBuf,
    },

    /// The configured registry path exists but is not a regular file.
    #[error("registry {path} exists but is not a regular file")]
    RegistryInvalidPath {
        /// The registry path.
        path: PathBuf,
    },

    /// The registry file could not be parsed. It is left untouched.
    #[error("registry {path} is corrupt: {reason}")]
    RegistryCorrupt {
        /// The registry path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// Traversal or content hashing failed.
    #[error("hash computation failed: {0}")]
    HashComputation(#[source] HashError),

    /// The registry could not be read or written.
    #[error("registry I/O error at {path}: {source}")]
    Io {
        /// The registry path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Hashing did not finish within the configured limit.
    #[error("change detection timed out after {limit:?}")]
    Timeout {
        /// The configured limit.
        limit: Duration,
    },
}

impl From<HashError> for DetectError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::NotFound { path }
            | HashError::NotARegularFile { path }
            | HashError::IncludeMissing { path } => DetectError::NotFound { path },
            HashError::Timeout { limit } => DetectError::Timeout { limit },
            other => DetectError::HashComputation(other),
        }
    }
}

impl From<RegistryError> for DetectError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidPath { path } => DetectError::RegistryInvalidPath { path },
            RegistryError::Corrupt { path, reason } => DetectError::RegistryCorrupt { path, reason },
            RegistryError::Io { path, source } => DetectError::Io { path, source },
        }
    }
}
