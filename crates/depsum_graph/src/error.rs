//! Error types for dependency traversal.

use std::path::PathBuf;

/// Errors that can occur while walking a dependency graph.
///
/// Every error aborts the walk: a source yields at most one error and then
/// stops producing nodes.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A module file could not be read.
    #[error("failed to read module {path}: {source}")]
    Read {
        /// The module path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A script module is not valid UTF-8 and cannot be scanned for imports.
    #[error("module {path} is not valid UTF-8")]
    NotUtf8 {
        /// The module path.
        path: PathBuf,
    },

    /// An import specifier could not be resolved to a file.
    #[error("cannot resolve '{specifier}' from {from}")]
    Unresolved {
        /// The specifier as written in the importing module.
        specifier: String,
        /// The importing module.
        from: PathBuf,
    },

    /// A package's `package.json` could not be parsed.
    #[error("invalid package manifest {path}: {reason}")]
    PackageManifest {
        /// The manifest path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The walk reached more modules than the configured limit.
    #[error("dependency graph exceeds {max} modules")]
    TooManyModules {
        /// The configured module limit.
        max: usize,
    },
}
