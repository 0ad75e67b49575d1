//! The contract between the hashing engine and a module resolver.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::SourceError;
use crate::node::DependencyNode;

/// A lazily produced sequence of dependency nodes.
///
/// The sequence ends after the last node or after the first error.
pub type NodeIter<'a> = Box<dyn Iterator<Item = Result<DependencyNode, SourceError>> + Send + 'a>;

/// Produces the modules reachable from an entry file.
///
/// Implementations must yield each reachable module exactly once (deduplicated
/// by id) and must not traverse into modules covered by `exclude`. The content
/// of each node is the exact bytes used to resolve the module's imports. Any
/// resolution algorithm meeting this contract is interchangeable.
pub trait DependencySource: Send + Sync {
    /// Starts a walk from `entry`, returning the nodes as they are discovered.
    fn walk<'a>(&'a self, entry: &'a Path, exclude: &'a ExcludeSet) -> NodeIter<'a>;
}

/// Modules a walk must not traverse into.
///
/// Entries are matched against import specifiers and against module ids
/// (canonical paths). An entry `pkg` covers `pkg` itself and every subpath
/// `pkg/...`, so excluding a package also excludes deep imports into it, and
/// excluding a directory path excludes every module below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet {
    specifiers: BTreeSet<String>,
}

impl ExcludeSet {
    /// Creates an empty exclusion set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a specifier to the set.
    pub fn insert(&mut self, specifier: impl Into<String>) {
        self.specifiers.insert(specifier.into());
    }

    /// Returns `true` if `specifier` is excluded exactly or by package prefix.
    pub fn covers(&self, specifier: &str) -> bool {
        if self.specifiers.contains(specifier) {
            return true;
        }
        self.specifiers.iter().any(|ex| {
            specifier
                .strip_prefix(ex.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Returns `true` if nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Iterates over the excluded specifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.specifiers.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExcludeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            specifiers: iter.into_iter().map(Into::into).collect(),
        }
    }
}
