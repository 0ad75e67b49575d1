//! An in-memory [`DependencySource`].

use std::path::Path;

use crate::node::DependencyNode;
use crate::source::{DependencySource, ExcludeSet, NodeIter};

/// A fixed list of nodes, yielded in insertion order regardless of the entry.
///
/// Useful for tests and for embedders that already hold module contents
/// (e.g. from a bundler's own module graph). Nodes whose id is covered by the
/// exclusion set are skipped.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    nodes: Vec<DependencyNode>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node (builder style).
    pub fn with(mut self, id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.nodes.push(DependencyNode::new(id, content));
        self
    }

    /// Adds a node.
    pub fn push(&mut self, node: DependencyNode) {
        self.nodes.push(node);
    }

    /// Returns the nodes in yield order.
    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }
}

impl FromIterator<DependencyNode> for MemorySource {
    fn from_iter<I: IntoIterator<Item = DependencyNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl DependencySource for MemorySource {
    fn walk<'a>(&'a self, _entry: &'a Path, exclude: &'a ExcludeSet) -> NodeIter<'a> {
        Box::new(
            self.nodes
                .iter()
                .filter(move |n| !exclude.covers(&n.id))
                .cloned()
                .map(Ok),
        )
    }
}
