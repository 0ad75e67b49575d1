//! A single module reachable from an entry file.

/// One distinct module produced by a [`DependencySource`](crate::DependencySource).
///
/// Identity is the `id`, never the content: two nodes with the same id are the
/// same module. For file-backed sources the id is the canonical absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    /// Stable, unique module identifier.
    pub id: String,
    /// The exact bytes read to parse the module.
    pub content: Vec<u8>,
}

impl DependencyNode {
    /// Creates a node from an id and its raw content.
    pub fn new(id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}
