//! Aggregate digests over a dependency graph.
//!
//! Each module delivered by the [`DependencySource`] is hashed on arrival and
//! recorded under its id. Once the walk ends, include files are hashed too, and
//! the sorted per-module digests are hashed together into one aggregate. The
//! aggregate depends only on the multiset of per-module digests, so it is the
//! same whatever order the modules arrive in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use depsum_common::Digest;
use depsum_graph::{DependencyNode, DependencySource, ExcludeSet, NodeStream};

use crate::error::HashError;

/// Per-module digests of one run, keyed by module id (or include path).
pub type HashSnapshot = BTreeMap<String, Digest>;

/// What participates in an aggregate digest.
#[derive(Debug, Clone, Default)]
pub struct HashOptions {
    /// Specifiers the dependency source must not traverse into.
    pub exclude: ExcludeSet,
    /// Extra files outside the graph that must participate.
    pub include: Vec<PathBuf>,
    /// Upper bound on the whole computation.
    pub timeout: Option<Duration>,
}

/// Result of a successful hash computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOutput {
    /// Order-independent digest of every module and include file.
    pub digest: Digest,
    /// The per-module digests the aggregate was computed from.
    pub snapshot: HashSnapshot,
}

/// Reduces a dependency graph to one deterministic digest.
#[derive(Clone)]
pub struct HashAggregator {
    source: Arc<dyn DependencySource>,
}

impl HashAggregator {
    /// Creates an aggregator pulling modules from `source`.
    pub fn new(source: Arc<dyn DependencySource>) -> Self {
        Self { source }
    }

    /// Computes the aggregate digest of the graph rooted at `entry`.
    ///
    /// The entry is canonicalized first, so relative and absolute spellings of
    /// the same file produce the same result. Any traversal or include error
    /// aborts the computation; a partial digest is never returned.
    pub async fn compute_hash(
        &self,
        entry: &Path,
        options: &HashOptions,
    ) -> Result<HashOutput, HashError> {
        let entry = resolve_entry(entry)?;
        match options.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(entry, options))
                .await
                .map_err(|_| HashError::Timeout { limit })?,
            None => self.run(entry, options).await,
        }
    }

    async fn run(&self, entry: PathBuf, options: &HashOptions) -> Result<HashOutput, HashError> {
        let mut snapshot = HashSnapshot::new();
        let mut stream = NodeStream::spawn(
            Arc::clone(&self.source),
            entry.clone(),
            options.exclude.clone(),
        );

        while let Some(item) = stream.next().await {
            record_node(&mut snapshot, &item?);
        }
        stream
            .finish()
            .await
            .map_err(|e| HashError::TraversalAborted {
                reason: e.to_string(),
            })?;

        let modules = snapshot.len();
        for path in &options.include {
            let (key, digest) = hash_include(path).await?;
            snapshot.insert(key, digest);
        }

        let digest = aggregate_digest(&snapshot);
        tracing::debug!(
            entry = %entry.display(),
            modules,
            includes = options.include.len(),
            %digest,
            "computed aggregate digest"
        );
        Ok(HashOutput { digest, snapshot })
    }
}

/// Records the digest of one module, returning the node untouched.
///
/// A repeated id overwrites the earlier digest (last write wins).
pub fn record_node<'n>(snapshot: &mut HashSnapshot, node: &'n DependencyNode) -> &'n DependencyNode {
    let digest = Digest::of(&node.content);
    tracing::trace!(id = %node.id, %digest, "hashed module");
    snapshot.insert(node.id.clone(), digest);
    node
}

/// Folds a sequence of nodes into `snapshot`, returning how many were seen.
pub fn fold_nodes<I>(snapshot: &mut HashSnapshot, nodes: I) -> usize
where
    I: IntoIterator<Item = DependencyNode>,
{
    let mut seen = 0;
    for node in nodes {
        record_node(snapshot, &node);
        seen += 1;
    }
    seen
}

/// Hashes the sorted, concatenated hex digests of a snapshot.
///
/// Keys play no part: only the multiset of digest values matters.
pub fn aggregate_digest(snapshot: &HashSnapshot) -> Digest {
    let mut hexes: Vec<String> = snapshot.values().map(Digest::to_hex).collect();
    hexes.sort_unstable();
    Digest::of(hexes.concat().as_bytes())
}

/// Canonicalizes an entry path, requiring an existing regular file.
pub fn resolve_entry(entry: &Path) -> Result<PathBuf, HashError> {
    let metadata = std::fs::metadata(entry).map_err(|_| HashError::NotFound {
        path: entry.to_path_buf(),
    })?;
    if !metadata.is_file() {
        return Err(HashError::NotARegularFile {
            path: entry.to_path_buf(),
        });
    }
    entry.canonicalize().map_err(|_| HashError::NotFound {
        path: entry.to_path_buf(),
    })
}

/// Hashes one include file, keyed by its canonical path.
async fn hash_include(path: &Path) -> Result<(String, Digest), HashError> {
    let missing = || HashError::IncludeMissing {
        path: path.to_path_buf(),
    };
    let metadata = tokio::fs::metadata(path).await.map_err(|_| missing())?;
    if !metadata.is_file() {
        return Err(missing());
    }
    let canonical = tokio::fs::canonicalize(path).await.map_err(|_| missing())?;
    let content = tokio::fs::read(&canonical)
        .await
        .map_err(|e| HashError::IncludeRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok((canonical.to_string_lossy().into_owned(), Digest::of(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsum_graph::{MemorySource, NodeIter, SourceError};

    fn snapshot_of(pairs: &[(&str, &str)]) -> HashSnapshot {
        pairs
            .iter()
            .map(|(id, content)| (id.to_string(), Digest::of(content.as_bytes())))
            .collect()
    }

    #[test]
    fn aggregate_ignores_keys() {
        let a = snapshot_of(&[("a.js", "one"), ("b.js", "two")]);
        let b = snapshot_of(&[("x.js", "two"), ("y.js", "one")]);
        assert_eq!(aggregate_digest(&a), aggregate_digest(&b));
    }

    #[test]
    fn aggregate_sensitive_to_content() {
        let a = snapshot_of(&[("a.js", "const a = 1;")]);
        let b = snapshot_of(&[("a.js", "const a = 2;")]);
        assert_ne!(aggregate_digest(&a), aggregate_digest(&b));
    }

    #[test]
    fn aggregate_matches_sorted_concatenation() {
        let snap = snapshot_of(&[("a", "one"), ("b", "two")]);
        let mut hexes: Vec<String> = snap.values().map(|d| d.to_string()).collect();
        hexes.sort();
        assert_eq!(aggregate_digest(&snap), Digest::of(hexes.concat().as_bytes()));
    }

    #[test]
    fn fold_counts_and_dedups() {
        let mut snap = HashSnapshot::new();
        let nodes = vec![
            DependencyNode::new("a", "1"),
            DependencyNode::new("b", "2"),
            DependencyNode::new("a", "1"),
        ];
        assert_eq!(fold_nodes(&mut snap, nodes), 3);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn record_node_passes_node_through() {
        let mut snap = HashSnapshot::new();
        let node = DependencyNode::new("a", "content");
        let out = record_node(&mut snap, &node);
        assert_eq!(out, &node);
        assert_eq!(snap["a"], Digest::of(b"content"));
    }

    #[test]
    fn resolve_entry_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_entry(dir.path()).unwrap_err();
        assert!(matches!(err, HashError::NotARegularFile { .. }));
    }

    #[test]
    fn resolve_entry_rejects_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_entry(&dir.path().join("nope.js")).unwrap_err();
        assert!(matches!(err, HashError::NotFound { .. }));
    }

    fn entry_file(dir: &Path) -> PathBuf {
        let entry = dir.join("main.js");
        std::fs::write(&entry, "entry").unwrap();
        entry
    }

    #[tokio::test]
    async fn memory_graph_digest() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_file(dir.path());
        let source = MemorySource::new().with("a", "1").with("b", "2");
        let agg = HashAggregator::new(Arc::new(source));

        let out = agg.compute_hash(&entry, &HashOptions::default()).await.unwrap();
        assert_eq!(out.snapshot.len(), 2);
        assert_eq!(out.digest, aggregate_digest(&out.snapshot));
    }

    #[tokio::test]
    async fn includes_are_keyed_by_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_file(dir.path());
        let config = dir.path().join("package.json");
        std::fs::write(&config, "{}").unwrap();

        let agg = HashAggregator::new(Arc::new(MemorySource::new().with("a", "1")));
        let options = HashOptions {
            include: vec![config.clone()],
            ..HashOptions::default()
        };
        let out = agg.compute_hash(&entry, &options).await.unwrap();
        let key = config.canonicalize().unwrap().to_string_lossy().into_owned();
        assert_eq!(out.snapshot[&key], Digest::of(b"{}"));
    }

    #[tokio::test]
    async fn missing_include_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_file(dir.path());
        let agg = HashAggregator::new(Arc::new(MemorySource::new()));
        let options = HashOptions {
            include: vec![dir.path().join("absent.json")],
            ..HashOptions::default()
        };
        let err = agg.compute_hash(&entry, &options).await.unwrap_err();
        assert!(matches!(err, HashError::IncludeMissing { .. }));
    }

    #[tokio::test]
    async fn directory_include_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_file(dir.path());
        let agg = HashAggregator::new(Arc::new(MemorySource::new()));
        let options = HashOptions {
            include: vec![dir.path().to_path_buf()],
            ..HashOptions::default()
        };
        let err = agg.compute_hash(&entry, &options).await.unwrap_err();
        assert!(matches!(err, HashError::IncludeMissing { .. }));
    }

    struct FailsAfterOne;

    impl DependencySource for FailsAfterOne {
        fn walk<'a>(&'a self, _entry: &'a Path, _exclude: &'a ExcludeSet) -> NodeIter<'a> {
            Box::new(
                vec![
                    Ok(DependencyNode::new("a", "1")),
                    Err(SourceError::Unresolved {
                        specifier: "./b".to_string(),
                        from: PathBuf::from("a"),
                    }),
                ]
                .into_iter(),
            )
        }
    }

    #[tokio::test]
    async fn traversal_error_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_file(dir.path());
        let agg = HashAggregator::new(Arc::new(FailsAfterOne));
        let err = agg
            .compute_hash(&entry, &HashOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HashError::Source(SourceError::Unresolved { .. })));
    }

    struct Panics;

    impl DependencySource for Panics {
        fn walk<'a>(&'a self, _entry: &'a Path, _exclude: &'a ExcludeSet) -> NodeIter<'a> {
            panic!("resolver bug");
        }
    }

    #[tokio::test]
    async fn panicking_source_is_traversal_aborted() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_file(dir.path());
        let agg = HashAggregator::new(Arc::new(Panics));
        let err = agg
            .compute_hash(&entry, &HashOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HashError::TraversalAborted { .. }));
    }
}
