//! Incremental node delivery over a bounded channel.
//!
//! A walk reads every module from disk, so it runs on tokio's blocking pool
//! and hands nodes to the async consumer as they are produced. Dropping the
//! [`NodeStream`] closes the channel; the producer notices on its next send
//! and stops walking.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::error::SourceError;
use crate::node::DependencyNode;
use crate::source::{DependencySource, ExcludeSet};

/// Number of nodes buffered between producer and consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// The receiving end of a walk running on a blocking worker.
pub struct NodeStream {
    rx: mpsc::Receiver<Result<DependencyNode, SourceError>>,
    task: JoinHandle<()>,
}

impl NodeStream {
    /// Spawns a walk of `source` from `entry` with the default capacity.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(source: Arc<dyn DependencySource>, entry: PathBuf, exclude: ExcludeSet) -> Self {
        Self::spawn_with_capacity(source, entry, exclude, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Spawns a walk with an explicit channel capacity (minimum 1).
    pub fn spawn_with_capacity(
        source: Arc<dyn DependencySource>,
        entry: PathBuf,
        exclude: ExcludeSet,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::task::spawn_blocking(move || {
            for item in source.walk(&entry, &exclude) {
                let failed = item.is_err();
                if tx.blocking_send(item).is_err() {
                    tracing::debug!(entry = %entry.display(), "node consumer dropped, stopping walk");
                    return;
                }
                if failed {
                    return;
                }
            }
        });
        Self { rx, task }
    }

    /// Receives the next node, or `None` once the walk has finished.
    pub async fn next(&mut self) -> Option<Result<DependencyNode, SourceError>> {
        self.rx.recv().await
    }

    /// Waits for the producer to exit.
    ///
    /// Returns an error if the walk panicked instead of finishing normally.
    pub async fn finish(self) -> Result<(), JoinError> {
        drop(self.rx);
        self.task.await
    }
}
