//! Change detection orchestrator.
//!
//! The `ChangeDetector` ties the aggregator and the registry together: it
//! hashes the graph behind an entry file, compares the digest with the one
//! stored for that entry, and stores the fresh digest back. A run walks
//! `Start → Resolving → Hashing → Comparing → Updating → Done`; any failure
//! moves it to `Errored` and is returned to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use depsum_common::Digest;
use depsum_graph::{DependencySource, ExcludeSet};
use serde::Serialize;

use crate::aggregate::{resolve_entry, HashAggregator, HashOptions, HashSnapshot};
use crate::error::{DetectError, RegistryError};
use crate::registry::{Registry, Verdict, DEFAULT_REGISTRY_FILE};

/// Phase of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectState {
    /// Nothing done yet.
    Start,
    /// Canonicalizing the entry file.
    Resolving,
    /// Computing the aggregate digest.
    Hashing,
    /// Loading the registry and classifying the digest.
    Comparing,
    /// Writing the fresh digest back.
    Updating,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Errored,
}

/// Options for a detection run.
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Registry file, relative to the working directory unless absolute.
    pub hash_file: PathBuf,
    /// Specifiers not traversed.
    pub exclude: ExcludeSet,
    /// Extra files that participate in the digest.
    pub include: Vec<PathBuf>,
    /// Report a missing entry file as unchanged instead of failing.
    pub skip_missing: bool,
    /// Upper bound on the hash computation.
    pub timeout: Option<Duration>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            hash_file: PathBuf::from(DEFAULT_REGISTRY_FILE),
            exclude: ExcludeSet::new(),
            include: Vec::new(),
            skip_missing: false,
            timeout: None,
        }
    }
}

impl DetectOptions {
    /// The subset of options that feeds the aggregator.
    pub fn hash_options(&self) -> HashOptions {
        HashOptions {
            exclude: self.exclude.clone(),
            include: self.include.clone(),
            timeout: self.timeout,
        }
    }
}

/// Everything a detection run learned.
#[derive(Debug, Clone, Serialize)]
pub struct DetectReport {
    /// Canonical entry path, or the path as given when skipped.
    pub entry: PathBuf,
    /// `true` when the sources changed since the last run.
    pub changed: bool,
    /// Classification against the registry; `None` when skipped.
    pub verdict: Option<Verdict>,
    /// Fresh aggregate digest; `None` when skipped.
    pub digest: Option<Digest>,
    /// Value stored for the entry before this run, if any.
    pub previous: Option<String>,
    /// Per-module digests behind `digest`.
    pub snapshot: HashSnapshot,
    /// Whether the registry file was created by this run.
    pub registry_created: bool,
    /// Whether the run was skipped because the entry file is missing.
    pub skipped: bool,
    /// States walked, in order.
    pub trail: Vec<DetectState>,
}

impl DetectReport {
    fn skipped(entry: &Path, trail: Vec<DetectState>) -> Self {
        Self {
            entry: entry.to_path_buf(),
            changed: false,
            verdict: None,
            digest: None,
            previous: None,
            snapshot: HashSnapshot::new(),
            registry_created: false,
            skipped: true,
            trail,
        }
    }
}

/// Decides whether the sources behind an entry file changed since the last run.
#[derive(Clone)]
pub struct ChangeDetector {
    aggregator: HashAggregator,
}

impl ChangeDetector {
    /// Creates a detector resolving modules through `source`.
    pub fn new(source: Arc<dyn DependencySource>) -> Self {
        Self {
            aggregator: HashAggregator::new(source),
        }
    }

    /// Returns `true` if the sources changed, updating the registry either way.
    pub async fn detect(&self, entry: &Path, options: &DetectOptions) -> Result<bool, DetectError> {
        self.detect_report(entry, options).await.map(|r| r.changed)
    }

    /// Like [`ChangeDetector::detect`], returning the full report.
    ///
    /// On error the registry is left as it was, apart from the one-time
    /// creation of an absent registry file.
    pub async fn detect_report(
        &self,
        entry: &Path,
        options: &DetectOptions,
    ) -> Result<DetectReport, DetectError> {
        let mut trail = Trail::new(entry);
        match self.run(entry, options, &mut trail).await {
            Ok(report) => Ok(report),
            Err(e) => {
                trail.enter(DetectState::Errored);
                tracing::debug!(entry = %entry.display(), error = %e, "change detection failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        entry: &Path,
        options: &DetectOptions,
        trail: &mut Trail,
    ) -> Result<DetectReport, DetectError> {
        trail.enter(DetectState::Resolving);
        if options.skip_missing && !entry.exists() {
            tracing::info!(entry = %entry.display(), "entry file missing, skipping");
            trail.enter(DetectState::Done);
            return Ok(DetectReport::skipped(entry, trail.take()));
        }
        let canonical = resolve_entry(entry)?;

        trail.enter(DetectState::Hashing);
        let output = self
            .aggregator
            .compute_hash(&canonical, &options.hash_options())
            .await?;

        trail.enter(DetectState::Comparing);
        let hash_file = options.hash_file.clone();
        let (registry, registry_created) =
            on_blocking_pool(&options.hash_file, move || Registry::load_tracked(&hash_file)).await?;
        let previous = registry.get(&canonical).map(str::to_string);
        let verdict = registry.classify(&canonical, &output.digest);

        trail.enter(DetectState::Updating);
        let hash_file = options.hash_file.clone();
        let updated = registry.update(&canonical, output.digest);
        on_blocking_pool(&options.hash_file, move || updated.persist(&hash_file)).await?;

        trail.enter(DetectState::Done);
        let changed = verdict.is_changed();
        tracing::info!(
            entry = %canonical.display(),
            ?verdict,
            digest = %output.digest,
            "{}",
            if changed { "changed" } else { "unchanged" }
        );

        Ok(DetectReport {
            entry: canonical,
            changed,
            verdict: Some(verdict),
            digest: Some(output.digest),
            previous,
            snapshot: output.snapshot,
            registry_created,
            skipped: false,
            trail: trail.take(),
        })
    }
}

/// Runs registry file I/O off the async worker threads.
async fn on_blocking_pool<T, F>(path: &Path, f: F) -> Result<T, DetectError>
where
    F: FnOnce() -> Result<T, RegistryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DetectError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?
        .map_err(DetectError::from)
}

/// Records and logs state transitions of one run.
struct Trail {
    entry: PathBuf,
    states: Vec<DetectState>,
}

impl Trail {
    fn new(entry: &Path) -> Self {
        Self {
            entry: entry.to_path_buf(),
            states: vec![DetectState::Start],
        }
    }

    fn enter(&mut self, state: DetectState) {
        let from = self.states.last().copied().unwrap_or(DetectState::Start);
        tracing::debug!(entry = %self.entry.display(), ?from, to = ?state, "detector transition");
        self.states.push(state);
    }

    fn take(&mut self) -> Vec<DetectState> {
        std::mem::take(&mut self.states)
    }
}
