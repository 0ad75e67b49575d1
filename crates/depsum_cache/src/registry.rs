//! Persisted map of entry file → last aggregate digest.
//!
//! The registry is a flat JSON object keyed by absolute entry path:
//!
//! ```json
//! { "/app/src/main.js": "6f1ed002ab5595859014ebf0951522d9" }
//! ```
//!
//! One file can serve any number of entry points; an update only touches its
//! own key. The file is always rewritten in full. Load and persist are not
//! coordinated across processes: two concurrent runs against the same file
//! race, and the last writer wins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use depsum_common::Digest;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Registry file name used when none is configured.
pub const DEFAULT_REGISTRY_FILE: &str = ".depsum-hash";

/// Outcome of comparing a fresh digest against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The stored digest equals the fresh one.
    Hit,
    /// No stored digest, or a different one.
    Miss,
}

impl Verdict {
    /// Returns `true` for a miss, i.e. the sources changed.
    pub fn is_changed(self) -> bool {
        self == Verdict::Miss
    }
}

/// In-memory copy of the change registry.
///
/// Values are kept as strings rather than parsed digests so that entries
/// written by other tools (or another hash function) survive a rewrite; such
/// an entry simply never matches and classifies as a miss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: BTreeMap<String, String>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registry at `path`, creating an empty file if it is absent.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        Self::load_tracked(path).map(|(registry, _)| registry)
    }

    /// Like [`Registry::load`], also reporting whether the file was created.
    ///
    /// An absent file is created holding `{}`, so later runs observe an
    /// existing-but-empty registry rather than absence again. An existing file
    /// that does not parse is an error and is never reset.
    pub fn load_tracked(path: &Path) -> Result<(Self, bool), RegistryError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let registry = Self::new();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| RegistryError::Io {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }
                registry.persist(path)?;
                tracing::warn!(path = %path.display(), "registry not found, created an empty one");
                return Ok((registry, true));
            }
            Err(e) => {
                return Err(RegistryError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        if !metadata.is_file() {
            return Err(RegistryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| RegistryError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let registry = serde_json::from_slice(&bytes).map_err(|e| RegistryError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok((registry, false))
    }

    /// Compares `digest` with the stored digest for `entry`.
    ///
    /// An entry never seen before is a miss.
    pub fn classify(&self, entry: &Path, digest: &Digest) -> Verdict {
        match self.get(entry) {
            Some(stored) if stored == digest.to_hex() => Verdict::Hit,
            _ => Verdict::Miss,
        }
    }

    /// Returns a registry identical to `self` except that `entry` maps to `digest`.
    pub fn update(mut self, entry: &Path, digest: Digest) -> Self {
        self.entries.insert(entry_key(entry), digest.to_hex());
        self
    }

    /// Writes the full registry to `path`.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the target, so readers see either the old or the new
    /// registry, never a torn write. An existing registry reached through a
    /// symlink is replaced at its real location and keeps its permissions.
    pub fn persist(&self, path: &Path) -> Result<(), RegistryError> {
        let io_err = |source: std::io::Error| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut json = serde_json::to_string_pretty(self).map_err(|e| io_err(e.into()))?;
        json.push('\n');

        let (target, permissions) = match std::fs::canonicalize(path) {
            Ok(real) => {
                let permissions = std::fs::metadata(&real).map_err(io_err)?.permissions();
                (real, Some(permissions))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (path.to_path_buf(), None),
            Err(e) => return Err(io_err(e)),
        };

        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        let permissions = match permissions {
            Some(permissions) => permissions,
            None => new_file_permissions(tmp.as_file()).map_err(io_err)?,
        };
        tmp.as_file().set_permissions(permissions).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&target).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Returns the stored digest string for `entry`, if any.
    pub fn get(&self, entry: &Path) -> Option<&str> {
        self.entries.get(&entry_key(entry)).map(String::as_str)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(entry path, digest string)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Permissions for a freshly created registry: world-readable like any file
/// written with `std::fs::write`, rather than the private mode of a temp file.
#[cfg(unix)]
fn new_file_permissions(file: &std::fs::File) -> std::io::Result<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = file.metadata()?.permissions();
    permissions.set_mode(0o644);
    Ok(permissions)
}

#[cfg(not(unix))]
fn new_file_permissions(file: &std::fs::File) -> std::io::Result<std::fs::Permissions> {
    Ok(file.metadata()?.permissions())
}

/// Registry key for an entry path.
fn entry_key(entry: &Path) -> String {
    entry.to_string_lossy().into_owned()
}
