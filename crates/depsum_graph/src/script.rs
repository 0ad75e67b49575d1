//! A [`DependencySource`] for CommonJS and ES module graphs on disk.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::node::DependencyNode;
use crate::resolve::resolve;
use crate::scan::extract_specifiers;
use crate::source::{DependencySource, ExcludeSet, NodeIter};

/// Extensions whose files are scanned for imports. Everything else (JSON,
/// stylesheets, assets) is a leaf: hashed but not followed.
const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// Default module limit for a single walk.
pub const DEFAULT_MAX_MODULES: usize = 100_000;

/// Resolution settings for [`ScriptGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptGraphOptions {
    /// Extensions tried, in order, for extensionless specifiers.
    pub extensions: Vec<String>,
    /// Upper bound on the number of modules a walk may produce.
    pub max_modules: usize,
}

impl Default for ScriptGraphOptions {
    fn default() -> Self {
        Self {
            extensions: ["js", "mjs", "cjs", "json"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            max_modules: DEFAULT_MAX_MODULES,
        }
    }
}

/// Walks the import graph of a JavaScript entry file breadth-first.
///
/// Node ids are canonical absolute paths. The entry file is always the first
/// node; each reachable file is yielded once.
#[derive(Debug, Clone, Default)]
pub struct ScriptGraph {
    options: ScriptGraphOptions,
}

impl ScriptGraph {
    /// Creates a resolver with the given options.
    pub fn new(options: ScriptGraphOptions) -> Self {
        Self { options }
    }

    /// Returns the resolver options.
    pub fn options(&self) -> &ScriptGraphOptions {
        &self.options
    }

    /// Walks the whole graph and returns the module ids in traversal order.
    pub fn walk_all(&self, entry: &Path, exclude: &ExcludeSet) -> Result<Vec<String>, SourceError> {
        self.walk(entry, exclude)
            .map(|node| node.map(|n| n.id))
            .collect()
    }
}

impl DependencySource for ScriptGraph {
    fn walk<'a>(&'a self, entry: &'a Path, exclude: &'a ExcludeSet) -> NodeIter<'a> {
        Box::new(Walk::new(&self.options, entry, exclude))
    }
}

/// Lazy breadth-first traversal state.
struct Walk<'a> {
    options: &'a ScriptGraphOptions,
    exclude: &'a ExcludeSet,
    queue: VecDeque<PathBuf>,
    seen: HashSet<PathBuf>,
    produced: usize,
    done: bool,
    pending_error: Option<SourceError>,
}

impl<'a> Walk<'a> {
    fn new(options: &'a ScriptGraphOptions, entry: &Path, exclude: &'a ExcludeSet) -> Self {
        let mut walk = Self {
            options,
            exclude,
            queue: VecDeque::new(),
            seen: HashSet::new(),
            produced: 0,
            done: false,
            pending_error: None,
        };
        match entry.canonicalize() {
            Ok(path) => {
                walk.seen.insert(path.clone());
                if exclude.covers(&path.to_string_lossy()) {
                    tracing::trace!(id = %path.display(), "entry excluded");
                } else {
                    walk.queue.push_back(path);
                }
            }
            Err(e) => {
                walk.pending_error = Some(SourceError::Read {
                    path: entry.to_path_buf(),
                    source: e,
                });
            }
        }
        walk
    }

    fn visit(&mut self, path: PathBuf) -> Result<DependencyNode, SourceError> {
        if self.produced >= self.options.max_modules {
            return Err(SourceError::TooManyModules {
                max: self.options.max_modules,
            });
        }

        let content = std::fs::read(&path).map_err(|e| SourceError::Read {
            path: path.clone(),
            source: e,
        })?;

        if is_script(&path) {
            let text = std::str::from_utf8(&content)
                .map_err(|_| SourceError::NotUtf8 { path: path.clone() })?;
            for specifier in extract_specifiers(text) {
                if self.exclude.covers(&specifier) {
                    tracing::trace!(%specifier, "excluded");
                    continue;
                }
                if let Some(dep) = resolve(&specifier, &path, &self.options.extensions)? {
                    if self.exclude.covers(&dep.to_string_lossy()) {
                        tracing::trace!(id = %dep.display(), "excluded");
                        continue;
                    }
                    if self.seen.insert(dep.clone()) {
                        self.queue.push_back(dep);
                    }
                }
            }
        }

        self.produced += 1;
        Ok(DependencyNode::new(path.to_string_lossy(), content))
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<DependencyNode, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(err) = self.pending_error.take() {
            self.done = true;
            return Some(Err(err));
        }
        let path = self.queue.pop_front()?;
        let result = self.visit(path);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}
