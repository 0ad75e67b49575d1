//! Module specifier resolution.
//!
//! Relative and absolute specifiers resolve against the importing file's
//! directory; bare specifiers resolve through `node_modules` directories,
//! walking up from the importer. Node built-ins are never resolved to files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Node.js core modules. These are provided by the runtime and never hashed.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Returns `true` for Node core module specifiers, including `node:` forms
/// and subpaths such as `fs/promises`.
pub fn is_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let root = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&root)
}

/// Returns `true` if the specifier names a file path rather than a package.
pub fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/')
}

/// Splits a bare specifier into its package name and optional subpath.
///
/// `lodash/fp` → (`lodash`, `Some("fp")`); `@scope/pkg/a/b` →
/// (`@scope/pkg`, `Some("a/b")`).
pub fn split_package(specifier: &str) -> (&str, Option<&str>) {
    let name_end = if specifier.starts_with('@') {
        specifier
            .match_indices('/')
            .nth(1)
            .map(|(i, _)| i)
            .unwrap_or(specifier.len())
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };
    let (name, rest) = specifier.split_at(name_end);
    let sub = rest.strip_prefix('/').filter(|s| !s.is_empty());
    (name, sub)
}

/// Resolves `specifier` imported from `from` to a canonical file path.
///
/// Returns `Ok(None)` for Node built-ins. Fails with
/// [`SourceError::Unresolved`] when no candidate file exists.
pub fn resolve(
    specifier: &str,
    from: &Path,
    extensions: &[String],
) -> Result<Option<PathBuf>, SourceError> {
    if is_builtin(specifier) && !is_path_specifier(specifier) {
        return Ok(None);
    }

    let base = from.parent().unwrap_or_else(|| Path::new(""));
    let found = if is_path_specifier(specifier) {
        resolve_file_or_dir(&base.join(specifier), extensions)
    } else {
        resolve_package(specifier, base, extensions)?
    };

    match found {
        Some(path) => path.canonicalize().map(Some).map_err(|e| SourceError::Read {
            path,
            source: e,
        }),
        None => Err(SourceError::Unresolved {
            specifier: specifier.to_string(),
            from: from.to_path_buf(),
        }),
    }
}

/// Tries `candidate` as a file, then with each extension appended, then as a
/// directory containing an `index` file.
fn resolve_file_or_dir(candidate: &Path, extensions: &[String]) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    if let Some(found) = try_extensions(candidate, extensions) {
        return Some(found);
    }
    if candidate.is_dir() {
        return try_extensions(&candidate.join("index"), extensions);
    }
    None
}

fn try_extensions(candidate: &Path, extensions: &[String]) -> Option<PathBuf> {
    extensions.iter().find_map(|ext| {
        let mut name: OsString = candidate.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        let path = PathBuf::from(name);
        path.is_file().then_some(path)
    })
}

/// Looks for the package in every `node_modules` directory from `base` up to
/// the filesystem root.
fn resolve_package(
    specifier: &str,
    base: &Path,
    extensions: &[String],
) -> Result<Option<PathBuf>, SourceError> {
    let (name, sub) = split_package(specifier);
    for dir in base.ancestors() {
        let pkg_dir = dir.join("node_modules").join(name);
        if !pkg_dir.is_dir() {
            continue;
        }
        if let Some(sub) = sub {
            return Ok(resolve_file_or_dir(&pkg_dir.join(sub), extensions));
        }
        if let Some(main) = package_main(&pkg_dir)? {
            if let Some(found) = resolve_file_or_dir(&pkg_dir.join(main), extensions) {
                return Ok(Some(found));
            }
        }
        return Ok(try_extensions(&pkg_dir.join("index"), extensions));
    }
    Ok(None)
}

/// Reads the `main` field of `<pkg_dir>/package.json`, if present.
fn package_main(pkg_dir: &Path) -> Result<Option<String>, SourceError> {
    let manifest = pkg_dir.join("package.json");
    if !manifest.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&manifest).map_err(|e| SourceError::Read {
        path: manifest.clone(),
        source: e,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| SourceError::PackageManifest {
            path: manifest,
            reason: e.to_string(),
        })?;
    Ok(value
        .get("main")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["js".to_string(), "json".to_string()]
    }

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn builtins() {
        assert!(is_builtin("fs"));
        assert!(is_builtin("fs/promises"));
        assert!(is_builtin("node:crypto"));
        assert!(!is_builtin("lodash"));
        assert!(!is_builtin("./fs"));
    }

    #[test]
    fn split_package_names() {
        assert_eq!(split_package("lodash"), ("lodash", None));
        assert_eq!(split_package("lodash/fp"), ("lodash", Some("fp")));
        assert_eq!(split_package("@scope/pkg"), ("@scope/pkg", None));
        assert_eq!(split_package("@scope/pkg/a/b"), ("@scope/pkg", Some("a/b")));
    }

    #[test]
    fn resolves_relative_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("lib/a.js"), "");

        let found = resolve("./lib/a", &main, &exts()).unwrap().unwrap();
        assert_eq!(found, dir.path().join("lib/a.js").canonicalize().unwrap());
    }

    #[test]
    fn resolves_exact_file() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("data.json"), "{}");

        let found = resolve("./data.json", &main, &exts()).unwrap().unwrap();
        assert!(found.ends_with("data.json"));
    }

    #[test]
    fn resolves_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("util/index.js"), "");

        let found = resolve("./util", &main, &exts()).unwrap().unwrap();
        assert!(found.ends_with("util/index.js"));
    }

    #[test]
    fn resolves_package_main() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("src/main.js");
        write(&main, "");
        let pkg = dir.path().join("node_modules/left-pad");
        write(&pkg.join("package.json"), r#"{"main": "lib/pad.js"}"#);
        write(&pkg.join("lib/pad.js"), "");

        let found = resolve("left-pad", &main, &exts()).unwrap().unwrap();
        assert!(found.ends_with("left-pad/lib/pad.js"));
    }

    #[test]
    fn resolves_package_index_without_main() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("node_modules/tiny/index.js"), "");

        let found = resolve("tiny", &main, &exts()).unwrap().unwrap();
        assert!(found.ends_with("tiny/index.js"));
    }

    #[test]
    fn resolves_package_subpath() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("node_modules/lodash/fp.js"), "");

        let found = resolve("lodash/fp", &main, &exts()).unwrap().unwrap();
        assert!(found.ends_with("lodash/fp.js"));
    }

    #[test]
    fn builtin_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        assert!(resolve("path", &main, &exts()).unwrap().is_none());
    }

    #[test]
    fn missing_file_is_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        let err = resolve("./nope", &main, &exts()).unwrap_err();
        assert!(matches!(err, SourceError::Unresolved { ref specifier, .. } if specifier == "./nope"));
    }

    #[test]
    fn bad_package_manifest_errors() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("node_modules/broken/package.json"), "{ nope");

        let err = resolve("broken", &main, &exts()).unwrap_err();
        assert!(matches!(err, SourceError::PackageManifest { .. }));
    }
}
