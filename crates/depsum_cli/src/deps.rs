//! `depsum deps`: list the modules reachable from an entry file.

use std::path::Path;

use crate::options::{load_config, merge_exclude, script_graph};
use crate::{DepsArgs, GlobalArgs, ReportFormat};

/// Runs the `depsum deps` command, printing module ids in traversal order.
pub fn run(args: &DepsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let exclude = merge_exclude(&config, &args.exclude);
    let graph = script_graph(&config);

    let ids = graph.walk_all(Path::new(&args.entry), &exclude)?;
    tracing::debug!(modules = ids.len(), "dependency walk finished");

    match args.format {
        ReportFormat::Text => {
            for id in &ids {
                println!("{id}");
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&ids)?),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolvable_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("depsum.toml");
        std::fs::write(&config_path, "").unwrap();
        let args = DepsArgs {
            entry: dir.path().join("missing.js").to_string_lossy().into_owned(),
            exclude: Vec::new(),
            format: ReportFormat::Text,
        };
        let global = GlobalArgs {
            quiet: true,
            config: Some(config_path.to_string_lossy().into_owned()),
        };
        assert!(run(&args, &global).is_err());
    }
}
