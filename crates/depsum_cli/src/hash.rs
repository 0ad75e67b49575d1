//! `depsum hash`: print the aggregate digest without touching the registry.

use std::path::Path;
use std::sync::Arc;

use depsum_cache::{HashAggregator, HashOutput};

use crate::options::{hash_options, load_config, script_graph};
use crate::{GlobalArgs, HashArgs, ReportFormat};

/// Runs the `depsum hash` command. Always exits 0 on success.
pub async fn run(args: &HashArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let options = hash_options(&config, args)?;
    let aggregator = HashAggregator::new(Arc::new(script_graph(&config)));

    let output = aggregator.compute_hash(Path::new(&args.entry), &options).await?;

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&output, args.snapshot)),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json(&output, args.snapshot))?
        ),
    }
    Ok(0)
}

fn render_text(output: &HashOutput, snapshot: bool) -> String {
    let mut text = format!("{}\n", output.digest);
    if snapshot {
        for (id, digest) in &output.snapshot {
            text.push_str(&format!("{digest}  {id}\n"));
        }
    }
    text
}

fn render_json(output: &HashOutput, snapshot: bool) -> serde_json::Value {
    if snapshot {
        serde_json::json!({ "digest": output.digest, "snapshot": output.snapshot })
    } else {
        serde_json::json!({ "digest": output.digest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsum_cache::{aggregate_digest, HashSnapshot};
    use depsum_common::Digest;

    fn output() -> HashOutput {
        let mut snapshot = HashSnapshot::new();
        snapshot.insert("/app/a.js".to_string(), Digest::of(b"a"));
        snapshot.insert("/app/b.js".to_string(), Digest::of(b"b"));
        HashOutput {
            digest: aggregate_digest(&snapshot),
            snapshot,
        }
    }

    #[test]
    fn text_digest_only() {
        let out = output();
        assert_eq!(render_text(&out, false), format!("{}\n", out.digest));
    }

    #[test]
    fn text_with_snapshot_lists_modules_in_order() {
        let text = render_text(&output(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("/app/a.js"));
        assert!(lines[2].ends_with("/app/b.js"));
    }

    #[test]
    fn json_snapshot_is_optional() {
        let out = output();
        assert!(render_json(&out, false).get("snapshot").is_none());
        let json = render_json(&out, true);
        assert_eq!(json["snapshot"]["/app/a.js"], Digest::of(b"a").to_hex());
    }
}
