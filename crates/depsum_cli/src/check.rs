//! `depsum check`: classify an entry file as changed or unchanged.
//!
//! Exit codes let shell scripts branch without parsing output: 0 when
//! unchanged (or skipped), [`EXIT_CHANGED`] when changed, 1 on error.

use std::path::Path;
use std::sync::Arc;

use depsum_cache::{ChangeDetector, DetectReport};

use crate::options::{detect_options, load_config, script_graph};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Exit code reported when the sources changed.
pub const EXIT_CHANGED: i32 = 10;

/// Runs the `depsum check` command.
pub async fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let options = detect_options(&config, args)?;
    let detector = ChangeDetector::new(Arc::new(script_graph(&config)));

    let report = detector.detect_report(Path::new(&args.entry), &options).await?;

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                println!("{}", render_text(&report));
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report_json(&report))?),
    }

    Ok(exit_code(&report))
}

fn exit_code(report: &DetectReport) -> i32 {
    if report.changed {
        EXIT_CHANGED
    } else {
        0
    }
}

fn render_text(report: &DetectReport) -> String {
    if report.skipped {
        return format!("unchanged (skipped: {} does not exist)", report.entry.display());
    }
    let status = if report.changed { "changed" } else { "unchanged" };
    match &report.digest {
        Some(digest) => format!("{status} {digest} {}", report.entry.display()),
        None => status.to_string(),
    }
}

fn report_json(report: &DetectReport) -> serde_json::Value {
    serde_json::json!({
        "entry": report.entry,
        "changed": report.changed,
        "skipped": report.skipped,
        "verdict": report.verdict,
        "digest": report.digest,
        "previous": report.previous,
        "modules": report.snapshot.len(),
        "registry_created": report.registry_created,
    })
}
