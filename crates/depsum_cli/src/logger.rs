//! Logging setup for the depsum CLI.
//!
//! Logs go to stderr so that stdout carries only command results and stays
//! safe to pipe or parse.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "depsum_cli=debug,depsum_cache=debug,depsum_graph=debug,depsum_config=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "depsum_cli=info,depsum_cache=info,depsum_graph=info,depsum_config=info";

/// Installs the global tracing subscriber.
///
/// The level is picked in this order:
/// 1. `--verbose`: debug for the depsum crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`, if set and valid
/// 4. info for the depsum crates
pub fn init_logger(verbose: bool, quiet: bool) {
    let filter = select_filter(verbose, quiet);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn select_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
