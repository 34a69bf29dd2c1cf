// src/utils/logging.rs
//! Logging configuration
//!
//! Uses `env_logger` with a compact single-line format. `RUST_LOG`
//! takes precedence over the level chosen on the command line.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem
///
/// # Arguments
/// * `verbose` - Default to Debug instead of Info when `RUST_LOG` is unset
pub fn init_logging(verbose: bool) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter_level(default_level(verbose));
    }

    builder.init();
}

fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Creates a logger builder with the shared line format
///
/// Format: `[<ts> <LEVEL> <module>:<line>] <message>`, written to stdout.
fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stdout);

    builder
}
