//! Logging setup using the `log` facade and `env_logger` backend.
//!
//! The level comes from `RUST_LOG` when it is set. Otherwise the CLI flags
//! decide: `--quiet` shows errors only, the default is info, `-v` is debug
//! and `-vv` is trace. Flag-driven levels apply to utilbox itself; other
//! crates (`ignore`, `globset`, ...) stay at warn so `-v` is readable.
//!
//! Everything is written to stderr, never mixed with command output.
//!
//! ```rust,no_run
//! use utilbox::logging::init_logging;
//!
//! init_logging(1, false); // -v
//! log::debug!("visible");
//! ```

use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

/// Where the active filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterSource {
    Env,
    Flags(LevelFilter),
}

impl FilterSource {
    fn detect(verbose: u8, quiet: bool) -> Self {
        if std::env::var_os("RUST_LOG").is_some() {
            Self::Env
        } else {
            Self::Flags(level_for(verbose, quiet))
        }
    }
}

/// Initialize logging from the CLI verbosity flags.
///
/// Only the first call installs a logger; later calls are no-ops, which
/// keeps repeated `run_app` invocations (as in tests) safe.
pub fn init_logging(verbose: u8, quiet: bool) {
    let source = FilterSource::detect(verbose, quiet);

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    match source {
        FilterSource::Env => {
            builder.parse_default_env();
        }
        FilterSource::Flags(level) => {
            builder
                .filter_level(level.min(LevelFilter::Warn))
                .filter_module(CRATE_NAME, level);
        }
    }

    if cfg!(debug_assertions) {
        debug_format(&mut builder, verbose >= 1);
    } else {
        release_format(&mut builder);
    }

    if builder.try_init().is_ok() {
        log::debug!("Logging initialized ({:?})", source);
    }
}

/// Level selected by `-q` / `-v` flags; quiet wins.
fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

fn debug_format(builder: &mut Builder, with_module: bool) {
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        let timestamp = buf.timestamp_seconds();
        if with_module {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} [{}] {}",
                record.level(),
                record.module_path().unwrap_or("?"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{timestamp} {style}{:<5}{style:#} {}",
                record.level(),
                record.args()
            )
        }
    });
}

fn release_format(builder: &mut Builder) {
    builder.format(|buf, record| {
        let style = buf.default_level_style(record.level());
        writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
    });
}

/// Name of the currently active maximum log level.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
