//! Logging setup for the CLI.
//!
//! Logs always go to stderr so they never mix with `config show` output.
//! `RUST_LOG` takes precedence over both the config file and `--verbose`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Default filter directive, e.g. `info` or `datemark_core=debug`
    pub level: String,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
}

impl LogSettings {
    /// Merge the `[logging]` config section with the global CLI flags.
    pub fn resolve(config: &datemark_core::Config, verbose: bool, json_logs: bool) -> Self {
        let level = if verbose && !matches!(config.logging.level.as_str(), "trace") {
            "debug".to_string()
        } else {
            config.logging.level.clone()
        };
        Self {
            level,
            json: json_logs || config.logging.format.eq_ignore_ascii_case("json"),
        }
    }
}

/// Install the global subscriber.
pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the loaded config plus CLI overrides.
pub fn init_from_config(config: &datemark_core::Config, verbose: bool, json_logs: bool) {
    init(&LogSettings::resolve(config, verbose, json_logs));
}
