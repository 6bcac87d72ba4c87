//! Logger setup: `log` facade backed by env_logger

use log::LevelFilter;

/// Map a level name to a filter. Unknown names fall back to info.
pub fn level_filter(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Install the global logger. Logs go to stderr so stdout stays parseable.
/// `RUST_LOG` still overrides per-module levels.
pub fn setup_logger(level: &str) {
    let _ = env_logger::builder()
        .filter_level(level_filter(level))
        .parse_default_env()
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .try_init();
}
