//! Logging setup.

use log::LevelFilter;

/// Initialize the logger with the specified level, honoring `RUST_LOG`
/// overrides from the environment.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}
