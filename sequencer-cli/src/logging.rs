//! Logger initialization. Parses `RUST_LOG` the way the teacher's
//! `proteus-cli/src/logging.rs` does, minus the TUI ring-buffer and
//! stderr-capture machinery that existed only to feed its `ratatui` info
//! screen — this crate has no TUI, so the logger is a plain stderr sink.

use log::LevelFilter;

/// Initialize the global logger from `RUST_LOG` (defaulting to `info`).
pub fn init() {
    let level = match std::env::var("RUST_LOG") {
        Ok(level) => match level.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        },
        Err(_) => LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level).init();
}
