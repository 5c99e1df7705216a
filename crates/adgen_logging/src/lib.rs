#![deny(missing_docs)]
//! Shared logging utilities for the adgen workspace.
//!
//! This crate provides the `adgen_*` logging macros used across the codebase,
//! the common `simplelog` configuration and a minimal test initializer for the
//! global logger.

use log::LevelFilter;
use simplelog::{Config, ConfigBuilder};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! adgen_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! adgen_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! adgen_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! adgen_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! adgen_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Logger configuration shared by every backend: RFC 3339 timestamps and
/// module targets only on errors.
pub fn shared_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        shared_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}
