#![deny(missing_docs)]
//! Shared logging utilities for the feed workspace.
//!
//! This crate provides the `feed_*` logging macros used across the codebase,
//! the process logger initialization used by the server binary, and a minimal
//! test initializer for the global logger.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! feed_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! feed_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! feed_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! feed_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! feed_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to the terminal (stdout/stderr).
    #[default]
    Terminal,
    /// Append to the configured log file.
    File,
    /// Write to both the terminal and the log file.
    Both,
}

/// Error returned when a log destination name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log destination '{0}' (expected terminal, file or both)")]
pub struct UnknownDestination(pub String);

impl FromStr for LogDestination {
    type Err = UnknownDestination;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminal" | "stdout" => Ok(Self::Terminal),
            "file" => Ok(Self::File),
            "both" => Ok(Self::Both),
            _ => Err(UnknownDestination(s.to_string())),
        }
    }
}

/// Logger settings consumed by [`initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Maximum level written by every logger.
    pub level: LevelFilter,
    /// Where log records go.
    pub destination: LogDestination,
    /// File used by [`LogDestination::File`] and [`LogDestination::Both`].
    pub file_path: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            destination: LogDestination::Terminal,
            file_path: PathBuf::from("./feed.log"),
        }
    }
}

/// Initialize the process logger.
///
/// When the log file cannot be opened, file output is skipped and a warning is
/// printed to stderr; terminal output (if requested) still works.
pub fn initialize(settings: &LogSettings) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match settings.destination {
        LogDestination::Terminal => vec![terminal_logger(settings.level, config)],
        LogDestination::File => match create_file_logger(settings, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Both => {
            let mut loggers = vec![terminal_logger(settings.level, config.clone())];
            if let Some(file_logger) = create_file_logger(settings, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(settings: &LogSettings, config: Config) -> Option<Box<dyn SharedLogger>> {
    let opened: std::io::Result<File> = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file_path);
    match opened {
        Ok(file) => Some(WriteLogger::new(settings.level, config, file)),
        Err(err) => {
            eprintln!(
                "Warning: Could not open log file at {:?}: {}",
                settings.file_path, err
            );
            None
        }
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![terminal_logger(level, Config::default())]);
}
