//! Logging utilities
//!
//! Logs go to stderr so that `show` output on stdout stays machine-readable.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Build the filter for `level`, or from `directive` when one is given
///
/// `directive` is either a bare level name, applied to this crate only, or
/// `EnvFilter` syntax (e.g. `wrk_compare=trace,plotters=warn`). An
/// unparsable directive falls back to `level`.
pub fn build_filter(level: LogLevel, directive: Option<&str>) -> EnvFilter {
    let for_level = |level: LogLevel| {
        EnvFilter::new(format!("wrk_compare={}", level.to_tracing_level()))
    };
    match directive {
        Some(directive) => match LogLevel::from_str(directive.trim()) {
            Some(named) => for_level(named),
            None => EnvFilter::try_new(directive).unwrap_or_else(|_| for_level(level)),
        },
        None => for_level(level),
    }
}

/// Initialize the logger with specified level
pub fn init_logger(level: LogLevel, directive: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level, directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
