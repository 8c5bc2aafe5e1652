//! Signage Server Logging System
//!
//! Provides structured logging with configurable levels and output formats.
//! Uses tracing crate for structured logging with spans and events.

use std::io;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const LOG_DIR: &str = ".signage-server/logs";

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    /// Enable colored output
    pub color: bool,
    /// Show timestamps
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
    /// Enable JSON format for machine parsing
    pub json_format: bool,
    /// Enable span events for tracing
    pub enable_spans: bool,
    /// Output to file instead of stderr (for unattended servers)
    pub file_output: Option<std::path::PathBuf>,
}

impl LoggingConfig {
    /// Create config for different application modes
    pub fn for_mode(mode: ApplicationMode) -> Self {
        match mode {
            ApplicationMode::Server => Self {
                level: Level::INFO,
                color: false, // Background service
                show_timestamps: true,
                show_target: true,
                json_format: false,
                enable_spans: true,
                file_output: None,
            },
            ApplicationMode::Cli => Self {
                level: Level::WARN,
                color: true,
                show_timestamps: false,
                show_target: false,
                json_format: false,
                enable_spans: false,
                file_output: None,
            },
        }
    }

    /// Create config from CLI arguments
    pub fn from_args(quiet: bool, verbose: bool, json: bool) -> Self {
        use std::io::IsTerminal;

        let level = if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::INFO
        };

        Self {
            level,
            color: !quiet && !json && io::stderr().is_terminal(),
            show_timestamps: true,
            show_target: verbose,
            json_format: json,
            enable_spans: verbose,
            file_output: None,
        }
    }
}

/// Application modes with different logging requirements
#[derive(Debug, Clone, Copy)]
pub enum ApplicationMode {
    /// Long-running bus server
    Server,
    /// One-shot listing commands
    Cli,
}

/// Initialize the logging system
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("signage_server={}", config.level)));

    let registry = Registry::default().with(env_filter);

    if let Some(log_file) = config.file_output {
        let file_appender = tracing_appender::rolling::daily(
            log_file.parent().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file path")
            })?,
            log_file.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file name")
            })?,
        );

        if config.json_format {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(config.enable_spans)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender);
            json_layer.with_subscriber(registry).init();
        } else {
            fmt::layer()
                .with_target(config.show_target)
                .with_level(true)
                .with_ansi(false)
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_writer(file_appender)
                .with_subscriber(registry)
                .init();
        }
    } else if config.json_format {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(config.enable_spans)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr);
        json_layer.with_subscriber(registry).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_level(true)
            .with_ansi(config.color)
            .with_writer(io::stderr);

        if config.show_timestamps {
            fmt_layer
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_subscriber(registry)
                .init();
        } else {
            fmt_layer.with_subscriber(registry).init();
        }
    }

    Ok(())
}

/// Clean up old log files based on retention policy
///
/// Only removes rotated files matching `<name>.log.YYYY-MM-DD`.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use signage_server::logging::cleanup_old_logs;
///
/// let log_dir = Path::new("/home/user/.signage-server/logs");
/// cleanup_old_logs(log_dir, 7).ok();
/// ```
pub fn cleanup_old_logs(log_dir: &std::path::Path, retention_days: u32) -> io::Result<usize> {
    use std::fs;
    use std::time::SystemTime;

    if !log_dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let retention_duration = std::time::Duration::from_secs(retention_days as u64 * 24 * 60 * 60);

    let mut cleaned_count = 0;

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let path_str = path.to_string_lossy();
        if !path_str.contains(".log.") || !path.is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;

        if let Ok(age) = now.duration_since(modified) {
            if age > retention_duration {
                match fs::remove_file(&path) {
                    Ok(_) => {
                        cleaned_count += 1;
                        tracing::info!(
                            "Cleaned up old log file: {} (age: {} days)",
                            path.display(),
                            age.as_secs() / 86400
                        );
                    },
                    Err(e) => {
                        tracing::warn!("Failed to remove old log file {}: {}", path.display(), e);
                    },
                }
            }
        }
    }

    Ok(cleaned_count)
}

#[macro_export]
macro_rules! log_timer_operation {
    ($operation:expr, $room:expr) => {
        tracing::debug!(operation = $operation, room = %$room, "Timer operation");
    };
    ($operation:expr, $room:expr, $seconds:expr) => {
        tracing::debug!(
            operation = $operation,
            room = %$room,
            seconds = $seconds,
            "Timer operation"
        );
    };
}

#[macro_export]
macro_rules! log_discovery_operation {
    ($operation:expr, $uuid:expr) => {
        tracing::info!(operation = $operation, uuid = %$uuid, "Discovery operation");
    };
    ($operation:expr, $uuid:expr, $details:expr) => {
        tracing::info!(
            operation = $operation,
            uuid = %$uuid,
            details = %$details,
            "Discovery operation"
        );
    };
}

/// Utility macro for structured error logging
#[macro_export]
macro_rules! log_error {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            code = $error.to_error_code(),
            context = $context,
            "Operation failed"
        );
    };
}

/// Directory for log files, under the user's home
pub fn log_dir() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_DIR))
}

/// Get log file path for a given application mode
pub fn log_file_path(mode: ApplicationMode) -> io::Result<std::path::PathBuf> {
    let log_dir = log_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "Failed to get home directory")
    })?;

    std::fs::create_dir_all(&log_dir)?;

    Ok(match mode {
        ApplicationMode::Server => log_dir.join("server.log"),
        ApplicationMode::Cli => log_dir.join("cli.log"),
    })
}
