//! Shared logging setup for the `si` binaries.

use anyhow::{Context, Result};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "si=info,si_client=info";

/// Logging configuration for a single process.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Mirror the file filter on stderr instead of warnings only.
    pub verbose: bool,
    /// Override for the log directory (defaults to ~/.si/logs).
    pub log_dir: Option<PathBuf>,
}

/// Keeps the non-blocking file writer alive; drop it last in `main`.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
    pub log_dir: Option<PathBuf>,
}

/// Initialize tracing with a daily rolling file and stderr output.
///
/// If the log directory cannot be created the process still logs to stderr.
pub fn init_logging(config: LogConfig<'_>) -> LogGuard {
    let file_filter = default_filter();
    let console_filter = console_filter(config.verbose);

    let log_dir = config.log_dir.unwrap_or_else(si_protocol::paths::default_logs_dir);
    let (file_layer, guard, log_dir) = match ensure_dir(&log_dir) {
        Ok(dir) => {
            let appender =
                tracing_appender::rolling::daily(&dir, file_name(config.app_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard), Some(dir))
        }
        Err(err) => {
            eprintln!("Warning: failed to create logs directory: {:#}", err);
            (None, None, None)
        }
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_filter(console_filter);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    LogGuard {
        _file: guard,
        log_dir,
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn console_filter(verbose: bool) -> EnvFilter {
    if verbose {
        default_filter()
    } else {
        EnvFilter::new("warn")
    }
}

fn file_name(app_name: &str) -> String {
    format!("{}.log", sanitize_name(app_name))
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_per_app() {
        assert_eq!(file_name("si"), "si.log");
        assert_eq!(file_name("si inspect"), "si_inspect.log");
    }

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("a").join("logs");
        let created = ensure_dir(&nested).unwrap();
        assert!(created.is_dir());
    }

    #[test]
    fn test_init_logging_returns_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let guard = init_logging(LogConfig {
            app_name: "si",
            verbose: false,
            log_dir: Some(temp.path().join("logs")),
        });
        assert_eq!(guard.log_dir.as_deref(), Some(temp.path().join("logs").as_path()));
        tracing::info!("logging initialised in test");
    }
}
