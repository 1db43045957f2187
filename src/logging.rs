use std::path::Path;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ServerConfig;

/// Every event that passes the active filter.
pub const COMBINED_LOG: &str = "combined.log";
/// `ERROR` events only.
pub const ERROR_LOG: &str = "error.log";

/// File sinks opened under `LOG_DIR`.
pub struct LogFiles {
    pub combined: RollingFileAppender,
    pub errors: RollingFileAppender,
}

/// Create `dir` if needed and open [`COMBINED_LOG`] and [`ERROR_LOG`] in
/// append mode. Files are never rotated.
pub fn open_log_files(dir: &Path) -> anyhow::Result<LogFiles> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let open = |prefix: &str| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .build(dir)
            .with_context(|| format!("cannot open {prefix}.log in {}", dir.display()))
    };

    Ok(LogFiles {
        combined: open("combined")?,
        errors: open("error")?,
    })
}

/// Initialize tracing to stderr.
///
/// `RUST_LOG` wins when set; otherwise the configured `LOG_LEVEL` applies.
/// `LOG_FORMAT=json` switches to one JSON object per line. With `LOG_DIR`
/// set, JSON lines are also appended to `combined.log` and, for errors,
/// `error.log`.
pub fn init_tracing(config: &ServerConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let (combined, errors) = match config.log_dir.as_deref().map(open_log_files).transpose()? {
        Some(files) => (Some(files.combined), Some(files.errors)),
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(combined.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
        }))
        .with(errors.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(LevelFilter::ERROR)
        }));

    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
