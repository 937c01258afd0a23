//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the logger with defaults (info, plain text, stdout)
pub fn init_logger() -> anyhow::Result<()> {
    init_logger_with_file(None, false, None)
}

/// Initialize the logger with optional JSON format and daily rolling file output
///
/// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let output: BoxedLayer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(Path::new(dir))?;
            let file_appender = tracing_appender::rolling::daily(dir, "kitchen-server");
            if json {
                fmt::layer().json().with_writer(file_appender).boxed()
            } else {
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(file_appender)
                    .boxed()
            }
        }
        None if json => fmt::layer().json().boxed(),
        None => fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()?;

    Ok(())
}
