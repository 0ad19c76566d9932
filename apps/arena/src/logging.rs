//! Global tracing subscriber for the arena binary.
//!
//! Console output is always on. When [`LoggingConfig::directory`] is set, a
//! daily rolling file layer is added behind a non-blocking writer; keep the
//! returned [`Logging`] alive so its buffer is flushed on exit.

use crate::config::LoggingConfig;
use crate::error::{ArenaError, ArenaErrorExt};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const MAX_LOG_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Handle to the installed subscriber.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logging {
    guard: Option<WorkerGuard>,
}

impl Logging {
    /// Returns the file writer guard, if file logging is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logging {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

/// Installs the global subscriber described by `cfg`.
///
/// `name` prefixes rolling log files (e.g. `arena.2026-10-18.log`).
///
/// # Errors
/// Returns [`ArenaError::InvalidConfiguration`] for an unknown level,
/// [`ArenaError::Io`] or [`ArenaError::Appender`] if the log directory cannot
/// be used, and [`ArenaError::Subscriber`] if a global subscriber is already set.
pub fn init_logging(name: &str, cfg: &LoggingConfig) -> Result<Logging, ArenaError> {
    let env_filter =
        EnvFilter::builder().with_default_directive(cfg.level_filter()?.into()).from_env_lossy();

    let mut layers = vec![layer().compact().with_ansi(true).boxed()];

    let guard = if let Some(path) = &cfg.directory {
        fs::create_dir_all(path)
            .context(format!("Failed to create path: {}", path.display()))?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(MAX_LOG_FILES)
            .build(path)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = layer().with_writer(non_blocking).with_ansi(false);

        layers.push(if cfg.json { file_layer.json().boxed() } else { file_layer.boxed() });
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

    Ok(Logging { guard })
}
