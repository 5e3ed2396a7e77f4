//! Logging setup
//!
//! Console output goes to stderr so table/JSON/YAML on stdout stays clean.
//! With a log directory configured, a daily-rotated JSON file is written too.

use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "meshctl.log";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install the global subscriber
    ///
    /// The returned guard flushes the file writer on drop; keep it alive
    /// until the process exits.
    pub fn init(&self) -> anyhow::Result<Option<WorkerGuard>> {
        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stderr);

        match &self.dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_NAME));

                let file_layer = fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer);

                tracing_subscriber::registry()
                    .with(self.filter())
                    .with(console_layer)
                    .with(file_layer)
                    .try_init()?;

                Ok(Some(guard))
            }
            None => {
                tracing_subscriber::registry()
                    .with(self.filter())
                    .with(console_layer)
                    .try_init()?;

                Ok(None)
            }
        }
    }
}
