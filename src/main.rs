//! Churnguard: Customer churn risk assessment.
//!
//! Main entry point for the terminal application.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use churnguard::tui::App;

const LOG_MODE_ENV: &str = "CHURNGUARD_LOG_MODE";
const LOG_FILE_ENV: &str = "CHURNGUARD_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "churnguard.log";

/// Destination for log lines.
#[derive(Debug, PartialEq)]
enum LogTarget {
    File(PathBuf),
    Stdout,
}

impl LogTarget {
    /// `mode` is `file`, `stdout` or anything else for auto. Auto sends logs
    /// to the file whenever stdout is the terminal the form is drawn on.
    fn choose(mode: Option<&str>, interactive: bool, file: PathBuf) -> Self {
        match mode {
            Some("file") => Self::File(file),
            Some("stdout") => Self::Stdout,
            _ if interactive => Self::File(file),
            _ => Self::Stdout,
        }
    }

    fn from_env() -> Self {
        let mode = std::env::var(LOG_MODE_ENV).ok();
        let file = std::env::var(LOG_FILE_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        Self::choose(
            mode.as_deref(),
            std::io::stdout().is_terminal(),
            PathBuf::from(file),
        )
    }
}

/// Install the global subscriber. The returned guard flushes on drop.
fn init_logging(target: LogTarget) -> Result<WorkerGuard> {
    let (writer, guard) = match target {
        LogTarget::File(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_appender::non_blocking(file)
        }
        LogTarget::Stdout => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    Ok(guard)
}

fn main() -> Result<()> {
    let _guard = init_logging(LogTarget::from_env())?;

    tracing::info!("Starting Churnguard...");

    // Nothing has touched the terminal yet, so a bad model exits cleanly.
    let mut app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };
    app.run()?;

    tracing::info!("Churnguard shutdown complete.");
    Ok(())
}
