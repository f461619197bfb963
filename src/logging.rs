use crate::utils::app_paths::AppPaths;
use chrono::Local;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing to a log file under the platform data directory.
///
/// The TUI owns stdout, so all diagnostics go to the file. Failures
/// here are swallowed: a panel without logs is better than no panel.
pub fn init() {
    let Ok(path) = AppPaths::log_file() else {
        return;
    };

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .try_init()
        .is_ok();

    if initialized {
        info!(
            "context-cli {} session started at {}",
            env!("CARGO_PKG_VERSION"),
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }
}
