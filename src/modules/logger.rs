use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "petfinder-proxy.log";

fn prepare_log_dir(dir: &str) -> Result<PathBuf, String> {
    let log_dir = Path::new(dir).to_path_buf();

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;
    }

    Ok(log_dir)
}

/// Initialize logger system
///
/// Console output always; a daily rolling file as well when `log_dir` is set.
pub fn init_logger(log_dir: Option<&str>) {
    // Capture log macro logs
    let _ = tracing_log::LogTracer::init();

    let file_dir = match log_dir.map(prepare_log_dir) {
        Some(Ok(dir)) => Some(dir),
        Some(Err(e)) => {
            eprintln!("Failed to initialize log directory: {}", e);
            None
        }
        None => None,
    };

    let file_layer = file_dir.map(|dir| {
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Flushes on drop; must live until process exit
        std::mem::forget(guard);

        fmt::Layer::new()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
    });

    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    // Default to INFO and above
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // try_init: re-initialization (tests) must not panic
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    info!(
        "Logger system initialized ({})",
        if log_dir.is_some() {
            "Console + File Persistence"
        } else {
            "Console"
        }
    );
}
