//! Tracing setup: stderr by default, with an optional mirrored file when
//! `VIBE_LOG_FILE` is set, so a long-running task leaves a trail behind
//! even after the terminal scrolls away.

use tracing_appender::non_blocking::WorkerGuard;

/// Initialize the global subscriber. The returned guard must be held for
/// the lifetime of `main` when file logging is active, or buffered lines
/// are dropped on exit.
pub fn init() -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();

    match std::env::var("VIBE_LOG_FILE") {
        Ok(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(dir) = dir {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    eprintln!("warning: failed to create log directory {dir:?}: {e}");
                }
            }
            let file_name = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "vibe-agent.log".to_string());
            let dir = dir.map(|d| d.to_path_buf()).unwrap_or_else(|| ".".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_env_filter(filter)
                .try_init()
                .ok();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init()
                .ok();
            None
        }
    }
}
