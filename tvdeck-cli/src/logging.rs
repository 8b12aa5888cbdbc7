use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TVDECK_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. The terminal belongs to the UI, so events
/// go to `log_file` when given and are discarded otherwise.
///
/// If the file cannot be opened the sink is installed anyway and the open
/// error is returned for the caller to report.
pub fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let file = log_file.map(|path| OpenOptions::new().create(true).append(true).open(path));

    match file {
        Some(Ok(file)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            Ok(())
        }
        Some(Err(e)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::sink)
                .try_init();
            Err(e)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::sink)
                .try_init();
            Ok(())
        }
    }
}
