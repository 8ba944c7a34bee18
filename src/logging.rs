use once_cell::sync::OnceCell;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "bibgroups.log";

fn env_filter() -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match "info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Installs the global tracing subscriber.
///
/// With `log_dir` set, output goes to `<log_dir>/bibgroups.log` through a
/// non-blocking writer; otherwise to stderr. Safe to call more than once.
pub fn init_logging(log_dir: Option<&Path>) {
    static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

    let Some(log_dir) = log_dir else {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr);
        if let Err(e) = subscriber.try_init() {
            eprintln!("Failed to init tracing subscriber: {e}");
        }
        return;
    };

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Failed to create log dir {:?}: {}", log_dir, e);
        return;
    }
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(non_blocking);
    match subscriber.try_init() {
        Ok(()) => {
            let _ = GUARD.set(guard);
            tracing::debug!(log_dir = ?log_dir, "logging initialized");
        }
        Err(e) => eprintln!("Failed to init tracing subscriber: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn repeated_initialization_is_harmless() {
        init_logging(None);
        init_logging(None);
        tracing::info!("still logging");
    }
}
