use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "connection-audit.log";

/// Stdout + daily rolling file under `log_dir`.
///
/// Keep the returned guard alive for the lifetime of the process, dropping it
/// flushes and stops the file writer.
pub fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connection_audit=info,tower_http=info".into()),
        )
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    guard
}
