use std::fs;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use symcheck_config::AppConfig;

/// Where log lines go for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Daily rolling file under `telemetry.log_dir`; the terminal belongs to the UI.
    File,
    Stderr,
}

/// `RUST_LOG` wins over `telemetry.log_level`.  Keep the returned guard
/// alive for the whole run or buffered file output is lost.
pub fn init_tracing(config: &AppConfig, sink: LogSink) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));

    match sink {
        LogSink::File => {
            fs::create_dir_all(&config.telemetry.log_dir)?;
            let appender = tracing_appender::rolling::daily(&config.telemetry.log_dir, "symcheck.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        LogSink::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}
