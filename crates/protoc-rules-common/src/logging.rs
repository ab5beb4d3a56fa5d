//! ---
//! rules_section: "01-core-functionality"
//! rules_subsection: "module"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Shared configuration and logging setup."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::info;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "PROTOC_RULES_LOG";

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
static STDERR_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Available log formats.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    StructuredJson,
    #[default]
    Pretty,
}

/// Initialize the tracing subscriber based on configuration and environment variables.
///
/// * `PROTOC_RULES_LOG` overrides the log filter (e.g. `info`, `protoc_rules_core=debug`).
///   When unset the standard `RUST_LOG` variable is honoured, finally defaulting to `warn`.
/// * Events go to stderr so that emitted targets and commands on stdout stay
///   machine readable. A rolling daily file is added when a directory is configured.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    let _ = STDERR_GUARD.set(stderr_guard);

    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid {} directive ({}); defaulting to warn logging",
                LOG_ENV, err
            );
            EnvFilter::new("warn")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let fmt_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .json()
            .with_writer(stderr_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(stderr_writer)
            .boxed(),
    };

    let file_layer = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let prefix = config
                .file_prefix
                .clone()
                .unwrap_or_else(|| service_name.to_owned());
            let file_appender = daily(directory, format!("{}.log", prefix));
            let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
            let _ = FILE_GUARD.set(file_guard);
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .json()
                    .with_writer(file_writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(file_layer)
        .try_init()
        .ok();

    info!(service = %service_name, format = ?config.format, "tracing initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_with_file_directory_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().join("logs")),
            format: LogFormat::StructuredJson,
            file_prefix: Some("test".into()),
        };
        init_tracing("protoc-rules-test", &config).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
