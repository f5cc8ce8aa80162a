use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::settings::{LogFormat, LoggingConfig};
use crate::ServiceConfig;

/// Dependencies that are chatty at debug level.
const QUIET_TARGETS: [&str; 3] = ["hyper_util=warn", "reqwest=info", "rustls=warn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// CLI/env level wins over the config file, format always comes from the file.
pub fn run(service_config: &ServiceConfig, arg_log_level: Option<LogLevel>) -> Result<()> {
    let logging_config = resolve_logging_config(service_config.settings.logging.as_ref(), arg_log_level);
    init_logging(&logging_config)
}

fn resolve_logging_config(configured: Option<&LoggingConfig>, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    let base = configured.cloned().unwrap_or_default();
    match arg_log_level {
        Some(level) => LoggingConfig::new(level.as_str().to_owned(), base.format),
        None => base,
    }
}

fn filter_directives(level: &str) -> String {
    std::iter::once(level).chain(QUIET_TARGETS).collect::<Vec<_>>().join(",")
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter_directives(&cfg.level))
        .map_err(|e| anyhow!("invalid log level '{}': {}", cfg.level, e))?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match cfg.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(UtcTime::rfc_3339())
                    .with_current_span(false)
                    .flatten_event(true)
                    .with_ansi(false),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_timer(UtcTime::rfc_3339()).with_target(false))
            .try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}
