//! Logging setup
//!
//! The library only emits `tracing` events. Programs that want to see them
//! (the `pyexplain` binary, test harnesses) install a subscriber with
//! [`init_logging`] or one of its presets.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-readable
    Pretty,
    /// One line per event
    #[default]
    Compact,
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Daily rolling files `directory/prefix.YYYY-MM-DD`
    File { directory: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Also log span creation and closing
    pub span_events: bool,
    /// Extra directives, e.g. `pyexplain::analysis=trace`
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PYEXPLAIN_LOG_LEVEL`, `PYEXPLAIN_LOG_DIR`,
    /// `PYEXPLAIN_LOG_JSON` and `PYEXPLAIN_LOG_SPANS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(level) = std::env::var("PYEXPLAIN_LOG_LEVEL").ok().and_then(|l| parse_level(&l)) {
            config.level = level;
        }
        if let Ok(directory) = std::env::var("PYEXPLAIN_LOG_DIR") {
            config.output = LogOutput::File { directory, prefix: "pyexplain".to_string() };
        }
        if std::env::var("PYEXPLAIN_LOG_JSON").is_ok() {
            config.format = LogFormat::Json;
        }
        config.span_events = std::env::var("PYEXPLAIN_LOG_SPANS").is_ok();
        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// `trace`, `debug`, `info`, `warn` or `error`, in any case.
pub fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Installs the global subscriber described by `config`.
///
/// The returned guard flushes buffered events when dropped; keep it alive
/// until the program ends. Returns `None` when a subscriber is already set.
pub fn init_logging(config: LogConfig) -> Option<WorkerGuard> {
    if INITIALIZED.get().is_some() {
        return None;
    }
    let (writer, guard) = match &config.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogOutput::File { directory, prefix } => tracing_appender::non_blocking(rolling::daily(directory, prefix)),
    };

    let layer = format_layer(&config, writer).with_filter(build_filter(&config));
    match tracing_subscriber::registry().with(layer).try_init() {
        Ok(()) => {
            let _ = INITIALIZED.set(());
            Some(guard)
        }
        Err(err) => {
            eprintln!("pyexplain: cannot install logger: {}", err);
            None
        }
    }
}

fn format_layer(config: &LogConfig, writer: NonBlocking) -> Box<dyn Layer<Registry> + Send + Sync> {
    let events = span_events_config(config.span_events);
    match config.format {
        LogFormat::Pretty => fmt::layer().with_writer(writer).pretty().with_span_events(events).boxed(),
        LogFormat::Compact => fmt::layer().with_writer(writer).compact().with_span_events(events).boxed(),
        LogFormat::Json => fmt::layer().with_writer(writer).json().with_span_events(events).boxed(),
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    match &config.filter {
        Some(filter_str) => filter_str.split(',').filter(|d| !d.trim().is_empty()).fold(base_filter, |filter, directive| {
            filter.add_directive(directive.trim().parse().unwrap_or_else(|_| {
                eprintln!("pyexplain: invalid log filter directive `{}`", directive);
                config.level.into()
            }))
        }),
        None => base_filter,
    }
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

pub fn is_initialized() -> bool {
    INITIALIZED.get().is_some()
}

/// Verbose logging to stderr, with spans.
pub fn init_dev_logging() -> Option<WorkerGuard> {
    init_logging(LogConfig {
        level: Level::DEBUG,
        format: LogFormat::Pretty,
        output: LogOutput::Stderr,
        span_events: true,
        filter: Some("pyexplain=debug".to_string()),
    })
}

/// JSON events in daily files under `log_dir`.
pub fn init_prod_logging(log_dir: impl AsRef<Path>) -> Option<WorkerGuard> {
    init_logging(LogConfig {
        level: Level::INFO,
        format: LogFormat::Json,
        output: LogOutput::File {
            directory: log_dir.as_ref().to_string_lossy().to_string(),
            prefix: "pyexplain".to_string(),
        },
        span_events: false,
        filter: Some("pyexplain=info".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LogConfig::new()
            .with_level(Level::DEBUG)
            .with_format(LogFormat::Json)
            .with_span_events(true)
            .with_filter("pyexplain::analysis=trace");

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.span_events);
        assert_eq!(config.filter.as_deref(), Some("pyexplain::analysis=trace"));
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_level("warning"), Some(Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }
}
