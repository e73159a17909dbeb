//! Logging setup and the presets derived from a configuration's `debug` key.

use serde::{Deserialize, Serialize};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output encoding for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Logger configuration.
///
/// [`LogConfig::development`] and [`LogConfig::production`] are the two
/// presets handed out by `Conf::log_config`. Also deserializable from a
/// `[logging]` table for callers that want to tune it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Verbose developer-oriented output
    #[serde(default)]
    pub development: bool,

    /// Default filter directive, used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Colored output (text format only)
    #[serde(default)]
    pub ansi: bool,

    /// Include source file and line number in each event
    #[serde(default)]
    pub with_file_and_line: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> LogFormat {
    LogFormat::Json
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Debug level, colored text, source locations.
    pub fn development() -> Self {
        Self {
            development: true,
            level: "debug".to_string(),
            format: LogFormat::Text,
            ansi: true,
            with_file_and_line: true,
        }
    }

    /// Info level, JSON, no source locations.
    pub fn production() -> Self {
        Self {
            development: false,
            level: default_level(),
            format: default_format(),
            ansi: false,
            with_file_and_line: false,
        }
    }

    /// `RUST_LOG` if set, otherwise `level`.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install a global subscriber writing to stderr.
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already installed.
    pub fn init(&self) -> Result<(), TryInitError> {
        let json = (self.format == LogFormat::Json).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false)
                .with_file(self.with_file_and_line)
                .with_line_number(self.with_file_and_line)
        });
        let text = (self.format == LogFormat::Text).then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(self.ansi)
                .with_file(self.with_file_and_line)
                .with_line_number(self.with_file_and_line)
        });

        tracing_subscriber::registry()
            .with(json)
            .with(text)
            .with(self.env_filter())
            .try_init()
    }
}

/// Initialize logging with optional quiet mode.
///
/// When `quiet` is true, only error-level events are emitted.
/// When `quiet` is false, info-level and above events are emitted (default).
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(quiet: bool) {
    let config = LogConfig {
        level: if quiet { "layerconf=error" } else { "layerconf=info" }.to_string(),
        ..LogConfig::production()
    };

    if let Err(e) = config.init() {
        tracing::debug!(event = "layerconf.logging.already_initialized", error = %e);
    }
}
