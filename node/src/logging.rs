//! Subscriber setup for the service binary.
//!
//! `RUST_LOG` holds `EnvFilter` directives; without it the built-in defaults
//! below apply. `LOG_FORMAT` picks pretty, compact or json output and
//! `LOG_ANSI` toggles colors for the two text formats.

use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset
#[cfg(debug_assertions)]
pub const DEFAULT_DIRECTIVES: &str = "info,cobuy_recommender=debug,tower_http=debug";
#[cfg(not(debug_assertions))]
pub const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,tower_http=warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub directives: String,
    pub format: LogFormat,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directives: DEFAULT_DIRECTIVES.to_string(),
            format: LogFormat::Pretty,
            ansi: true,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup. Unparseable formats fall back to pretty.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let directives = lookup("RUST_LOG")
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string());
        let format = lookup("LOG_FORMAT")
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();
        let ansi = match lookup("LOG_ANSI") {
            Some(value) => value.eq_ignore_ascii_case("true") || value == "1",
            None => format != LogFormat::Json,
        };

        Self {
            directives,
            format,
            ansi,
        }
    }

    /// Parse the directives, with `info` for targets they don't mention
    pub fn filter(&self) -> anyhow::Result<EnvFilter> {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse(&self.directives)
            .map_err(|e| anyhow::anyhow!("Invalid log directives '{}': {}", self.directives, e))
    }
}

/// Install the global subscriber
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(config.filter()?);
    let layer = tracing_subscriber::fmt::layer();

    let result = match config.format {
        LogFormat::Json => registry.with(layer.json().with_ansi(false)).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty().with_ansi(config.ansi)).try_init(),
        LogFormat::Compact => registry.with(layer.compact().with_ansi(config.ansi)).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))
}
