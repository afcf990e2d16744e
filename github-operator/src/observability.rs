//! Logging setup for the operator binary.
//!
//! Output format is controlled via `GITHUB_OPERATOR_LOG_FORMAT`:
//! - `json` - Structured JSON output (for ELK/Loki)
//! - `pretty` - Human-readable multi-line output
//! - `compact` - Compact single-line format
//!
//! When unset, terminals get `pretty` and everything else gets `json`.
//! `RUST_LOG` overrides the filter derived from verbosity flags.

use std::env;
use std::io::IsTerminal;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "GITHUB_OPERATOR_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON format for structured logging.
    Json,
    /// Human-readable pretty format.
    Pretty,
    /// Compact single-line format.
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::default(),
        })
    }
}

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log output format.
    pub log_format: LogFormat,
    /// Filter directives (e.g. "info", "github_operator=debug").
    pub log_filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl TracingConfig {
    /// Build configuration from the environment, falling back to `default_filter`.
    pub fn from_env(default_filter: &str) -> Self {
        Self::resolve(
            env::var(LOG_FORMAT_ENV).ok(),
            env::var("RUST_LOG").ok(),
            default_filter,
            std::io::stdout().is_terminal(),
        )
    }

    fn resolve(
        log_format: Option<String>,
        rust_log: Option<String>,
        default_filter: &str,
        terminal: bool,
    ) -> Self {
        let log_format = log_format
            .and_then(|s| s.parse::<LogFormat>().ok())
            .unwrap_or(if terminal {
                LogFormat::Pretty
            } else {
                LogFormat::Json
            });

        Self {
            log_format,
            log_filter: rust_log.unwrap_or_else(|| default_filter.to_string()),
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> anyhow::Result<()> {
    use anyhow::Context;

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_target(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    }
    .context("Failed to initialize tracing subscriber")
}
