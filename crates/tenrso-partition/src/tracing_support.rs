//! Structured logging setup for partition tools
//!
//! Library code emits `tracing` events and spans; binaries call [`init_tracing`]
//! once at startup to install a subscriber. Log output goes to stderr so it
//! never interleaves with reports written to stdout.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directive (default: `tenrso_partition=info,warn`)
//! - `TENRSO_LOG_FORMAT`: `pretty`, `json` or `compact` (default: `compact`)
//!
//! # Example
//!
//! ```no_run
//! use tenrso_partition::tracing_support::{init_tracing, TracingConfig, TracingFormat};
//!
//! init_tracing(TracingConfig {
//!     format: TracingFormat::Json,
//!     filter: "tenrso_partition=debug".to_string(),
//!     ..TracingConfig::default()
//! })
//! .unwrap();
//! ```

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter directive when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "tenrso_partition=info,warn";

/// Tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line human-readable format
    Pretty,
    /// JSON, one object per event
    Json,
    /// Single line per event
    Compact,
}

impl TracingFormat {
    /// Parse from string, falling back to [`TracingFormat::Compact`]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => TracingFormat::Json,
            "pretty" => TracingFormat::Pretty,
            _ => TracingFormat::Compact,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Output format
    pub format: TracingFormat,
    /// Filter directive (e.g., "tenrso_partition=debug")
    pub filter: String,
    /// Enable ANSI colors
    pub with_ansi: bool,
    /// Show target module paths
    pub with_target: bool,
    /// Show thread names
    pub with_thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        let format = std::env::var("TENRSO_LOG_FORMAT")
            .map(|s| TracingFormat::parse(&s))
            .unwrap_or(TracingFormat::Compact);
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

        Self {
            format,
            filter,
            with_ansi: true,
            with_target: true,
            with_thread_names: true,
        }
    }
}

impl TracingConfig {
    /// Override the filter with a verbosity level, as given by repeated `-v` flags
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let level = match verbose {
            0 => return self,
            1 => "debug",
            _ => "trace",
        };
        self.filter = format!("tenrso_partition={level},tenrso_sparse={level},warn");
        self
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)?;

    match config.format {
        TracingFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target)
                .with_thread_names(config.with_thread_names)
                .with_filter(filter);

            tracing_subscriber::registry().with(fmt_layer).try_init()?;
        }
        TracingFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(config.with_target)
                .with_thread_names(config.with_thread_names)
                .with_filter(filter);

            tracing_subscriber::registry().with(fmt_layer).try_init()?;
        }
        TracingFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target)
                .with_thread_names(config.with_thread_names)
                .with_filter(filter);

            tracing_subscriber::registry().with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}
