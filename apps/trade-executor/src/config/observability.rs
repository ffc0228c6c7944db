//! `observability` section: log output and the Prometheus exporter.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Logging and metrics settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prometheus exporter.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human oriented.
    Pretty,
    /// Single-line text.
    Compact,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        })
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (`info`, `trade_executor=debug`). `RUST_LOG` wins.
    #[serde(default = "default_level")]
    pub level: String,
    /// Line layout.
    #[serde(default)]
    pub format: LogFormat,
    /// Attach the current span and span list to JSON events.
    #[serde(default = "default_include_spans")]
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            include_spans: default_include_spans(),
        }
    }
}

/// Prometheus exporter settings. Off unless `enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Serve `/metrics`.
    #[serde(default)]
    pub enabled: bool,
    /// Listener bind address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Upper bounds of the `lot_size` histogram buckets.
    #[serde(default = "default_lot_buckets")]
    pub lot_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_listen_addr(),
            lot_buckets: default_lot_buckets(),
        }
    }
}

fn default_level() -> String {
    "info".to_owned()
}

const fn default_include_spans() -> bool {
    true
}

const fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9090)
}

fn default_lot_buckets() -> Vec<f64> {
    vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 50.0, 100.0]
}
