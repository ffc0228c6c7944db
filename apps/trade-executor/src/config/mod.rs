//! Configuration loading, validation and environment variable interpolation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trade_executor::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("deploy/bot-2.yaml"))?;
//!
//! println!("bot: {}", config.executor.bot_id);
//! ```

mod executor;
mod observability;
mod paper;
mod retry;
mod risk;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use executor::ExecutorConfig;
pub use observability::{LogFormat, LoggingConfig, MetricsConfig, ObservabilityConfig};
pub use paper::{PaperConfig, QuoteConfig};
pub use retry::RetryConfig;
pub use risk::RiskConfig;

use crate::identifier::{MAX_CONFIG_ID, map_bot_id};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_ENV: &str = "EXECUTOR_CONFIG";

/// Longest comment the trade server stores.
const MAX_COMMENT_LEN: usize = 31;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    Invalid(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Bot identity and order settings.
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Risk defaults.
    #[serde(default)]
    pub risk: RiskConfig,
    /// Read-only broker call retries.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Paper broker seed.
    #[serde(default)]
    pub paper: PaperConfig,
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to `$EXECUTOR_CONFIG`,
///   then `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        str::to_string,
    );

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become the empty string.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(value) if !value.is_empty() => value,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let executor = &config.executor;
    map_bot_id(executor.bot_id).map_err(|e| invalid(format!("executor.bot_id: {e}")))?;

    if executor.config_id > MAX_CONFIG_ID {
        return Err(invalid(format!(
            "executor.config_id must be between 0 and {MAX_CONFIG_ID}"
        )));
    }

    if executor.comment.len() > MAX_COMMENT_LEN {
        return Err(invalid(format!(
            "executor.comment must be at most {MAX_COMMENT_LEN} bytes"
        )));
    }

    let risk = config.risk.default_risk_percent;
    if risk <= Decimal::ZERO || risk > Decimal::ONE_HUNDRED {
        return Err(invalid(
            "risk.default_risk_percent must be in (0, 100]",
        ));
    }

    let retry = &config.retry;
    if retry.backoff_multiplier < 1.0 {
        return Err(invalid("retry.backoff_multiplier must be at least 1.0"));
    }
    if !(0.0..=1.0).contains(&retry.jitter_factor) {
        return Err(invalid(
            "retry.jitter_factor must be between 0.0 and 1.0",
        ));
    }
    if retry.max_backoff_ms < retry.initial_backoff_ms {
        return Err(invalid(
            "retry.max_backoff_ms must not be below retry.initial_backoff_ms",
        ));
    }

    validate_paper(&config.paper)
}

fn validate_paper(paper: &PaperConfig) -> Result<(), ConfigError> {
    if paper.starting_balance <= Decimal::ZERO {
        return Err(invalid("paper.starting_balance must be positive"));
    }

    for spec in &paper.instruments {
        spec.check_positive(crate::error::ExecutionError::InvalidRisk)
            .map_err(|e| invalid(format!("paper.instruments: {e}")))?;
    }

    for quote in &paper.quotes {
        if quote.bid <= Decimal::ZERO || quote.ask < quote.bid {
            return Err(invalid(format!(
                "paper.quotes: {} needs 0 < bid <= ask, got bid={} ask={}",
                quote.symbol, quote.bid, quote.ask
            )));
        }
    }

    Ok(())
}
