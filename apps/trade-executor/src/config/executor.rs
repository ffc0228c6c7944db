//! Executor identity and order settings.

use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;
use crate::execution::GatewaySettings;
use crate::identifier::IdentifierScope;

/// Who this process trades as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// External bot id (1..=5 or legacy 101..=106).
    #[serde(default = "default_bot_id")]
    pub bot_id: u16,
    /// Strategy configuration id (0..=9).
    #[serde(default)]
    pub config_id: u8,
    /// Maximum slippage in points.
    #[serde(default = "default_deviation")]
    pub deviation: u32,
    /// Comment stored with every order.
    #[serde(default = "default_comment")]
    pub comment: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            bot_id: default_bot_id(),
            config_id: 0,
            deviation: default_deviation(),
            comment: default_comment(),
        }
    }
}

impl ExecutorConfig {
    /// Order settings for the gateway.
    #[must_use]
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            deviation: self.deviation,
            comment: self.comment.clone(),
        }
    }

    /// Scope covering this bot and config.
    pub fn identifier_scope(&self) -> Result<IdentifierScope, ExecutionError> {
        IdentifierScope::new(self.bot_id, Some(self.config_id))
    }
}

const fn default_bot_id() -> u16 {
    1
}

const fn default_deviation() -> u32 {
    20
}

fn default_comment() -> String {
    "trade-executor".to_string()
}
