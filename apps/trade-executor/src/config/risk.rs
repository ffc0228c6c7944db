//! Risk defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk settings applied when a decision does not carry its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Percent of balance risked per entry, in (0, 100].
    #[serde(default = "default_risk_percent")]
    pub default_risk_percent: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            default_risk_percent: default_risk_percent(),
        }
    }
}

const fn default_risk_percent() -> Decimal {
    Decimal::ONE
}
