//! Paper account seed data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::InstrumentSpec;

/// Starting state of the in-memory broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Account balance at start.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Decimal,
    /// Tradeable instruments.
    #[serde(default)]
    pub instruments: Vec<InstrumentSpec>,
    /// Initial quotes.
    #[serde(default)]
    pub quotes: Vec<QuoteConfig>,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            starting_balance: default_starting_balance(),
            instruments: Vec::new(),
            quotes: Vec::new(),
        }
    }
}

/// One initial quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Instrument symbol.
    pub symbol: String,
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
}

fn default_starting_balance() -> Decimal {
    Decimal::from(10_000)
}
