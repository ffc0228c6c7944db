//! Core types for risk sizing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::InstrumentSpec;

/// Input to a risk sizing calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRequest {
    /// Account balance in account currency.
    pub balance: Decimal,
    /// Percentage of balance to risk, in (0, 100].
    pub risk_percent: Decimal,
    /// Intended entry price.
    pub entry_price: Decimal,
    /// Stop-loss price. Must differ from the entry.
    pub stop_loss: Decimal,
    /// Instrument being traded.
    pub instrument: InstrumentSpec,
}

/// Result of risk sizing. The lot is raw and still needs normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedLot {
    /// Unrounded lot size.
    pub lot: Decimal,
    /// Monetary amount at risk.
    pub risk_amount: Decimal,
    /// Absolute price distance from entry to stop.
    pub price_distance: Decimal,
    /// Price distance expressed in ticks.
    pub distance_in_ticks: Decimal,
    /// Loss per lot if the stop is hit.
    pub per_unit_value: Decimal,
}
