//! Dual-leg request and result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DualLegStage;
use crate::execution::LegOrderResult;
use crate::identifier::OrderIdentifier;
use crate::models::{Direction, InstrumentSpec};
use crate::risk::{NormalizedLot, SizedLot};

/// One "open a position" decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualLegRequest {
    /// Instrument symbol; must match `instrument.symbol`.
    pub symbol: String,
    /// Side of both legs.
    pub direction: Direction,
    /// Account balance the risk is taken from.
    pub balance: Decimal,
    /// Percent of balance at risk, in (0, 100].
    pub risk_percent: Decimal,
    /// Market reference price for the market leg.
    pub entry_price: Decimal,
    /// Price of the resting limit leg.
    pub limit_price: Decimal,
    /// Shared stop-loss.
    pub stop_loss: Decimal,
    /// Shared take-profit.
    pub take_profit: Decimal,
    /// Broker instrument description, fetched fresh for this decision.
    pub instrument: InstrumentSpec,
    /// External bot id (1..=5 or legacy 101..=106).
    pub bot_id: u16,
    /// Strategy configuration id (0..=9).
    pub config_id: u8,
    /// Sequence shared by both legs (0..=999).
    pub sequence: u16,
}

/// Both legs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualLegResult {
    /// Instrument symbol.
    pub symbol: String,
    /// Side of both legs.
    pub direction: Direction,
    /// Market leg as accepted.
    pub market: LegOrderResult,
    /// Limit leg as accepted.
    pub limit: LegOrderResult,
    /// Identifier of the market leg.
    pub market_identifier: OrderIdentifier,
    /// Identifier of the limit leg.
    pub limit_identifier: OrderIdentifier,
    /// Unrounded sizing output.
    pub sized: SizedLot,
    /// Lot both legs were sent with.
    pub lot: NormalizedLot,
    /// Stages visited, ending in [`DualLegStage::Done`].
    pub stages: Vec<DualLegStage>,
}
