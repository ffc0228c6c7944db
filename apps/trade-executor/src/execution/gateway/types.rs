//! Request and result types for the order gateway.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::broker::OrderReply;
use crate::identifier::OrderIdentifier;
use crate::models::{Direction, LegKind, OrderType};

/// Per-process order settings applied to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Maximum slippage in points.
    pub deviation: u32,
    /// Comment stored with every order.
    pub comment: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            deviation: 20,
            comment: "trade-executor".to_string(),
        }
    }
}

/// One order to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegOrderRequest {
    /// Instrument symbol.
    pub symbol: String,
    /// Market or limit.
    pub leg: LegKind,
    /// Side.
    pub direction: Direction,
    /// Volume in lots.
    pub volume: Decimal,
    /// Market reference price or limit price.
    pub price: Decimal,
    /// Stop-loss, zero for none.
    #[serde(default)]
    pub stop_loss: Decimal,
    /// Take-profit, zero for none.
    #[serde(default)]
    pub take_profit: Decimal,
    /// Magic number.
    pub identifier: OrderIdentifier,
}

impl LegOrderRequest {
    /// Market order at a reference price.
    #[must_use]
    pub fn market(
        symbol: impl Into<String>,
        direction: Direction,
        volume: Decimal,
        price: Decimal,
        identifier: OrderIdentifier,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            leg: LegKind::Market,
            direction,
            volume,
            price,
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
            identifier,
        }
    }

    /// Limit order at a limit price.
    #[must_use]
    pub fn limit(
        symbol: impl Into<String>,
        direction: Direction,
        volume: Decimal,
        price: Decimal,
        identifier: OrderIdentifier,
    ) -> Self {
        Self {
            leg: LegKind::Limit,
            ..Self::market(symbol, direction, volume, price, identifier)
        }
    }

    /// Attach stops.
    #[must_use]
    pub fn with_stops(mut self, stop_loss: Decimal, take_profit: Decimal) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    /// Broker order type for this request.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.leg.order_type(self.direction)
    }
}

/// A submitted order the broker accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegOrderResult {
    /// Instrument symbol.
    pub symbol: String,
    /// Market or limit.
    pub leg: LegKind,
    /// Side.
    pub direction: Direction,
    /// Requested volume.
    pub volume: Decimal,
    /// Requested price.
    pub price: Decimal,
    /// Stop-loss sent.
    pub stop_loss: Decimal,
    /// Take-profit sent.
    pub take_profit: Decimal,
    /// Magic number sent.
    pub identifier: OrderIdentifier,
    /// Broker return code.
    pub retcode: u32,
    /// Broker order ticket.
    pub order_ref: u64,
    /// Broker deal ticket, zero for resting orders.
    pub deal_ref: u64,
    /// Fill price, zero for resting orders.
    pub fill_price: Decimal,
    /// Filled volume.
    pub fill_volume: Decimal,
    /// Broker comment.
    pub comment: String,
}

impl LegOrderResult {
    pub(crate) fn from_reply(request: &LegOrderRequest, reply: OrderReply) -> Self {
        Self {
            symbol: request.symbol.clone(),
            leg: request.leg,
            direction: request.direction,
            volume: request.volume,
            price: request.price,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            identifier: request.identifier,
            retcode: reply.retcode,
            order_ref: reply.order_ref,
            deal_ref: reply.deal_ref,
            fill_price: reply.fill_price,
            fill_volume: reply.fill_volume,
            comment: reply.comment,
        }
    }
}

/// Accepted stop modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopsUpdate {
    /// Position ticket.
    pub ticket: u64,
    /// Stop-loss now in force, zero for none.
    pub stop_loss: Decimal,
    /// Take-profit now in force, zero for none.
    pub take_profit: Decimal,
    /// Broker return code.
    pub retcode: u32,
    /// Broker comment.
    pub comment: String,
}

/// Accepted (partial) close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseResult {
    /// Closed position ticket.
    pub ticket: u64,
    /// Instrument symbol.
    pub symbol: String,
    /// Opposite-side order type used.
    pub order_type: OrderType,
    /// Volume closed.
    pub volume: Decimal,
    /// Quote the close was requested at.
    pub price: Decimal,
    /// Broker return code.
    pub retcode: u32,
    /// Closing order ticket.
    pub order_ref: u64,
    /// Closing deal ticket.
    pub deal_ref: u64,
    /// Fill price.
    pub fill_price: Decimal,
    /// Broker comment.
    pub comment: String,
}
