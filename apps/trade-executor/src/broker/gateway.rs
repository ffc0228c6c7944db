//! Broker gateway trait and wire types.
//!
//! A `Result::Err(TransportFault)` means the terminal produced no reply at
//! all. A reply with a non-success retcode is still `Ok`; mapping it to an
//! error is the order gateway's job.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifier::OrderIdentifier;
use crate::models::{Direction, OrderType, TradeAction};

/// Trade server return codes the core interprets.
pub mod retcode {
    /// Requote, price moved past the allowed deviation.
    pub const REQUOTE: u32 = 10004;
    /// Request rejected.
    pub const REJECT: u32 = 10006;
    /// Pending order placed.
    pub const PLACED: u32 = 10008;
    /// Request completed.
    pub const DONE: u32 = 10009;
    /// Only part of the request completed.
    pub const DONE_PARTIAL: u32 = 10010;
    /// Invalid request.
    pub const INVALID: u32 = 10013;
    /// Invalid volume.
    pub const INVALID_VOLUME: u32 = 10014;
    /// Invalid price.
    pub const INVALID_PRICE: u32 = 10015;
    /// Invalid stops.
    pub const INVALID_STOPS: u32 = 10016;
    /// Not enough money.
    pub const NO_MONEY: u32 = 10019;
    /// Position already closed.
    pub const POSITION_CLOSED: u32 = 10036;

    /// Whether a retcode means the request fully took effect.
    #[must_use]
    pub const fn is_success(code: u32) -> bool {
        matches!(code, DONE | PLACED)
    }
}

/// The terminal did not answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportFault {
    message: String,
}

impl TransportFault {
    /// Create a fault with a description of what failed.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Order send request as the terminal understands it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSendRequest {
    /// Immediate deal or pending order.
    pub action: TradeAction,
    /// Instrument symbol.
    pub symbol: String,
    /// Volume in lots.
    pub volume: Decimal,
    /// Order type.
    pub order_type: OrderType,
    /// Requested price.
    pub price: Decimal,
    /// Stop-loss price, zero for none.
    pub stop_loss: Decimal,
    /// Take-profit price, zero for none.
    pub take_profit: Decimal,
    /// Magic number tagging the order.
    pub identifier: OrderIdentifier,
    /// Free text stored with the order.
    pub comment: String,
    /// Maximum slippage in points.
    pub deviation: u32,
}

/// Request to close (part of) an open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePositionRequest {
    /// Position ticket.
    pub ticket: u64,
    /// Instrument symbol.
    pub symbol: String,
    /// Volume to close.
    pub volume: Decimal,
    /// Opposite-side order type.
    pub order_type: OrderType,
    /// Opposite-side price (bid closes a long, ask closes a short).
    pub price: Decimal,
    /// Magic number of the position.
    pub identifier: OrderIdentifier,
    /// Maximum slippage in points.
    pub deviation: u32,
    /// Free text stored with the deal.
    pub comment: String,
}

/// Terminal reply to a trade request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReply {
    /// Trade server return code.
    pub retcode: u32,
    /// Order ticket, zero if none was created.
    pub order_ref: u64,
    /// Deal ticket, zero if nothing was filled.
    pub deal_ref: u64,
    /// Fill price, zero if unfilled.
    pub fill_price: Decimal,
    /// Filled volume.
    pub fill_volume: Decimal,
    /// Server comment.
    pub comment: String,
}

impl OrderReply {
    /// Whether the request fully took effect.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        retcode::is_success(self.retcode)
    }
}

/// Best bid and ask for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
}

/// Account snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account balance.
    pub balance: Decimal,
}

/// One open position as reported by the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    /// Position ticket.
    pub ticket: u64,
    /// Instrument symbol.
    pub symbol: String,
    /// Side of the position.
    pub direction: Direction,
    /// Remaining volume.
    pub volume: Decimal,
    /// Average open price.
    pub open_price: Decimal,
    /// Stop-loss, zero for none.
    pub stop_loss: Decimal,
    /// Take-profit, zero for none.
    pub take_profit: Decimal,
    /// Magic number the position was opened with.
    pub identifier: OrderIdentifier,
    /// Floating profit.
    pub profit: Decimal,
}

/// Filter for [`BrokerGateway::open_positions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionFilter {
    /// Restrict to one symbol; `None` lists every position.
    pub symbol: Option<String>,
}

impl PositionFilter {
    /// Every open position.
    #[must_use]
    pub const fn all() -> Self {
        Self { symbol: None }
    }

    /// Positions on one symbol.
    #[must_use]
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
        }
    }

    /// Whether a position passes the filter.
    #[must_use]
    pub fn matches(&self, position: &OpenPosition) -> bool {
        self.symbol
            .as_deref()
            .is_none_or(|symbol| symbol == position.symbol)
    }
}

/// Capabilities the core consumes from the broker terminal.
///
/// Implementations block until the terminal answers or their own timeout
/// fires. Trade calls (`submit_order`, `modify_stops`, `close_position`) are
/// never retried by the core; read calls may be.
#[cfg_attr(test, mockall::automock)]
pub trait BrokerGateway {
    /// Send a deal or pending order.
    fn submit_order(&self, request: &OrderSendRequest) -> Result<OrderReply, TransportFault>;

    /// Replace the stops of an open position. Zero leaves a level unset.
    fn modify_stops(
        &self,
        ticket: u64,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<OrderReply, TransportFault>;

    /// Close (part of) an open position.
    fn close_position(&self, request: &ClosePositionRequest)
    -> Result<OrderReply, TransportFault>;

    /// Current quote.
    fn tick(&self, symbol: &str) -> Result<Tick, TransportFault>;

    /// Account snapshot.
    fn account(&self) -> Result<AccountInfo, TransportFault>;

    /// Open positions matching the filter.
    fn open_positions(&self, filter: &PositionFilter)
    -> Result<Vec<OpenPosition>, TransportFault>;
}

impl<B: BrokerGateway + ?Sized> BrokerGateway for Arc<B> {
    fn submit_order(&self, request: &OrderSendRequest) -> Result<OrderReply, TransportFault> {
        (**self).submit_order(request)
    }

    fn modify_stops(
        &self,
        ticket: u64,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<OrderReply, TransportFault> {
        (**self).modify_stops(ticket, stop_loss, take_profit)
    }

    fn close_position(
        &self,
        request: &ClosePositionRequest,
    ) -> Result<OrderReply, TransportFault> {
        (**self).close_position(request)
    }

    fn tick(&self, symbol: &str) -> Result<Tick, TransportFault> {
        (**self).tick(symbol)
    }

    fn account(&self) -> Result<AccountInfo, TransportFault> {
        (**self).account()
    }

    fn open_positions(
        &self,
        filter: &PositionFilter,
    ) -> Result<Vec<OpenPosition>, TransportFault> {
        (**self).open_positions(filter)
    }
}
