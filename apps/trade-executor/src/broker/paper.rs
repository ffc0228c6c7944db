//! In-memory broker used by the demo binary and integration tests.
//!
//! Deals fill at the current quote (buy at ask, sell at bid). Limit orders
//! rest until [`PaperBroker::set_quote`] moves the market through them.
//! Faults can be scripted per operation and every call is journaled, so
//! tests can assert on call order.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::gateway::{
    AccountInfo, BrokerGateway, ClosePositionRequest, OpenPosition, OrderReply, OrderSendRequest,
    PositionFilter, Tick, TransportFault, retcode,
};
use crate::config::PaperConfig;
use crate::identifier::OrderIdentifier;
use crate::models::{Direction, InstrumentSpec, OrderType, TradeAction};

/// Broker operation, used to script faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerOperation {
    /// [`BrokerGateway::submit_order`]
    SubmitOrder,
    /// [`BrokerGateway::modify_stops`]
    ModifyStops,
    /// [`BrokerGateway::close_position`]
    ClosePosition,
    /// [`BrokerGateway::tick`]
    Tick,
    /// [`BrokerGateway::account`]
    Account,
    /// [`BrokerGateway::open_positions`]
    OpenPositions,
}

/// A scripted failure for the next call of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperFault {
    /// Answer with this retcode. On read operations this becomes a
    /// transport fault, since reads carry no retcode.
    Reject {
        /// Retcode to answer with.
        retcode: u32,
        /// Server comment.
        comment: String,
    },
    /// Produce no reply.
    Transport(String),
}

/// One journaled call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCall {
    /// Order send.
    SubmitOrder(OrderSendRequest),
    /// Stop modification.
    ModifyStops {
        /// Position ticket.
        ticket: u64,
        /// New stop-loss.
        stop_loss: Decimal,
        /// New take-profit.
        take_profit: Decimal,
    },
    /// Position close.
    ClosePosition(ClosePositionRequest),
    /// Quote request.
    Tick(String),
    /// Account request.
    Account,
    /// Position listing.
    OpenPositions(Option<String>),
}

impl BrokerCall {
    /// Operation this call belongs to.
    #[must_use]
    pub const fn operation(&self) -> BrokerOperation {
        match self {
            Self::SubmitOrder(_) => BrokerOperation::SubmitOrder,
            Self::ModifyStops { .. } => BrokerOperation::ModifyStops,
            Self::ClosePosition(_) => BrokerOperation::ClosePosition,
            Self::Tick(_) => BrokerOperation::Tick,
            Self::Account => BrokerOperation::Account,
            Self::OpenPositions(_) => BrokerOperation::OpenPositions,
        }
    }
}

/// A journaled call with the time it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Arrival time.
    pub at: DateTime<Utc>,
    /// The call.
    pub call: BrokerCall,
}

/// A resting limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingOrder {
    /// Order ticket.
    pub ticket: u64,
    /// Instrument symbol.
    pub symbol: String,
    /// `BuyLimit` or `SellLimit`.
    pub order_type: OrderType,
    /// Volume in lots.
    pub volume: Decimal,
    /// Limit price.
    pub price: Decimal,
    /// Stop-loss, zero for none.
    pub stop_loss: Decimal,
    /// Take-profit, zero for none.
    pub take_profit: Decimal,
    /// Magic number.
    pub identifier: OrderIdentifier,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct PaperState {
    balance: Decimal,
    instruments: HashMap<String, InstrumentSpec>,
    quotes: HashMap<String, Tick>,
    positions: Vec<OpenPosition>,
    pending: Vec<PendingOrder>,
    faults: HashMap<BrokerOperation, VecDeque<PaperFault>>,
    journal: Vec<JournalEntry>,
}

impl PaperState {
    fn record(&mut self, call: BrokerCall) -> Option<PaperFault> {
        let operation = call.operation();
        self.journal.push(JournalEntry {
            at: Utc::now(),
            call,
        });
        self.faults
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
    }

    fn contract_size(&self, symbol: &str) -> Decimal {
        self.instruments
            .get(symbol)
            .map_or(Decimal::ONE, |spec| spec.contract_size)
    }

    fn profit(&self, position: &OpenPosition) -> Decimal {
        let Some(tick) = self.quotes.get(&position.symbol) else {
            return Decimal::ZERO;
        };
        let move_per_unit = match position.direction {
            Direction::Buy => tick.bid - position.open_price,
            Direction::Sell => position.open_price - tick.ask,
        };
        move_per_unit * position.volume * self.contract_size(&position.symbol)
    }
}

/// In-memory [`BrokerGateway`].
#[derive(Debug)]
pub struct PaperBroker {
    state: Mutex<PaperState>,
    next_ticket: AtomicU64,
}

impl PaperBroker {
    /// Create an empty account with a starting balance.
    #[must_use]
    pub fn new(balance: Decimal) -> Self {
        Self {
            state: Mutex::new(PaperState {
                balance,
                ..PaperState::default()
            }),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Build from the `paper` configuration section.
    #[must_use]
    pub fn from_config(config: &PaperConfig) -> Self {
        let broker = Self::new(config.starting_balance);
        for spec in &config.instruments {
            broker.add_instrument(spec.clone());
        }
        for quote in &config.quotes {
            broker.set_quote(&quote.symbol, quote.bid, quote.ask);
        }
        broker
    }

    /// Register an instrument (builder form).
    #[must_use]
    pub fn with_instrument(self, spec: InstrumentSpec) -> Self {
        self.add_instrument(spec);
        self
    }

    /// Set a quote (builder form).
    #[must_use]
    pub fn with_quote(self, symbol: &str, bid: Decimal, ask: Decimal) -> Self {
        self.set_quote(symbol, bid, ask);
        self
    }

    /// Register an instrument.
    pub fn add_instrument(&self, spec: InstrumentSpec) {
        self.lock().instruments.insert(spec.symbol.clone(), spec);
    }

    /// Instrument registered under `symbol`.
    #[must_use]
    pub fn instrument(&self, symbol: &str) -> Option<InstrumentSpec> {
        self.lock().instruments.get(symbol).cloned()
    }

    /// Move the market. Resting limit orders the new quote reaches are
    /// filled at their limit price.
    pub fn set_quote(&self, symbol: &str, bid: Decimal, ask: Decimal) {
        let mut state = self.lock();
        state.quotes.insert(symbol.to_string(), Tick { bid, ask });

        let (triggered, resting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut state.pending)
                .into_iter()
                .partition(|order| {
                    order.symbol == symbol
                        && match order.order_type {
                            OrderType::BuyLimit => ask <= order.price,
                            OrderType::SellLimit => bid >= order.price,
                            OrderType::Buy | OrderType::Sell => false,
                        }
                });
        state.pending = resting;

        for order in triggered {
            tracing::debug!(
                ticket = order.ticket,
                symbol = %order.symbol,
                price = %order.price,
                "Paper limit order filled"
            );
            state.positions.push(OpenPosition {
                ticket: order.ticket,
                symbol: order.symbol,
                direction: order.order_type.direction(),
                volume: order.volume,
                open_price: order.price,
                stop_loss: order.stop_loss,
                take_profit: order.take_profit,
                identifier: order.identifier,
                profit: Decimal::ZERO,
            });
        }
    }

    /// Script a failure for the next call of `operation`. Faults queue up.
    pub fn inject_fault(&self, operation: BrokerOperation, fault: PaperFault) {
        self.lock()
            .faults
            .entry(operation)
            .or_default()
            .push_back(fault);
    }

    /// Current balance.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.lock().balance
    }

    /// Open positions with floating profit at the current quotes.
    #[must_use]
    pub fn positions(&self) -> Vec<OpenPosition> {
        let state = self.lock();
        state
            .positions
            .iter()
            .map(|position| OpenPosition {
                profit: state.profit(position),
                ..position.clone()
            })
            .collect()
    }

    /// Resting limit orders.
    #[must_use]
    pub fn pending_orders(&self) -> Vec<PendingOrder> {
        self.lock().pending.clone()
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.lock().journal.clone()
    }

    /// Calls received so far, without timestamps.
    #[must_use]
    pub fn calls(&self) -> Vec<BrokerCall> {
        self.lock()
            .journal
            .iter()
            .map(|entry| entry.call.clone())
            .collect()
    }

    /// Submitted orders, oldest first.
    #[must_use]
    pub fn submitted_orders(&self) -> Vec<OrderSendRequest> {
        self.lock()
            .journal
            .iter()
            .filter_map(|entry| match &entry.call {
                BrokerCall::SubmitOrder(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, PaperState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst)
    }

    fn fill_deal(&self, state: &mut PaperState, request: &OrderSendRequest) -> OrderReply {
        let Some(tick) = state.quotes.get(&request.symbol).copied() else {
            return reject(retcode::INVALID, "Unknown symbol");
        };
        let direction = request.order_type.direction();
        let fill_price = match direction {
            Direction::Buy => tick.ask,
            Direction::Sell => tick.bid,
        };

        if let Some(spec) = state.instruments.get(&request.symbol) {
            if request.volume < spec.volume_min || request.volume > spec.volume_max {
                return reject(retcode::INVALID_VOLUME, "Invalid volume");
            }
            let slippage = (request.price - fill_price).abs();
            if request.price > Decimal::ZERO
                && slippage > spec.point * Decimal::from(request.deviation)
            {
                return reject(retcode::REQUOTE, "Requote");
            }
        }

        if !stops_valid(direction, fill_price, request.stop_loss, request.take_profit) {
            return reject(retcode::INVALID_STOPS, "Invalid stops");
        }

        let ticket = self.ticket();
        state.positions.push(OpenPosition {
            ticket,
            symbol: request.symbol.clone(),
            direction,
            volume: request.volume,
            open_price: fill_price,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            identifier: request.identifier,
            profit: Decimal::ZERO,
        });

        OrderReply {
            retcode: retcode::DONE,
            order_ref: ticket,
            deal_ref: self.ticket(),
            fill_price,
            fill_volume: request.volume,
            comment: "Request executed".to_string(),
        }
    }

    fn place_pending(&self, state: &mut PaperState, request: &OrderSendRequest) -> OrderReply {
        let Some(tick) = state.quotes.get(&request.symbol).copied() else {
            return reject(retcode::INVALID, "Unknown symbol");
        };

        let price_valid = match request.order_type {
            OrderType::BuyLimit => request.price < tick.ask,
            OrderType::SellLimit => request.price > tick.bid,
            OrderType::Buy | OrderType::Sell => false,
        };
        if !price_valid {
            return reject(retcode::INVALID_PRICE, "Invalid price");
        }

        if let Some(spec) = state.instruments.get(&request.symbol)
            && (request.volume < spec.volume_min || request.volume > spec.volume_max)
        {
            return reject(retcode::INVALID_VOLUME, "Invalid volume");
        }

        let direction = request.order_type.direction();
        if !stops_valid(direction, request.price, request.stop_loss, request.take_profit) {
            return reject(retcode::INVALID_STOPS, "Invalid stops");
        }

        let ticket = self.ticket();
        state.pending.push(PendingOrder {
            ticket,
            symbol: request.symbol.clone(),
            order_type: request.order_type,
            volume: request.volume,
            price: request.price,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            identifier: request.identifier,
            placed_at: Utc::now(),
        });

        OrderReply {
            retcode: retcode::PLACED,
            order_ref: ticket,
            deal_ref: 0,
            fill_price: Decimal::ZERO,
            fill_volume: Decimal::ZERO,
            comment: "Order placed".to_string(),
        }
    }
}

impl BrokerGateway for PaperBroker {
    fn submit_order(&self, request: &OrderSendRequest) -> Result<OrderReply, TransportFault> {
        let mut state = self.lock();
        if let Some(fault) = state.record(BrokerCall::SubmitOrder(request.clone())) {
            return fault_reply(fault);
        }

        if request.volume <= Decimal::ZERO {
            return Ok(reject(retcode::INVALID_VOLUME, "Invalid volume"));
        }

        Ok(match request.action {
            TradeAction::Deal if !request.order_type.is_pending() => {
                self.fill_deal(&mut state, request)
            }
            TradeAction::Pending if request.order_type.is_pending() => {
                self.place_pending(&mut state, request)
            }
            _ => reject(retcode::INVALID, "Order type does not match action"),
        })
    }

    fn modify_stops(
        &self,
        ticket: u64,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<OrderReply, TransportFault> {
        let mut state = self.lock();
        if let Some(fault) = state.record(BrokerCall::ModifyStops {
            ticket,
            stop_loss,
            take_profit,
        }) {
            return fault_reply(fault);
        }

        let Some(position) = state.positions.iter_mut().find(|p| p.ticket == ticket) else {
            return Ok(reject(retcode::POSITION_CLOSED, "Position not found"));
        };

        if !stops_valid(position.direction, position.open_price, stop_loss, take_profit) {
            return Ok(reject(retcode::INVALID_STOPS, "Invalid stops"));
        }

        position.stop_loss = stop_loss;
        position.take_profit = take_profit;

        Ok(OrderReply {
            retcode: retcode::DONE,
            order_ref: ticket,
            deal_ref: 0,
            fill_price: Decimal::ZERO,
            fill_volume: Decimal::ZERO,
            comment: "Stops modified".to_string(),
        })
    }

    fn close_position(
        &self,
        request: &ClosePositionRequest,
    ) -> Result<OrderReply, TransportFault> {
        let mut state = self.lock();
        if let Some(fault) = state.record(BrokerCall::ClosePosition(request.clone())) {
            return fault_reply(fault);
        }

        let Some(index) = state
            .positions
            .iter()
            .position(|p| p.ticket == request.ticket)
        else {
            return Ok(reject(retcode::POSITION_CLOSED, "Position not found"));
        };

        let position = state.positions[index].clone();
        if request.order_type.direction() != position.direction.opposite() {
            return Ok(reject(retcode::INVALID, "Close must use the opposite side"));
        }
        if request.volume <= Decimal::ZERO || request.volume > position.volume {
            return Ok(reject(retcode::INVALID_VOLUME, "Invalid volume"));
        }

        let Some(tick) = state.quotes.get(&position.symbol).copied() else {
            return Ok(reject(retcode::INVALID, "Unknown symbol"));
        };
        let fill_price = match position.direction {
            Direction::Buy => tick.bid,
            Direction::Sell => tick.ask,
        };
        let move_per_unit = match position.direction {
            Direction::Buy => fill_price - position.open_price,
            Direction::Sell => position.open_price - fill_price,
        };
        let realized = move_per_unit * request.volume * state.contract_size(&position.symbol);
        state.balance += realized;

        let remaining = position.volume - request.volume;
        if remaining.is_zero() {
            state.positions.remove(index);
        } else {
            state.positions[index].volume = remaining;
        }

        Ok(OrderReply {
            retcode: retcode::DONE,
            order_ref: self.ticket(),
            deal_ref: self.ticket(),
            fill_price,
            fill_volume: request.volume,
            comment: "Position closed".to_string(),
        })
    }

    fn tick(&self, symbol: &str) -> Result<Tick, TransportFault> {
        let mut state = self.lock();
        if let Some(fault) = state.record(BrokerCall::Tick(symbol.to_string())) {
            return Err(read_fault(fault));
        }

        state
            .quotes
            .get(symbol)
            .copied()
            .ok_or_else(|| TransportFault::new(format!("no quote for {symbol}")))
    }

    fn account(&self) -> Result<AccountInfo, TransportFault> {
        let mut state = self.lock();
        if let Some(fault) = state.record(BrokerCall::Account) {
            return Err(read_fault(fault));
        }

        Ok(AccountInfo {
            balance: state.balance,
        })
    }

    fn open_positions(
        &self,
        filter: &PositionFilter,
    ) -> Result<Vec<OpenPosition>, TransportFault> {
        let mut state = self.lock();
        if let Some(fault) = state.record(BrokerCall::OpenPositions(filter.symbol.clone())) {
            return Err(read_fault(fault));
        }

        Ok(state
            .positions
            .iter()
            .filter(|position| filter.matches(position))
            .map(|position| OpenPosition {
                profit: state.profit(position),
                ..position.clone()
            })
            .collect())
    }
}

/// Direction-aware stop check against a reference price. Zero means unset.
fn stops_valid(
    direction: Direction,
    price: Decimal,
    stop_loss: Decimal,
    take_profit: Decimal,
) -> bool {
    let sl_ok = stop_loss.is_zero()
        || match direction {
            Direction::Buy => stop_loss < price,
            Direction::Sell => stop_loss > price,
        };
    let tp_ok = take_profit.is_zero()
        || match direction {
            Direction::Buy => take_profit > price,
            Direction::Sell => take_profit < price,
        };
    sl_ok && tp_ok
}

fn reject(code: u32, comment: &str) -> OrderReply {
    OrderReply {
        retcode: code,
        order_ref: 0,
        deal_ref: 0,
        fill_price: Decimal::ZERO,
        fill_volume: Decimal::ZERO,
        comment: comment.to_string(),
    }
}

fn fault_reply(fault: PaperFault) -> Result<OrderReply, TransportFault> {
    match fault {
        PaperFault::Reject { retcode, comment } => Ok(reject(retcode, &comment)),
        PaperFault::Transport(message) => Err(TransportFault::new(message)),
    }
}

fn read_fault(fault: PaperFault) -> TransportFault {
    match fault {
        PaperFault::Reject { retcode, comment } => {
            TransportFault::new(format!("retcode {retcode}: {comment}"))
        }
        PaperFault::Transport(message) => TransportFault::new(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::instrument::fixtures;
    use rust_decimal_macros::dec;

    fn broker() -> PaperBroker {
        PaperBroker::new(dec!(10000))
            .with_instrument(fixtures::eurusd())
            .with_quote("EURUSD", dec!(1.09990), dec!(1.10000))
    }

    fn order(order_type: OrderType, price: Decimal) -> OrderSendRequest {
        OrderSendRequest {
            action: if order_type.is_pending() {
                TradeAction::Pending
            } else {
                TradeAction::Deal
            },
            symbol: "EURUSD".to_string(),
            volume: dec!(0.2),
            order_type,
            price,
            stop_loss: dec!(1.0950),
            take_profit: dec!(1.1100),
            identifier: OrderIdentifier::from_raw(120_001),
            comment: "test".to_string(),
            deviation: 20,
        }
    }

    #[test]
    fn test_market_buy_fills_at_ask() {
        let broker = broker();
        let reply = broker
            .submit_order(&order(OrderType::Buy, dec!(1.1000)))
            .expect("reply");

        assert_eq!(reply.retcode, retcode::DONE);
        assert_eq!(reply.fill_price, dec!(1.10000));
        assert_eq!(reply.fill_volume, dec!(0.2));

        let positions = broker.positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].ticket, reply.order_ref);
        assert_eq!(positions[0].direction, Direction::Buy);
    }

    #[test]
    fn test_requote_beyond_deviation() {
        let broker = broker();
        let reply = broker
            .submit_order(&order(OrderType::Buy, dec!(1.0990)))
            .expect("reply");
        assert_eq!(reply.retcode, retcode::REQUOTE);
        assert!(broker.positions().is_empty());
    }

    #[test]
    fn test_buy_limit_rests_then_fills() {
        let broker = broker();
        let reply = broker
            .submit_order(&order(OrderType::BuyLimit, dec!(1.0990)))
            .expect("reply");

        assert_eq!(reply.retcode, retcode::PLACED);
        assert_eq!(broker.pending_orders().len(), 1);
        assert!(broker.positions().is_empty());

        broker.set_quote("EURUSD", dec!(1.09880), dec!(1.09890));

        assert!(broker.pending_orders().is_empty());
        let positions = broker.positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].open_price, dec!(1.0990));
    }

    #[test]
    fn test_buy_limit_above_market_rejected() {
        let reply = broker()
            .submit_order(&order(OrderType::BuyLimit, dec!(1.1010)))
            .expect("reply");
        assert_eq!(reply.retcode, retcode::INVALID_PRICE);
    }

    #[test]
    fn test_invalid_stops_rejected() {
        let mut request = order(OrderType::Buy, dec!(1.1000));
        request.stop_loss = dec!(1.1050);

        let reply = broker().submit_order(&request).expect("reply");
        assert_eq!(reply.retcode, retcode::INVALID_STOPS);
    }

    #[test]
    fn test_scripted_faults_are_consumed_in_order() {
        let broker = broker();
        broker.inject_fault(
            BrokerOperation::SubmitOrder,
            PaperFault::Reject {
                retcode: retcode::NO_MONEY,
                comment: "No money".to_string(),
            },
        );
        broker.inject_fault(
            BrokerOperation::SubmitOrder,
            PaperFault::Transport("timeout".to_string()),
        );

        let request = order(OrderType::Buy, dec!(1.1000));
        let first = broker.submit_order(&request).expect("reply");
        assert_eq!(first.retcode, retcode::NO_MONEY);

        let second = broker.submit_order(&request);
        assert_eq!(second, Err(TransportFault::new("timeout")));

        let third = broker.submit_order(&request).expect("reply");
        assert_eq!(third.retcode, retcode::DONE);
        assert_eq!(broker.submitted_orders().len(), 3);
    }

    #[test]
    fn test_partial_close_realizes_profit() {
        let broker = broker();
        let reply = broker
            .submit_order(&order(OrderType::Buy, dec!(1.1000)))
            .expect("reply");

        broker.set_quote("EURUSD", dec!(1.10100), dec!(1.10110));

        let close = broker
            .close_position(&ClosePositionRequest {
                ticket: reply.order_ref,
                symbol: "EURUSD".to_string(),
                volume: dec!(0.1),
                order_type: OrderType::Sell,
                price: dec!(1.10100),
                identifier: OrderIdentifier::from_raw(120_001),
                deviation: 20,
                comment: String::new(),
            })
            .expect("reply");

        assert_eq!(close.retcode, retcode::DONE);
        // 0.001 * 0.1 lot * 100000
        assert_eq!(broker.balance(), dec!(10010));
        assert_eq!(broker.positions()[0].volume, dec!(0.1));
    }

    #[test]
    fn test_close_unknown_ticket() {
        let reply = broker()
            .close_position(&ClosePositionRequest {
                ticket: 999,
                symbol: "EURUSD".to_string(),
                volume: dec!(0.1),
                order_type: OrderType::Sell,
                price: dec!(1.1),
                identifier: OrderIdentifier::from_raw(120_001),
                deviation: 20,
                comment: String::new(),
            })
            .expect("reply");
        assert_eq!(reply.retcode, retcode::POSITION_CLOSED);
    }

    #[test]
    fn test_read_fault_becomes_transport() {
        let broker = broker();
        broker.inject_fault(
            BrokerOperation::Tick,
            PaperFault::Reject {
                retcode: retcode::REJECT,
                comment: "busy".to_string(),
            },
        );

        assert!(broker.tick("EURUSD").is_err());
        assert!(broker.tick("EURUSD").is_ok());
        assert!(broker.tick("GBPUSD").is_err());
    }

    #[test]
    fn test_journal_records_every_call() {
        let broker = broker();
        let _ = broker.account();
        let _ = broker.open_positions(&PositionFilter::symbol("EURUSD"));

        let calls = broker.calls();
        assert_eq!(
            calls,
            vec![
                BrokerCall::Account,
                BrokerCall::OpenPositions(Some("EURUSD".to_string())),
            ]
        );
        assert!(broker.journal()[0].at <= broker.journal()[1].at);
    }
}
