//! Upward-facing API used by the bot decision layer.
//!
//! [`TradeExecutor`] wires the order gateway, dual-leg coordinator and
//! position probe to one broker, and fills in what a decision does not
//! carry: bot/config identity, the next sequence number, the live account
//! balance and the default risk.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trade_executor::{TradeDecision, TradeExecutor, broker::PaperBroker, config::load_config};
//!
//! let config = load_config(None)?;
//! let broker = Arc::new(PaperBroker::from_config(&config.paper));
//! let executor = TradeExecutor::new(broker, &config)?;
//!
//! if executor.route_for("EURUSD")? == ProbeRoute::Evaluate {
//!     let result = executor.execute_decision(&decision)?;
//! }
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::broker::{BrokerGateway, RetryPolicy, retry_read};
use crate::config::{Config, ExecutorConfig, RiskConfig};
use crate::error::ExecutionError;
use crate::execution::{
    CloseResult, DualLegCoordinator, DualLegRequest, DualLegResult, LegOrderRequest,
    LegOrderResult, OrderGateway, PositionProbe, ProbeResult, ProbeRoute, StopsUpdate,
};
use crate::identifier::{IdentifierScope, SequenceCounter};
use crate::models::{Direction, InstrumentSpec};
use crate::observability::record_transport_failure;

/// A dual-leg entry decision as produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDecision {
    /// Instrument symbol.
    pub symbol: String,
    /// Side of both legs.
    pub direction: Direction,
    /// Market reference price.
    pub entry_price: Decimal,
    /// Limit leg price.
    pub limit_price: Decimal,
    /// Shared stop-loss.
    pub stop_loss: Decimal,
    /// Shared take-profit.
    pub take_profit: Decimal,
    /// Broker instrument description.
    pub instrument: InstrumentSpec,
    /// Risk override; the configured default applies when absent.
    #[serde(default)]
    pub risk_percent: Option<Decimal>,
}

/// Execution core bound to one broker and one bot identity.
#[derive(Debug)]
pub struct TradeExecutor<B: BrokerGateway> {
    broker: Arc<B>,
    gateway: OrderGateway<B>,
    coordinator: DualLegCoordinator<B>,
    probe: PositionProbe<B>,
    identity: ExecutorConfig,
    risk: RiskConfig,
    scope: IdentifierScope,
    sequence: SequenceCounter,
    read_policy: RetryPolicy,
}

impl<B: BrokerGateway> TradeExecutor<B> {
    /// Wire an executor from configuration.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the configured bot or config id is out of range.
    pub fn new(broker: Arc<B>, config: &Config) -> Result<Self, ExecutionError> {
        let scope = config.executor.identifier_scope()?;
        let read_policy = config.retry.to_policy();
        let gateway = OrderGateway::new(Arc::clone(&broker), config.executor.gateway_settings())
            .with_read_policy(read_policy.clone());

        Ok(Self {
            coordinator: DualLegCoordinator::new(gateway.clone()),
            probe: PositionProbe::new(Arc::clone(&broker), read_policy.clone()),
            gateway,
            broker,
            identity: config.executor.clone(),
            risk: config.risk.clone(),
            scope,
            sequence: SequenceCounter::default(),
            read_policy,
        })
    }

    /// Continue sequence numbering from `start` (e.g. after a restart).
    #[must_use]
    pub fn with_sequence_start(mut self, start: u16) -> Self {
        self.sequence = SequenceCounter::starting_at(start);
        self
    }

    /// Scope covering this bot and config.
    #[must_use]
    pub const fn scope(&self) -> &IdentifierScope {
        &self.scope
    }

    /// Take the next identifier sequence number.
    pub fn next_sequence(&self) -> u16 {
        self.sequence.next_sequence()
    }

    /// Current account balance, read with retries.
    ///
    /// # Errors
    ///
    /// `Transport` once retries are exhausted.
    pub fn account_balance(&self) -> Result<Decimal, ExecutionError> {
        retry_read(&self.read_policy, "account", || self.broker.account())
            .map(|account| account.balance)
            .map_err(|fault| {
                record_transport_failure("account");
                fault.into()
            })
    }

    /// Open a dual-leg position from a fully specified request.
    ///
    /// # Errors
    ///
    /// See [`DualLegCoordinator::open`].
    pub fn compute_and_open_dual(
        &self,
        request: &DualLegRequest,
    ) -> Result<DualLegResult, ExecutionError> {
        self.coordinator.open(request)
    }

    /// Open a dual-leg position from a decision, filling in identity, the
    /// next sequence, the account balance and the default risk.
    ///
    /// # Errors
    ///
    /// `Transport` if the balance cannot be read, otherwise as
    /// [`DualLegCoordinator::open`].
    pub fn execute_decision(
        &self,
        decision: &TradeDecision,
    ) -> Result<DualLegResult, ExecutionError> {
        let balance = self.account_balance()?;
        let request = DualLegRequest {
            symbol: decision.symbol.clone(),
            direction: decision.direction,
            balance,
            risk_percent: decision
                .risk_percent
                .unwrap_or(self.risk.default_risk_percent),
            entry_price: decision.entry_price,
            limit_price: decision.limit_price,
            stop_loss: decision.stop_loss,
            take_profit: decision.take_profit,
            instrument: decision.instrument.clone(),
            bot_id: self.identity.bot_id,
            config_id: self.identity.config_id,
            sequence: self.next_sequence(),
        };

        self.compute_and_open_dual(&request)
    }

    /// Submit one order.
    ///
    /// # Errors
    ///
    /// See [`OrderGateway::submit`].
    pub fn open_single(&self, request: &LegOrderRequest) -> Result<LegOrderResult, ExecutionError> {
        self.gateway.submit(request)
    }

    /// Replace the stops of an open position.
    ///
    /// # Errors
    ///
    /// See [`OrderGateway::modify_stops`].
    pub fn adjust_stops(
        &self,
        ticket: u64,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<StopsUpdate, ExecutionError> {
        self.gateway.modify_stops(ticket, stop_loss, take_profit)
    }

    /// Close a position, fully when `volume` is `None`.
    ///
    /// # Errors
    ///
    /// See [`OrderGateway::close`].
    pub fn close_position(
        &self,
        ticket: u64,
        volume: Option<Decimal>,
    ) -> Result<CloseResult, ExecutionError> {
        self.gateway.close(ticket, volume)
    }

    /// Open positions on `symbol` inside `scope`.
    ///
    /// # Errors
    ///
    /// See [`PositionProbe::has_open_position`].
    pub fn probe(
        &self,
        symbol: &str,
        scope: &IdentifierScope,
    ) -> Result<ProbeResult, ExecutionError> {
        self.probe.has_open_position(symbol, scope)
    }

    /// Whether `symbol` has an open position inside `scope`.
    ///
    /// # Errors
    ///
    /// See [`PositionProbe::has_open_position`].
    pub fn probe_open_position(
        &self,
        symbol: &str,
        scope: &IdentifierScope,
    ) -> Result<bool, ExecutionError> {
        self.probe(symbol, scope).map(|result| result.has_open)
    }

    /// Route for `symbol` given this executor's own positions.
    ///
    /// # Errors
    ///
    /// See [`PositionProbe::has_open_position`].
    pub fn route_for(&self, symbol: &str) -> Result<ProbeRoute, ExecutionError> {
        self.probe(symbol, &self.scope).map(|result| result.route())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{AccountInfo, MockBrokerGateway, OrderReply, TransportFault, retcode};
    use crate::config::RetryConfig;
    use crate::models::instrument::fixtures;
    use rust_decimal_macros::dec;

    fn config() -> Config {
        let mut config = Config::default();
        config.executor.bot_id = 102;
        config.executor.config_id = 4;
        config.retry = RetryConfig {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        };
        config
    }

    fn decision() -> TradeDecision {
        TradeDecision {
            symbol: "EURUSD".to_string(),
            direction: Direction::Buy,
            entry_price: dec!(1.1000),
            limit_price: dec!(1.0990),
            stop_loss: dec!(1.0950),
            take_profit: dec!(1.1100),
            instrument: fixtures::eurusd(),
            risk_percent: None,
        }
    }

    fn accepted(code: u32) -> OrderReply {
        OrderReply {
            retcode: code,
            order_ref: 1,
            deal_ref: 0,
            fill_price: Decimal::ZERO,
            fill_volume: Decimal::ZERO,
            comment: String::new(),
        }
    }

    #[test]
    fn test_rejects_bad_identity() {
        let mut config = config();
        config.executor.bot_id = 9;

        let result = TradeExecutor::new(Arc::new(MockBrokerGateway::new()), &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_decision_uses_balance_identity_and_sequence() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_account().times(2).returning(|| {
            Ok(AccountInfo {
                balance: dec!(20000),
            })
        });
        // 20000 * 1% over 500 ticks at $1 = 0.4 lots; bot 102 maps to 2
        mock.expect_submit_order()
            .withf(|req| req.volume == dec!(0.4) && req.identifier.value() == 240_005)
            .times(1)
            .returning(|_| Ok(accepted(retcode::DONE)));
        mock.expect_submit_order()
            .withf(|req| req.volume == dec!(0.4) && req.identifier.value() == 241_005)
            .times(1)
            .returning(|_| Ok(accepted(retcode::PLACED)));
        mock.expect_submit_order()
            .withf(|req| req.identifier.value() == 240_006)
            .times(1)
            .returning(|_| Ok(accepted(retcode::NO_MONEY)));

        let executor = TradeExecutor::new(Arc::new(mock), &config())
            .expect("valid config")
            .with_sequence_start(5);

        let result = executor.execute_decision(&decision()).expect("should open");
        assert_eq!(result.sized.risk_amount, dec!(200));

        // The failed attempt still consumes a sequence number
        let err = executor.execute_decision(&decision()).expect_err("no money");
        assert_eq!(err.code(), crate::error::ErrorCode::Coordination);
    }

    #[test]
    fn test_risk_override() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_account().returning(|| {
            Ok(AccountInfo {
                balance: dec!(10000),
            })
        });
        mock.expect_submit_order()
            .withf(|req| req.volume == dec!(0.5))
            .times(2)
            .returning(|req| {
                Ok(accepted(if req.order_type.is_pending() {
                    retcode::PLACED
                } else {
                    retcode::DONE
                }))
            });

        let executor = TradeExecutor::new(Arc::new(mock), &config()).expect("valid config");
        let decision = TradeDecision {
            risk_percent: Some(dec!(2.5)),
            ..decision()
        };
        assert!(executor.execute_decision(&decision).is_ok());
    }

    #[test]
    fn test_balance_transport_failure_sends_nothing() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_account()
            .times(2)
            .returning(|| Err(TransportFault::new("offline")));
        mock.expect_submit_order().times(0);

        let executor = TradeExecutor::new(Arc::new(mock), &config()).expect("valid config");
        let err = executor.execute_decision(&decision()).expect_err("offline");
        assert!(matches!(err, ExecutionError::Transport(_)));
    }

    #[test]
    fn test_route_uses_own_scope() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_open_positions().times(1).returning(|_| Ok(vec![]));

        let executor = TradeExecutor::new(Arc::new(mock), &config()).expect("valid config");
        assert_eq!(executor.scope().bot_id(), 2);
        assert_eq!(executor.scope().config_id(), Some(4));
        assert_eq!(
            executor.route_for("EURUSD").expect("should probe"),
            ProbeRoute::Evaluate
        );
    }
}
