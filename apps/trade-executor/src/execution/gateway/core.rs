//! Order gateway implementation.
//!
//! Trade requests (submit, modify, close) are sent exactly once. A missing
//! reply becomes [`ExecutionError::Transport`] so the caller can re-query
//! positions before assuming nothing happened. Read calls made on the way
//! (position lookup and quote for a close) go through the retry policy.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::{CloseResult, GatewaySettings, LegOrderRequest, LegOrderResult, StopsUpdate};
use crate::broker::{
    BrokerGateway, ClosePositionRequest, OrderReply, OrderSendRequest, PositionFilter,
    RetryPolicy, TransportFault, retry_read,
};
use crate::error::ExecutionError;
use crate::models::{Direction, LegKind};
use crate::observability::{
    record_lot_size, record_order_rejection, record_order_submission, record_transport_failure,
};

/// Single-order submission, stop modification and close.
///
/// Generic over the broker so tests can substitute a mock and the binary a
/// paper account.
#[derive(Debug)]
pub struct OrderGateway<B: BrokerGateway> {
    broker: Arc<B>,
    settings: GatewaySettings,
    read_policy: RetryPolicy,
}

impl<B: BrokerGateway> Clone for OrderGateway<B> {
    fn clone(&self) -> Self {
        Self {
            broker: Arc::clone(&self.broker),
            settings: self.settings.clone(),
            read_policy: self.read_policy.clone(),
        }
    }
}

impl<B: BrokerGateway> OrderGateway<B> {
    /// Create a gateway with the default read retry policy.
    #[must_use]
    pub fn new(broker: Arc<B>, settings: GatewaySettings) -> Self {
        Self {
            broker,
            settings,
            read_policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy used for read-only calls.
    #[must_use]
    pub fn with_read_policy(mut self, policy: RetryPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    /// The broker this gateway talks to.
    #[must_use]
    pub const fn broker(&self) -> &Arc<B> {
        &self.broker
    }

    /// Retry policy for read-only calls.
    #[must_use]
    pub const fn read_policy(&self) -> &RetryPolicy {
        &self.read_policy
    }

    /// Submit a market leg.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the request is not a market leg or fails
    /// validation, `Rejected` on a non-success retcode, `Transport` if the
    /// broker did not answer.
    pub fn submit_market(&self, request: &LegOrderRequest) -> Result<LegOrderResult, ExecutionError> {
        expect_leg(request, LegKind::Market)?;
        self.submit(request)
    }

    /// Submit a limit leg.
    ///
    /// # Errors
    ///
    /// As [`OrderGateway::submit_market`].
    pub fn submit_limit(&self, request: &LegOrderRequest) -> Result<LegOrderResult, ExecutionError> {
        expect_leg(request, LegKind::Limit)?;
        self.submit(request)
    }

    /// Submit either leg kind.
    ///
    /// # Errors
    ///
    /// As [`OrderGateway::submit_market`].
    pub fn submit(&self, request: &LegOrderRequest) -> Result<LegOrderResult, ExecutionError> {
        validate_leg(request)?;

        let leg = request.leg.as_str();
        let send = OrderSendRequest {
            action: request.leg.trade_action(),
            symbol: request.symbol.clone(),
            volume: request.volume,
            order_type: request.order_type(),
            price: request.price,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            identifier: request.identifier,
            comment: self.settings.comment.clone(),
            deviation: self.settings.deviation,
        };

        tracing::info!(
            symbol = %request.symbol,
            leg,
            order_type = %send.order_type,
            identifier = %request.identifier,
            volume = %request.volume,
            price = %request.price,
            stop_loss = %request.stop_loss,
            take_profit = %request.take_profit,
            "Submitting order"
        );

        let reply = self
            .broker
            .submit_order(&send)
            .map_err(|fault| transport_error(fault, leg, "submit_order"))?;
        let reply = check_reply(reply, leg)?;

        tracing::info!(
            symbol = %request.symbol,
            leg,
            identifier = %request.identifier,
            retcode = reply.retcode,
            order_ref = reply.order_ref,
            deal_ref = reply.deal_ref,
            fill_price = %reply.fill_price,
            "Order accepted"
        );
        if let Some(lot) = request.volume.to_f64() {
            record_lot_size(&request.symbol, lot);
        }

        Ok(LegOrderResult::from_reply(request, reply))
    }

    /// Replace the stops of an open position. Zero leaves a level unset.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if both levels are zero or either is negative.
    /// `Rejected` or `Transport` from the broker.
    pub fn modify_stops(
        &self,
        ticket: u64,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<StopsUpdate, ExecutionError> {
        if ticket == 0 {
            return Err(ExecutionError::invalid("ticket", "must be non-zero"));
        }
        non_negative("stop_loss", stop_loss)?;
        non_negative("take_profit", take_profit)?;
        if stop_loss.is_zero() && take_profit.is_zero() {
            return Err(ExecutionError::invalid(
                "stops",
                "at least one of stop_loss and take_profit must be set",
            ));
        }

        tracing::info!(
            ticket,
            stop_loss = %stop_loss,
            take_profit = %take_profit,
            "Modifying stops"
        );

        let reply = self
            .broker
            .modify_stops(ticket, stop_loss, take_profit)
            .map_err(|fault| transport_error(fault, "modify", "modify_stops"))?;
        let reply = check_reply(reply, "modify")?;

        Ok(StopsUpdate {
            ticket,
            stop_loss,
            take_profit,
            retcode: reply.retcode,
            comment: reply.comment,
        })
    }

    /// Close an open position, fully when `volume` is `None`.
    ///
    /// The close goes out at the opposite side of the book: bid for a long,
    /// ask for a short. Whether a partial volume is legal is left to the
    /// broker.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a zero ticket, a non-positive volume or an
    /// unknown ticket. `Rejected` or `Transport` from the broker.
    pub fn close(&self, ticket: u64, volume: Option<Decimal>) -> Result<CloseResult, ExecutionError> {
        if ticket == 0 {
            return Err(ExecutionError::invalid("ticket", "must be non-zero"));
        }
        if let Some(volume) = volume
            && volume <= Decimal::ZERO
        {
            return Err(ExecutionError::invalid(
                "volume",
                format!("must be positive, got {volume}"),
            ));
        }

        let positions = retry_read(&self.read_policy, "open_positions", || {
            self.broker.open_positions(&PositionFilter::all())
        })
        .map_err(|fault| read_error(fault, "open_positions"))?;

        let Some(position) = positions.into_iter().find(|p| p.ticket == ticket) else {
            return Err(ExecutionError::invalid(
                "ticket",
                format!("no open position with ticket {ticket}"),
            ));
        };

        let tick = retry_read(&self.read_policy, "tick", || self.broker.tick(&position.symbol))
            .map_err(|fault| read_error(fault, "tick"))?;

        let price = match position.direction {
            Direction::Buy => tick.bid,
            Direction::Sell => tick.ask,
        };
        let request = ClosePositionRequest {
            ticket,
            symbol: position.symbol.clone(),
            volume: volume.unwrap_or(position.volume),
            order_type: position.direction.opposite().market_order_type(),
            price,
            identifier: position.identifier,
            deviation: self.settings.deviation,
            comment: self.settings.comment.clone(),
        };

        tracing::info!(
            ticket,
            symbol = %request.symbol,
            order_type = %request.order_type,
            volume = %request.volume,
            open_volume = %position.volume,
            price = %request.price,
            "Closing position"
        );

        let reply = self
            .broker
            .close_position(&request)
            .map_err(|fault| transport_error(fault, "close", "close_position"))?;
        let reply = check_reply(reply, "close")?;

        Ok(CloseResult {
            ticket,
            symbol: request.symbol,
            order_type: request.order_type,
            volume: request.volume,
            price: request.price,
            retcode: reply.retcode,
            order_ref: reply.order_ref,
            deal_ref: reply.deal_ref,
            fill_price: reply.fill_price,
            comment: reply.comment,
        })
    }
}

/// Pre-submission checks. Zero stops mean "do not set".
pub(crate) fn validate_leg(request: &LegOrderRequest) -> Result<(), ExecutionError> {
    if request.symbol.trim().is_empty() {
        return Err(ExecutionError::invalid("symbol", "must not be empty"));
    }
    if request.volume <= Decimal::ZERO {
        return Err(ExecutionError::invalid(
            "volume",
            format!("must be positive, got {}", request.volume),
        ));
    }
    if request.price <= Decimal::ZERO {
        return Err(ExecutionError::invalid(
            "price",
            format!("must be positive, got {}", request.price),
        ));
    }
    non_negative("stop_loss", request.stop_loss)?;
    non_negative("take_profit", request.take_profit)
}

fn expect_leg(request: &LegOrderRequest, expected: LegKind) -> Result<(), ExecutionError> {
    if request.leg == expected {
        Ok(())
    } else {
        Err(ExecutionError::invalid(
            "leg",
            format!("expected a {expected} leg, got {}", request.leg),
        ))
    }
}

fn non_negative(field: &str, value: Decimal) -> Result<(), ExecutionError> {
    if value < Decimal::ZERO {
        return Err(ExecutionError::invalid(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}

fn check_reply(reply: OrderReply, leg: &str) -> Result<OrderReply, ExecutionError> {
    if reply.is_success() {
        record_order_submission(leg, "done");
        return Ok(reply);
    }

    tracing::warn!(
        leg,
        retcode = reply.retcode,
        comment = %reply.comment,
        "Broker rejected request"
    );
    record_order_submission(leg, "rejected");
    record_order_rejection(leg);

    Err(ExecutionError::Rejected {
        retcode: reply.retcode,
        comment: reply.comment,
    })
}

fn transport_error(fault: TransportFault, leg: &str, operation: &str) -> ExecutionError {
    tracing::error!(leg, operation, error = %fault, "Broker did not respond");
    record_order_submission(leg, "transport_error");
    record_transport_failure(operation);
    fault.into()
}

/// A read that exhausted its retries; no order was sent.
fn read_error(fault: TransportFault, operation: &str) -> ExecutionError {
    tracing::error!(operation, error = %fault, "Broker read failed");
    record_transport_failure(operation);
    fault.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{MockBrokerGateway, OpenPosition, Tick, retcode};
    use crate::identifier::OrderIdentifier;
    use crate::models::{OrderType, TradeAction};
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn done(order_ref: u64) -> OrderReply {
        OrderReply {
            retcode: retcode::DONE,
            order_ref,
            deal_ref: order_ref + 1000,
            fill_price: dec!(1.1000),
            fill_volume: dec!(0.2),
            comment: "Request executed".to_string(),
        }
    }

    fn gateway(mock: MockBrokerGateway) -> OrderGateway<MockBrokerGateway> {
        OrderGateway::new(Arc::new(mock), GatewaySettings::default())
            .with_read_policy(RetryPolicy::immediate(2))
    }

    fn market_request() -> LegOrderRequest {
        LegOrderRequest::market(
            "EURUSD",
            Direction::Buy,
            dec!(0.2),
            dec!(1.1000),
            OrderIdentifier::from_raw(120_007),
        )
        .with_stops(dec!(1.0950), dec!(1.1100))
    }

    fn long_position() -> OpenPosition {
        OpenPosition {
            ticket: 77,
            symbol: "EURUSD".to_string(),
            direction: Direction::Buy,
            volume: dec!(0.3),
            open_price: dec!(1.1000),
            stop_loss: dec!(1.0950),
            take_profit: dec!(1.1100),
            identifier: OrderIdentifier::from_raw(120_007),
            profit: Decimal::ZERO,
        }
    }

    #[test]
    fn test_submit_market_builds_deal() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_submit_order()
            .withf(|req| {
                req.action == TradeAction::Deal
                    && req.order_type == OrderType::Buy
                    && req.stop_loss == dec!(1.0950)
                    && req.take_profit == dec!(1.1100)
                    && req.identifier.value() == 120_007
                    && req.deviation == 20
            })
            .times(1)
            .returning(|_| Ok(done(5001)));

        let result = gateway(mock)
            .submit_market(&market_request())
            .expect("should submit");

        assert_eq!(result.order_ref, 5001);
        assert_eq!(result.leg, LegKind::Market);
        assert_eq!(result.retcode, retcode::DONE);
    }

    #[test]
    fn test_submit_limit_uses_pending_action() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_submit_order()
            .withf(|req| req.action == TradeAction::Pending && req.order_type == OrderType::SellLimit)
            .times(1)
            .returning(|_| {
                Ok(OrderReply {
                    retcode: retcode::PLACED,
                    order_ref: 9,
                    deal_ref: 0,
                    fill_price: Decimal::ZERO,
                    fill_volume: Decimal::ZERO,
                    comment: "Order placed".to_string(),
                })
            });

        let request = LegOrderRequest::limit(
            "EURUSD",
            Direction::Sell,
            dec!(0.1),
            dec!(1.1050),
            OrderIdentifier::from_raw(121_007),
        );
        let result = gateway(mock).submit_limit(&request).expect("should place");
        assert_eq!(result.retcode, retcode::PLACED);
        assert_eq!(result.deal_ref, 0);
    }

    #[test]
    fn test_leg_mismatch_rejected_without_broker_call() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_submit_order().times(0);

        let err = gateway(mock)
            .submit_limit(&market_request())
            .expect_err("market request on limit path");
        assert!(matches!(err, ExecutionError::InvalidParameter { ref field, .. } if field == "leg"));
    }

    #[test]
    fn test_validation_before_submission() {
        let cases = [
            ("symbol", LegOrderRequest { symbol: "  ".to_string(), ..market_request() }),
            ("volume", LegOrderRequest { volume: Decimal::ZERO, ..market_request() }),
            ("price", LegOrderRequest { price: dec!(-1), ..market_request() }),
            ("stop_loss", LegOrderRequest { stop_loss: dec!(-0.1), ..market_request() }),
            ("take_profit", LegOrderRequest { take_profit: dec!(-0.1), ..market_request() }),
        ];

        for (expected_field, request) in cases {
            let mut mock = MockBrokerGateway::new();
            mock.expect_submit_order().times(0);

            let err = gateway(mock).submit(&request).expect_err("should fail validation");
            match err {
                ExecutionError::InvalidParameter { field, .. } => assert_eq!(field, expected_field),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejection_carries_retcode_and_comment() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_submit_order().times(1).returning(|_| {
            Ok(OrderReply {
                retcode: retcode::NO_MONEY,
                order_ref: 0,
                deal_ref: 0,
                fill_price: Decimal::ZERO,
                fill_volume: Decimal::ZERO,
                comment: "No money".to_string(),
            })
        });

        let err = gateway(mock).submit(&market_request()).expect_err("rejected");
        assert_eq!(
            err,
            ExecutionError::Rejected {
                retcode: retcode::NO_MONEY,
                comment: "No money".to_string()
            }
        );
    }

    #[test]
    fn test_partial_fill_is_not_success() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_submit_order().times(1).returning(|_| {
            Ok(OrderReply {
                retcode: retcode::DONE_PARTIAL,
                ..done(1)
            })
        });

        let err = gateway(mock).submit(&market_request()).expect_err("partial");
        assert!(matches!(err, ExecutionError::Rejected { retcode: 10010, .. }));
    }

    #[test]
    fn test_transport_failure_not_retried() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_submit_order()
            .times(1)
            .returning(|_| Err(TransportFault::new("terminal disconnected")));

        let err = gateway(mock).submit(&market_request()).expect_err("no reply");
        assert!(matches!(err, ExecutionError::Transport(ref msg) if msg == "terminal disconnected"));
    }

    #[test]
    fn test_modify_requires_a_level() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_modify_stops().times(0);
        let gateway = gateway(mock);

        assert!(gateway.modify_stops(1, Decimal::ZERO, Decimal::ZERO).is_err());
        assert!(gateway.modify_stops(1, dec!(-1), dec!(1.2)).is_err());
        assert!(gateway.modify_stops(0, dec!(1.0), dec!(1.2)).is_err());
    }

    #[test]
    fn test_modify_stop_loss_only() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_modify_stops()
            .with(eq(77), eq(dec!(1.0990)), eq(Decimal::ZERO))
            .times(1)
            .returning(|ticket, _, _| Ok(done(ticket)));

        let update = gateway(mock)
            .modify_stops(77, dec!(1.0990), Decimal::ZERO)
            .expect("should modify");
        assert_eq!(update.stop_loss, dec!(1.0990));
        assert_eq!(update.take_profit, Decimal::ZERO);
    }

    #[test]
    fn test_close_long_full_volume_at_bid() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_open_positions()
            .times(1)
            .returning(|_| Ok(vec![long_position()]));
        mock.expect_tick()
            .withf(|symbol| symbol == "EURUSD")
            .times(1)
            .returning(|_| {
                Ok(Tick {
                    bid: dec!(1.1040),
                    ask: dec!(1.1042),
                })
            });
        mock.expect_close_position()
            .withf(|req| {
                req.ticket == 77
                    && req.order_type == OrderType::Sell
                    && req.price == dec!(1.1040)
                    && req.volume == dec!(0.3)
                    && req.identifier.value() == 120_007
            })
            .times(1)
            .returning(|_| Ok(done(6001)));

        let result = gateway(mock).close(77, None).expect("should close");
        assert_eq!(result.order_type, OrderType::Sell);
        assert_eq!(result.volume, dec!(0.3));
        assert_eq!(result.price, dec!(1.1040));
    }

    #[test]
    fn test_close_short_partial_at_ask() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_open_positions().times(1).returning(|_| {
            Ok(vec![OpenPosition {
                direction: Direction::Sell,
                ..long_position()
            }])
        });
        mock.expect_tick().times(1).returning(|_| {
            Ok(Tick {
                bid: dec!(1.1040),
                ask: dec!(1.1042),
            })
        });
        mock.expect_close_position()
            .withf(|req| {
                req.order_type == OrderType::Buy
                    && req.price == dec!(1.1042)
                    && req.volume == dec!(0.1)
            })
            .times(1)
            .returning(|_| Ok(done(6002)));

        let result = gateway(mock).close(77, Some(dec!(0.1))).expect("should close");
        assert_eq!(result.volume, dec!(0.1));
    }

    #[test]
    fn test_close_retries_position_lookup() {
        let mut mock = MockBrokerGateway::new();
        let mut calls = 0;
        mock.expect_open_positions().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(TransportFault::new("timeout"))
            } else {
                Ok(vec![long_position()])
            }
        });
        mock.expect_tick().times(1).returning(|_| {
            Ok(Tick {
                bid: dec!(1.1),
                ask: dec!(1.1001),
            })
        });
        mock.expect_close_position()
            .times(1)
            .returning(|_| Ok(done(1)));

        assert!(gateway(mock).close(77, None).is_ok());
    }

    #[test]
    fn test_close_lookup_failure_counts_no_submission() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_open_positions()
            .times(2)
            .returning(|_| Err(TransportFault::new("timeout")));
        mock.expect_close_position().times(0);

        let (result, counters) =
            crate::observability::capture::counters(|| gateway(mock).close(77, None));

        assert!(matches!(result, Err(ExecutionError::Transport(_))));
        assert!(
            counters
                .iter()
                .any(|c| c == "broker_transport_failures_total{operation=open_positions}")
        );
        assert!(
            !counters
                .iter()
                .any(|c| c.starts_with("order_submissions_total")),
            "{counters:?}"
        );
    }

    #[test]
    fn test_close_transport_failure_counts_submission() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_open_positions()
            .times(1)
            .returning(|_| Ok(vec![long_position()]));
        mock.expect_tick().times(1).returning(|_| {
            Ok(Tick {
                bid: dec!(1.1),
                ask: dec!(1.1001),
            })
        });
        mock.expect_close_position()
            .times(1)
            .returning(|_| Err(TransportFault::new("timeout")));

        let (result, counters) =
            crate::observability::capture::counters(|| gateway(mock).close(77, None));

        assert!(matches!(result, Err(ExecutionError::Transport(_))));
        assert!(
            counters
                .iter()
                .any(|c| c == "order_submissions_total{leg=close,status=transport_error}")
        );
    }

    #[test]
    fn test_close_unknown_ticket() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_open_positions()
            .times(1)
            .returning(|_| Ok(vec![long_position()]));
        mock.expect_close_position().times(0);

        let err = gateway(mock).close(12, None).expect_err("unknown ticket");
        assert!(matches!(err, ExecutionError::InvalidParameter { .. }));
    }

    #[test]
    fn test_close_rejects_non_positive_volume() {
        let mut mock = MockBrokerGateway::new();
        mock.expect_open_positions().times(0);

        assert!(gateway(mock).close(77, Some(Decimal::ZERO)).is_err());
    }
}
