//! Dual-leg open flow.

use rust_decimal::Decimal;

use super::stage::StageTrail;
use super::{DualLegRequest, DualLegResult, DualLegStage};
use crate::broker::BrokerGateway;
use crate::error::{CoordinationError, ExecutionError, PartialExecutionError};
use crate::execution::{LegOrderRequest, OrderGateway};
use crate::identifier::{OrderIdentifier, encode};
use crate::models::{Direction, LegKind};
use crate::observability::record_dual_leg_outcome;
use crate::risk::{LotNormalizer, NormalizedLot, RiskRequest, RiskSizer, SizedLot};

/// Opens market + limit pairs.
#[derive(Debug)]
pub struct DualLegCoordinator<B: BrokerGateway> {
    gateway: OrderGateway<B>,
    sizer: RiskSizer,
    normalizer: LotNormalizer,
}

impl<B: BrokerGateway> DualLegCoordinator<B> {
    /// Create a coordinator submitting through `gateway`.
    #[must_use]
    pub const fn new(gateway: OrderGateway<B>) -> Self {
        Self {
            gateway,
            sizer: RiskSizer::new(),
            normalizer: LotNormalizer::new(),
        }
    }

    /// Open both legs.
    ///
    /// Validation, identifier encoding, sizing and normalization all happen
    /// before the first broker call, so an `InvalidParameter` or
    /// `InvalidRisk` error guarantees nothing was sent.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` / `InvalidRisk`: nothing was sent.
    /// - `Coordination`: the market leg failed, nothing is open.
    /// - `PartialExecution`: the market leg is live, the limit leg failed.
    pub fn open(&self, request: &DualLegRequest) -> Result<DualLegResult, ExecutionError> {
        validate(request)?;
        let mut trail = StageTrail::start();

        let (market_identifier, limit_identifier) = assign_identifiers(request)?;
        trail.advance(DualLegStage::IdentifiersAssigned);

        let (sized, lot) = self.compute_lot(request)?;
        trail.advance(DualLegStage::LotComputed);

        tracing::info!(
            symbol = %request.symbol,
            direction = %request.direction,
            market_identifier = %market_identifier,
            limit_identifier = %limit_identifier,
            raw_lot = %sized.lot,
            lot = %lot.lot,
            adjustment = %lot.reason,
            risk_amount = %sized.risk_amount,
            "Opening dual-leg position"
        );

        let market_request = LegOrderRequest::market(
            request.symbol.clone(),
            request.direction,
            lot.lot,
            request.entry_price,
            market_identifier,
        )
        .with_stops(request.stop_loss, request.take_profit);

        let market = match self.gateway.submit_market(&market_request) {
            Ok(market) => market,
            Err(cause) => {
                trail.advance(DualLegStage::MarketFailed);
                record_dual_leg_outcome(trail.current().as_str());
                tracing::error!(
                    symbol = %request.symbol,
                    market_identifier = %market_identifier,
                    error = %cause,
                    "Market leg failed, limit leg not attempted"
                );
                return Err(CoordinationError {
                    symbol: request.symbol.clone(),
                    market_identifier,
                    cause: Box::new(cause),
                }
                .into());
            }
        };
        trail.advance(DualLegStage::MarketSubmitted);

        let limit_request = LegOrderRequest::limit(
            request.symbol.clone(),
            request.direction,
            lot.lot,
            request.limit_price,
            limit_identifier,
        )
        .with_stops(request.stop_loss, request.take_profit);

        let limit = match self.gateway.submit_limit(&limit_request) {
            Ok(limit) => limit,
            Err(cause) => {
                trail.advance(DualLegStage::LimitFailedAfterMarket);
                record_dual_leg_outcome(trail.current().as_str());
                tracing::error!(
                    symbol = %request.symbol,
                    market_identifier = %market_identifier,
                    market_order_ref = market.order_ref,
                    limit_identifier = %limit_identifier,
                    error = %cause,
                    "Limit leg failed after market leg opened, manual reconciliation required"
                );
                return Err(ExecutionError::PartialExecution(Box::new(
                    PartialExecutionError {
                        market,
                        market_identifier,
                        limit_identifier,
                        cause: Box::new(cause),
                    },
                )));
            }
        };
        trail.advance(DualLegStage::LimitSubmitted);
        trail.advance(DualLegStage::Done);
        record_dual_leg_outcome(trail.current().as_str());

        tracing::info!(
            symbol = %request.symbol,
            market_order_ref = market.order_ref,
            limit_order_ref = limit.order_ref,
            lot = %lot.lot,
            "Dual-leg position opened"
        );

        Ok(DualLegResult {
            symbol: request.symbol.clone(),
            direction: request.direction,
            market,
            limit,
            market_identifier,
            limit_identifier,
            sized,
            lot,
            stages: trail.into_stages(),
        })
    }

    fn compute_lot(
        &self,
        request: &DualLegRequest,
    ) -> Result<(SizedLot, NormalizedLot), ExecutionError> {
        let sized = self.sizer.compute_lot(&RiskRequest {
            balance: request.balance,
            risk_percent: request.risk_percent,
            entry_price: request.entry_price,
            stop_loss: request.stop_loss,
            instrument: request.instrument.clone(),
        })?;
        let lot = self.normalizer.normalize(sized.lot, &request.instrument)?;
        Ok((sized, lot))
    }
}

fn assign_identifiers(
    request: &DualLegRequest,
) -> Result<(OrderIdentifier, OrderIdentifier), ExecutionError> {
    let market = encode(
        request.bot_id,
        request.config_id,
        LegKind::Market,
        request.sequence,
    )?;
    let limit = encode(
        request.bot_id,
        request.config_id,
        LegKind::Limit,
        request.sequence,
    )?;
    Ok((market, limit))
}

/// Direction-aware ordering of entry, limit and stops.
///
/// Buy: `stop_loss < entry < take_profit` and `stop_loss < limit < take_profit`.
/// Sell: the mirror image.
fn validate(request: &DualLegRequest) -> Result<(), ExecutionError> {
    if request.symbol.trim().is_empty() {
        return Err(ExecutionError::invalid("symbol", "must not be empty"));
    }
    if request.symbol != request.instrument.symbol {
        return Err(ExecutionError::invalid(
            "instrument",
            format!(
                "instrument is for {}, request is for {}",
                request.instrument.symbol, request.symbol
            ),
        ));
    }

    for (field, value) in [
        ("entry_price", request.entry_price),
        ("limit_price", request.limit_price),
        ("stop_loss", request.stop_loss),
        ("take_profit", request.take_profit),
    ] {
        if value <= Decimal::ZERO {
            return Err(ExecutionError::invalid(
                field,
                format!("must be positive, got {value}"),
            ));
        }
    }

    let (lower, upper) = match request.direction {
        Direction::Buy => (request.stop_loss, request.take_profit),
        Direction::Sell => (request.take_profit, request.stop_loss),
    };
    let relation = match request.direction {
        Direction::Buy => "stop_loss < entry_price < take_profit",
        Direction::Sell => "take_profit < entry_price < stop_loss",
    };

    if !(lower < request.entry_price && request.entry_price < upper) {
        return Err(ExecutionError::invalid(
            "stop_loss",
            format!(
                "{} requires {relation}, got stop_loss={} entry_price={} take_profit={}",
                request.direction, request.stop_loss, request.entry_price, request.take_profit
            ),
        ));
    }

    if !(lower < request.limit_price && request.limit_price < upper) {
        return Err(ExecutionError::invalid(
            "limit_price",
            format!(
                "{} limit {} must lie strictly between {lower} and {upper}",
                request.direction, request.limit_price
            ),
        ));
    }

    Ok(())
}
