//! Core risk sizing logic.

use rust_decimal::Decimal;

use super::types::{RiskRequest, SizedLot};
use crate::error::ExecutionError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Sizes a position so that hitting the stop loses a fixed share of balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskSizer;

impl RiskSizer {
    /// Create a new risk sizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compute the raw lot for a risk request.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::InvalidRisk`] if:
    /// - balance is not positive
    /// - risk percentage is outside (0, 100]
    /// - entry or stop is not positive, or they are equal
    /// - any instrument field is not positive
    /// - the arithmetic overflows
    pub fn compute_lot(&self, request: &RiskRequest) -> Result<SizedLot, ExecutionError> {
        Self::validate(request)?;

        let spec = &request.instrument;

        let risk_amount = request
            .balance
            .checked_mul(request.risk_percent)
            .and_then(|v| v.checked_div(HUNDRED))
            .ok_or_else(|| overflow("risk amount"))?;

        let price_distance = request
            .entry_price
            .checked_sub(request.stop_loss)
            .map(|d| d.abs())
            .ok_or_else(|| overflow("price distance"))?;

        let distance_in_ticks = price_distance
            .checked_div(spec.tick_size)
            .ok_or_else(|| overflow("distance in ticks"))?;

        let per_unit_value = distance_in_ticks
            .checked_mul(spec.tick_value)
            .ok_or_else(|| overflow("per-unit value"))?;

        if per_unit_value <= Decimal::ZERO {
            return Err(ExecutionError::InvalidRisk(format!(
                "{}: stop distance {price_distance} is worth nothing per lot",
                spec.symbol
            )));
        }

        let lot = risk_amount
            .checked_div(per_unit_value)
            .ok_or_else(|| overflow("lot"))?;

        tracing::debug!(
            symbol = %spec.symbol,
            risk_amount = %risk_amount,
            price_distance = %price_distance,
            per_unit_value = %per_unit_value,
            lot = %lot,
            "Computed raw lot"
        );

        Ok(SizedLot {
            lot,
            risk_amount,
            price_distance,
            distance_in_ticks,
            per_unit_value,
        })
    }

    fn validate(request: &RiskRequest) -> Result<(), ExecutionError> {
        if request.balance <= Decimal::ZERO {
            return Err(ExecutionError::InvalidRisk(format!(
                "balance must be positive, got {}",
                request.balance
            )));
        }

        if request.risk_percent <= Decimal::ZERO || request.risk_percent > HUNDRED {
            return Err(ExecutionError::InvalidRisk(format!(
                "risk percentage must be in (0, 100], got {}",
                request.risk_percent
            )));
        }

        if request.entry_price <= Decimal::ZERO || request.stop_loss <= Decimal::ZERO {
            return Err(ExecutionError::InvalidRisk(format!(
                "entry {} and stop {} must be positive",
                request.entry_price, request.stop_loss
            )));
        }

        if request.entry_price == request.stop_loss {
            return Err(ExecutionError::InvalidRisk(format!(
                "entry and stop are both {}, distance is zero",
                request.entry_price
            )));
        }

        request.instrument.check_positive(ExecutionError::InvalidRisk)
    }
}

fn overflow(what: &str) -> ExecutionError {
    ExecutionError::InvalidRisk(format!("{what} overflowed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::instrument::fixtures;
    use rust_decimal_macros::dec;

    fn eurusd_request() -> RiskRequest {
        RiskRequest {
            balance: dec!(10000),
            risk_percent: dec!(1),
            entry_price: dec!(1.1000),
            stop_loss: dec!(1.0950),
            instrument: fixtures::eurusd(),
        }
    }

    #[test]
    fn test_fx_sizing() {
        let sized = RiskSizer::new()
            .compute_lot(&eurusd_request())
            .expect("should size");

        assert_eq!(sized.risk_amount, dec!(100));
        assert_eq!(sized.price_distance, dec!(0.0050));
        assert_eq!(sized.distance_in_ticks, dec!(500));
        assert_eq!(sized.per_unit_value, dec!(500));
        assert_eq!(sized.lot, dec!(0.2));
    }

    #[test]
    fn test_metal_sizing() {
        let request = RiskRequest {
            balance: dec!(25000),
            risk_percent: dec!(2),
            entry_price: dec!(2350.00),
            stop_loss: dec!(2360.00),
            instrument: fixtures::xauusd(),
        };

        let sized = RiskSizer::new().compute_lot(&request).expect("should size");

        // $500 at risk over 1000 ticks of $1
        assert_eq!(sized.risk_amount, dec!(500));
        assert_eq!(sized.distance_in_ticks, dec!(1000));
        assert_eq!(sized.lot, dec!(0.5));
    }

    #[test]
    fn test_short_side_distance_is_absolute() {
        let mut request = eurusd_request();
        request.stop_loss = dec!(1.1050);

        let sized = RiskSizer::new().compute_lot(&request).expect("should size");
        assert_eq!(sized.price_distance, dec!(0.0050));
        assert_eq!(sized.lot, dec!(0.2));
    }

    #[test]
    fn test_no_rounding_applied() {
        let mut request = eurusd_request();
        request.balance = dec!(12345);

        let sized = RiskSizer::new().compute_lot(&request).expect("should size");
        assert_eq!(sized.lot, dec!(0.2469));
    }

    #[test]
    fn test_zero_distance_rejected() {
        let mut request = eurusd_request();
        request.stop_loss = request.entry_price;

        assert!(matches!(
            RiskSizer::new().compute_lot(&request),
            Err(ExecutionError::InvalidRisk(_))
        ));
    }

    #[test]
    fn test_non_positive_balance_rejected() {
        let mut request = eurusd_request();
        request.balance = Decimal::ZERO;
        assert!(RiskSizer::new().compute_lot(&request).is_err());

        request.balance = dec!(-50);
        assert!(RiskSizer::new().compute_lot(&request).is_err());
    }

    #[test]
    fn test_risk_percent_bounds() {
        let sizer = RiskSizer::new();
        let mut request = eurusd_request();

        request.risk_percent = Decimal::ZERO;
        assert!(sizer.compute_lot(&request).is_err());

        request.risk_percent = dec!(100.01);
        assert!(sizer.compute_lot(&request).is_err());

        request.risk_percent = dec!(100);
        let sized = sizer.compute_lot(&request).expect("100% is allowed");
        assert_eq!(sized.risk_amount, dec!(10000));
    }

    #[test]
    fn test_bad_instrument_rejected() {
        let mut request = eurusd_request();
        request.instrument.tick_size = Decimal::ZERO;

        let err = RiskSizer::new()
            .compute_lot(&request)
            .expect_err("zero tick size");
        assert!(err.to_string().contains("tick_size"));
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        let mut request = eurusd_request();
        request.balance = Decimal::MAX;
        request.risk_percent = dec!(100);

        assert!(matches!(
            RiskSizer::new().compute_lot(&request),
            Err(ExecutionError::InvalidRisk(_))
        ));
    }
}
