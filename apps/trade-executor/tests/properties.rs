//! Property tests for identifiers, sizing and normalization.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trade_executor::identifier::{decode, encode, map_bot_id};
use trade_executor::models::{InstrumentSpec, LegKind};
use trade_executor::risk::{AdjustmentReason, LotNormalizer, RiskRequest, RiskSizer};

fn eurusd() -> InstrumentSpec {
    InstrumentSpec {
        symbol: "EURUSD".to_string(),
        point: dec!(0.00001),
        tick_size: dec!(0.00001),
        tick_value: dec!(1),
        volume_min: dec!(0.01),
        volume_max: dec!(100),
        volume_step: dec!(0.01),
        contract_size: dec!(100000),
    }
}

fn bot_id() -> impl Strategy<Value = u16> {
    prop_oneof![1u16..=5, 101u16..=106]
}

fn leg() -> impl Strategy<Value = LegKind> {
    prop_oneof![Just(LegKind::Market), Just(LegKind::Limit)]
}

/// Decimal with `scale` fractional digits in `[lo, hi]` units of that scale.
fn decimal(lo: i64, hi: i64, scale: u32) -> impl Strategy<Value = Decimal> {
    (lo..=hi).prop_map(move |units| Decimal::new(units, scale))
}

proptest! {
    #[test]
    fn identifier_roundtrip(bot in bot_id(), config in 0u8..=9, leg in leg(), seq in 0u16..=999) {
        let id = encode(bot, config, leg, seq).unwrap();
        let parts = decode(id.value()).unwrap();

        prop_assert_eq!(parts.bot_id, map_bot_id(bot).unwrap());
        prop_assert_eq!(parts.config_id, config);
        prop_assert_eq!(parts.leg, leg);
        prop_assert_eq!(parts.sequence, seq);
        prop_assert!((100_000..=999_999).contains(&id.value()));
    }

    #[test]
    fn decode_rejects_out_of_range(value in prop_oneof![0u32..100_000, 1_000_000u32..]) {
        prop_assert!(decode(value).is_err());
    }

    #[test]
    fn decode_rejects_bad_leg_digit(
        bot in 1u32..=9,
        config in 0u32..=9,
        digit in 2u32..=9,
        seq in 0u32..=999,
    ) {
        let value = bot * 100_000 + config * 10_000 + digit * 1_000 + seq;
        prop_assert!(decode(value).is_err());
    }

    #[test]
    fn lot_non_decreasing_in_risk(
        low in decimal(1, 5_000, 2),
        extra in decimal(0, 5_000, 2),
        distance in decimal(10, 5_000, 5),
    ) {
        let sizer = RiskSizer::new();
        let high = (low + extra).min(Decimal::ONE_HUNDRED);
        let request = |risk_percent| RiskRequest {
            balance: dec!(10000),
            risk_percent,
            entry_price: dec!(1.10000),
            stop_loss: dec!(1.10000) - distance,
            instrument: eurusd(),
        };

        let a = sizer.compute_lot(&request(low)).unwrap();
        let b = sizer.compute_lot(&request(high)).unwrap();
        prop_assert!(a.lot <= b.lot);
    }

    #[test]
    fn lot_non_increasing_in_distance(
        near in decimal(10, 5_000, 5),
        extra in decimal(0, 5_000, 5),
    ) {
        let sizer = RiskSizer::new();
        let request = |distance| RiskRequest {
            balance: dec!(10000),
            risk_percent: dec!(1),
            entry_price: dec!(1.20000),
            stop_loss: dec!(1.20000) - distance,
            instrument: eurusd(),
        };

        let a = sizer.compute_lot(&request(near)).unwrap();
        let b = sizer.compute_lot(&request(near + extra)).unwrap();
        prop_assert!(a.lot >= b.lot);
    }

    #[test]
    fn normalized_lot_on_grid_and_in_range(
        raw in decimal(1, 100_000_000, 6),
        step_units in 1i64..=50,
    ) {
        let step = Decimal::new(step_units, 2);
        let spec = InstrumentSpec {
            volume_min: step,
            volume_step: step,
            ..eurusd()
        };

        let result = LotNormalizer::new().normalize(raw, &spec).unwrap();

        prop_assert!(result.lot >= spec.volume_min);
        prop_assert!(result.lot <= spec.volume_max);
        prop_assert!((result.lot % spec.volume_step).is_zero());
        if raw >= spec.volume_min {
            prop_assert!(result.lot <= raw);
        }
    }

    #[test]
    fn off_grid_minimum_only_lifts_as_below_minimum(
        raw in decimal(1, 10_000_000, 6),
        step_units in 1i64..=50,
        min_units in 1i64..=1_000,
    ) {
        let step = Decimal::new(step_units, 2);
        let spec = InstrumentSpec {
            volume_min: Decimal::new(min_units, 4),
            volume_step: step,
            ..eurusd()
        };

        let result = LotNormalizer::new().normalize(raw, &spec).unwrap();

        prop_assert!(result.lot >= spec.volume_min);
        prop_assert!(result.lot <= spec.volume_max);
        prop_assert!((result.lot % spec.volume_step).is_zero());
        if result.lot > raw {
            prop_assert_eq!(result.reason, AdjustmentReason::BelowMinimum);
        }
    }
}
