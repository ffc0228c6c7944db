//! Snap raw lots onto the broker's volume grid.
//!
//! The lot is first clamped to `[volume_min, volume_max]` and then floored to
//! a multiple of `volume_step`. Flooring never increases risk past what the
//! sizer asked for; the only upward move is the clamp to the broker minimum,
//! which is reported as such.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ExecutionError;
use crate::models::InstrumentSpec;

/// Why a lot was changed during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// Raised to the broker minimum.
    BelowMinimum,
    /// Lowered to the broker maximum.
    AboveMaximum,
    /// Floored to the volume step.
    StepRounding,
    /// Already valid.
    NoAdjustment,
}

impl AdjustmentReason {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BelowMinimum => "below_minimum",
            Self::AboveMaximum => "above_maximum",
            Self::StepRounding => "step_rounding",
            Self::NoAdjustment => "no_adjustment",
        }
    }
}

impl fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A broker-valid lot and how it was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLot {
    /// Lot to submit.
    pub lot: Decimal,
    /// Lot before normalization.
    pub raw_lot: Decimal,
    /// Whether `lot` differs from `raw_lot`.
    pub was_adjusted: bool,
    /// Why it differs.
    pub reason: AdjustmentReason,
}

/// Clamps and floors lots to an instrument's volume constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct LotNormalizer;

impl LotNormalizer {
    /// Create a new normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalize a raw lot against an instrument.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::InvalidParameter`] if the raw lot is not
    /// positive, the instrument's volume fields are not positive, or no
    /// multiple of the step lies inside `[volume_min, volume_max]`.
    pub fn normalize(
        &self,
        raw_lot: Decimal,
        spec: &InstrumentSpec,
    ) -> Result<NormalizedLot, ExecutionError> {
        if raw_lot <= Decimal::ZERO {
            return Err(ExecutionError::invalid(
                "lot",
                format!("raw lot must be positive, got {raw_lot}"),
            ));
        }

        spec.check_positive(|message| ExecutionError::invalid("instrument", message))?;

        let (clamped, clamp_reason) = if raw_lot < spec.volume_min {
            (spec.volume_min, AdjustmentReason::BelowMinimum)
        } else if raw_lot > spec.volume_max {
            (spec.volume_max, AdjustmentReason::AboveMaximum)
        } else {
            (raw_lot, AdjustmentReason::NoAdjustment)
        };

        let mut lot = snap(clamped, spec.volume_step, Decimal::floor)?;

        // A minimum that is not itself on the step grid floors below the
        // range; take the first grid point inside it instead.
        if lot < spec.volume_min {
            lot = snap(spec.volume_min, spec.volume_step, Decimal::ceil)?;
        }

        if lot > spec.volume_max {
            return Err(ExecutionError::invalid(
                "instrument",
                format!(
                    "{}: no multiple of step {} lies in [{}, {}]",
                    spec.symbol, spec.volume_step, spec.volume_min, spec.volume_max
                ),
            ));
        }

        let lot = lot.normalize();
        // Only the broker minimum may lift a lot above what was asked for.
        let reason = match clamp_reason {
            AdjustmentReason::NoAdjustment if lot > raw_lot => AdjustmentReason::BelowMinimum,
            AdjustmentReason::NoAdjustment if lot != raw_lot => AdjustmentReason::StepRounding,
            other => other,
        };
        let was_adjusted = reason != AdjustmentReason::NoAdjustment;

        if was_adjusted {
            tracing::debug!(
                symbol = %spec.symbol,
                raw_lot = %raw_lot,
                lot = %lot,
                reason = %reason,
                "Lot adjusted to broker constraints"
            );
        }

        Ok(NormalizedLot {
            lot,
            raw_lot,
            was_adjusted,
            reason,
        })
    }
}

fn snap(
    value: Decimal,
    step: Decimal,
    round: fn(&Decimal) -> Decimal,
) -> Result<Decimal, ExecutionError> {
    value
        .checked_div(step)
        .map(|steps| round(&steps))
        .and_then(|steps| steps.checked_mul(step))
        .ok_or_else(|| {
            ExecutionError::invalid("lot", format!("{value} cannot be expressed in steps of {step}"))
        })
}
