//! Instrument specification supplied by the caller per decision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// Broker-side description of a tradeable instrument.
///
/// Fetched fresh by the caller for every decision cycle; the core never keeps
/// one around between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Instrument symbol (e.g. `EURUSD`, `XAUUSD`).
    pub symbol: String,
    /// Smallest price increment.
    pub point: Decimal,
    /// Price change of one tick.
    pub tick_size: Decimal,
    /// Monetary value of one tick per one lot.
    pub tick_value: Decimal,
    /// Minimum tradeable volume.
    pub volume_min: Decimal,
    /// Maximum tradeable volume.
    pub volume_max: Decimal,
    /// Volume granularity.
    pub volume_step: Decimal,
    /// Units of the underlying per lot.
    pub contract_size: Decimal,
}

impl InstrumentSpec {
    /// Check that every numeric field is strictly positive and the volume
    /// range is not inverted.
    ///
    /// `make_error` builds the variant to report with, so the sizer can
    /// surface `InvalidRisk` while the normalizer surfaces `InvalidParameter`.
    pub(crate) fn check_positive(
        &self,
        make_error: impl Fn(String) -> ExecutionError,
    ) -> Result<(), ExecutionError> {
        let fields = [
            ("point", self.point),
            ("tick_size", self.tick_size),
            ("tick_value", self.tick_value),
            ("volume_min", self.volume_min),
            ("volume_max", self.volume_max),
            ("volume_step", self.volume_step),
            ("contract_size", self.contract_size),
        ];

        for (name, value) in fields {
            if value <= Decimal::ZERO {
                return Err(make_error(format!(
                    "{}: instrument field {name} must be positive, got {value}",
                    self.symbol
                )));
            }
        }

        if self.volume_min > self.volume_max {
            return Err(make_error(format!(
                "{}: volume_min {} exceeds volume_max {}",
                self.symbol, self.volume_min, self.volume_max
            )));
        }

        Ok(())
    }
}
