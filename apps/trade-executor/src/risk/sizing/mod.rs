//! Risk-percentage position sizing.
//!
//! ```text
//! risk_amount      = balance * risk_percent / 100
//! price_distance   = |entry - stop|
//! distance_ticks   = price_distance / tick_size
//! per_unit_value   = distance_ticks * tick_value
//! lot              = risk_amount / per_unit_value
//! ```
//!
//! Tick size and tick value come from the caller's instrument specification,
//! which is what lets the same percentage mean the same monetary risk on a
//! currency pair, a metal or an index. No rounding happens here.

mod sizer;
mod types;

pub use sizer::RiskSizer;
pub use types::{RiskRequest, SizedLot};
