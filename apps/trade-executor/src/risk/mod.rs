//! Risk-based position sizing and broker volume normalization.
//!
//! Sizing and normalization are separate steps so each can be tested on its
//! own: [`RiskSizer`] produces an unrounded lot from account risk, and
//! [`LotNormalizer`] snaps it onto the broker's volume grid.
//!
//! # Example
//!
//! ```rust,ignore
//! use trade_executor::risk::{LotNormalizer, RiskRequest, RiskSizer};
//! use rust_decimal_macros::dec;
//!
//! let sized = RiskSizer::new().compute_lot(&RiskRequest {
//!     balance: dec!(10000),
//!     risk_percent: dec!(1),
//!     entry_price: dec!(1.1000),
//!     stop_loss: dec!(1.0950),
//!     instrument: spec.clone(),
//! })?;
//! // $100 at risk over 500 ticks worth $1 each = 0.2 lots
//! assert_eq!(sized.lot, dec!(0.2));
//!
//! let normalized = LotNormalizer::new().normalize(sized.lot, &spec)?;
//! ```

mod normalize;
pub mod sizing;

pub use normalize::{AdjustmentReason, LotNormalizer, NormalizedLot};
pub use sizing::{RiskRequest, RiskSizer, SizedLot};
