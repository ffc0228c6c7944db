//! Dual-leg (market + limit) entry.
//!
//! One decision opens two orders with the same lot, stops and sequence: a
//! market leg at the reference price and a limit leg at a better price.
//!
//! ```text
//! Validated -> IdentifiersAssigned -> LotComputed -> MarketSubmitted -> LimitSubmitted -> Done
//!                                          |                |
//!                                          v                v
//!                                     MarketFailed   LimitFailedAfterMarket
//! ```
//!
//! The market leg is always confirmed before the limit leg is sent. A failed
//! market leg stops the flow with nothing open ([`CoordinationError`]). A
//! failed limit leg leaves the market leg live and returns it inside
//! [`PartialExecutionError`]; nothing is rolled back.
//!
//! [`CoordinationError`]: crate::error::CoordinationError
//! [`PartialExecutionError`]: crate::error::PartialExecutionError

mod coordinator;
mod stage;
mod types;

pub use coordinator::DualLegCoordinator;
pub use stage::DualLegStage;
pub use types::{DualLegRequest, DualLegResult};
