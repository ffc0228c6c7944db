//! Shared value types for the execution core.
//!
//! These types are created fresh for every decision cycle and dropped after
//! use. Nothing here caches broker state.

pub(crate) mod instrument;
mod order;

pub use instrument::InstrumentSpec;
pub use order::{Direction, LegKind, OrderType, TradeAction};
