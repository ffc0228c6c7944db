// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call,
        clippy::panic
    )
)]

//! Trade Executor - Rust Core Library
//!
//! Turns a trading decision (symbol, direction, stop-loss, take-profit) into
//! correctly sized, correctly tagged broker orders.
//!
//! # Architecture
//!
//! Leaf to root:
//!
//! - `identifier`: 6-digit order identifiers (bot, config, leg, sequence)
//! - `risk`: risk-based lot sizing and broker volume normalization
//! - `broker`: the `BrokerGateway` capability, read retries, paper account
//! - `execution`: order gateway, dual-leg coordinator, position probe
//! - `executor`: the facade the decision layer calls
//!
//! Everything runs synchronously, one decision at a time. Each bot process
//! owns a disjoint bot id, so no cross-process locking is needed.
//!
//! # Error handling
//!
//! Every failure is returned as an [`ExecutionError`]; nothing is logged and
//! swallowed. Order submissions are never retried automatically.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod broker;
pub mod config;
pub mod error;
pub mod execution;
pub mod executor;
pub mod identifier;
pub mod models;
pub mod observability;
pub mod risk;
pub mod telemetry;

pub use error::{CoordinationError, ErrorCode, ExecutionError, PartialExecutionError};
pub use execution::{
    DualLegCoordinator, DualLegRequest, DualLegResult, LegOrderRequest, LegOrderResult,
    OrderGateway, PositionProbe, ProbeRoute,
};
pub use executor::{TradeDecision, TradeExecutor};
pub use identifier::{IdentifierScope, OrderIdentifier, SequenceCounter};
pub use models::{Direction, InstrumentSpec, LegKind};
