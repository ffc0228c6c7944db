//! Order gateway.
//!
//! Validates single orders, submits them through a [`BrokerGateway`], and
//! maps broker replies onto the error taxonomy.
//!
//! # Module Structure
//!
//! - [`core`]: the gateway itself
//! - [`types`]: request and result types
//!
//! [`BrokerGateway`]: crate::broker::BrokerGateway

mod core;
mod types;

pub use core::OrderGateway;
pub use types::{CloseResult, GatewaySettings, LegOrderRequest, LegOrderResult, StopsUpdate};
