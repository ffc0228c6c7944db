//! Broker terminal boundary.
//!
//! The core talks to the terminal only through [`BrokerGateway`]. Every call
//! is a blocking round trip; timeouts belong to the implementation.
//!
//! # Module Structure
//!
//! - [`gateway`]: the capability trait and its wire types
//! - [`retry`]: backoff for read-only calls
//! - [`paper`]: in-memory gateway for demos and tests

pub mod gateway;
pub mod paper;
pub mod retry;

#[cfg(test)]
pub use gateway::MockBrokerGateway;
pub use gateway::{
    AccountInfo, BrokerGateway, ClosePositionRequest, OpenPosition, OrderReply, OrderSendRequest,
    PositionFilter, Tick, TransportFault, retcode,
};
pub use paper::{BrokerCall, BrokerOperation, JournalEntry, PaperBroker, PaperFault, PendingOrder};
pub use retry::{ExponentialBackoff, RetryPolicy, retry_read};
