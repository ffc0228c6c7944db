//! Error taxonomy for the execution core.
//!
//! Every failure is returned as a typed value for the current decision cycle.
//! Nothing here is fatal at the process level, and nothing is logged and
//! swallowed: the caller decides whether to alert or abort.
//!
//! | Code | Meaning | Retried here? |
//! |------|---------|---------------|
//! | `INVALID_PARAMETER` | Caller misuse, rejected before any broker call | never |
//! | `INVALID_RISK` | Sizing inputs cannot produce a lot | never |
//! | `EXECUTION_ERROR` | Broker answered with a non-success retcode | never |
//! | `TRANSPORT_ERROR` | No response from the broker | read-only calls only |
//! | `COORDINATION_ERROR` | Market leg of a dual entry failed, nothing opened | never |
//! | `PARTIAL_EXECUTION` | Market leg live, limit leg failed | never |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::broker::TransportFault;
use crate::execution::LegOrderResult;
use crate::identifier::OrderIdentifier;

/// Stable error codes, one per taxonomy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller passed an out-of-domain argument.
    InvalidParameter,
    /// Risk inputs cannot be sized.
    InvalidRisk,
    /// Broker explicitly rejected the request.
    #[serde(rename = "EXECUTION_ERROR")]
    Execution,
    /// Broker did not respond.
    #[serde(rename = "TRANSPORT_ERROR")]
    Transport,
    /// First leg of a coordinated entry failed.
    #[serde(rename = "COORDINATION_ERROR")]
    Coordination,
    /// A coordinated entry is half open.
    PartialExecution,
}

impl ErrorCode {
    /// Reason string used in logs and metrics labels.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::InvalidRisk => "INVALID_RISK",
            Self::Execution => "EXECUTION_ERROR",
            Self::Transport => "TRANSPORT_ERROR",
            Self::Coordination => "COORDINATION_ERROR",
            Self::PartialExecution => "PARTIAL_EXECUTION",
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Only meaningful for read-only broker calls. Order submission is never
    /// repeated automatically because a lost reply may hide a live fill.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors produced by the execution core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// Caller misuse. Fails fast, before any broker interaction.
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter {
        /// Offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// Sizing inputs are out of domain.
    #[error("Invalid risk input: {0}")]
    InvalidRisk(String),

    /// Broker answered with a non-success status code.
    #[error("Broker rejected request: retcode {retcode} ({comment})")]
    Rejected {
        /// Raw broker status code.
        retcode: u32,
        /// Raw broker comment.
        comment: String,
    },

    /// Broker produced no response at all.
    #[error("Broker transport failure: {0}")]
    Transport(String),

    /// Market leg of a dual entry failed; nothing is open.
    #[error(transparent)]
    Coordination(#[from] CoordinationError),

    /// Market leg is open but the limit leg failed.
    #[error(transparent)]
    PartialExecution(#[from] Box<PartialExecutionError>),
}

impl ExecutionError {
    /// Shorthand for [`ExecutionError::InvalidParameter`].
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Taxonomy code of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::InvalidRisk(_) => ErrorCode::InvalidRisk,
            Self::Rejected { .. } => ErrorCode::Execution,
            Self::Transport(_) => ErrorCode::Transport,
            Self::Coordination(_) => ErrorCode::Coordination,
            Self::PartialExecution(_) => ErrorCode::PartialExecution,
        }
    }

    /// The partial execution report, if this is one.
    #[must_use]
    pub fn as_partial(&self) -> Option<&PartialExecutionError> {
        match self {
            Self::PartialExecution(partial) => Some(partial.as_ref()),
            _ => None,
        }
    }
}

impl From<TransportFault> for ExecutionError {
    fn from(fault: TransportFault) -> Self {
        Self::Transport(fault.to_string())
    }
}

/// The market leg of a dual entry failed. No position was opened, so there
/// is nothing to reconcile.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Market leg {market_identifier} on {symbol} failed: {cause}")]
pub struct CoordinationError {
    /// Instrument of the attempted entry.
    pub symbol: String,
    /// Identifier the market leg was tagged with.
    pub market_identifier: OrderIdentifier,
    /// Why the market leg failed.
    #[source]
    pub cause: Box<ExecutionError>,
}

/// The market leg of a dual entry is live but the limit leg failed.
///
/// Carries the successful market leg so the operator can reconcile: retry
/// the limit leg, or accept a market-only position. No rollback happens.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "Partial execution on {}: market leg {market_identifier} open (order {}), limit leg {limit_identifier} failed: {cause}",
    .market.symbol,
    .market.order_ref
)]
pub struct PartialExecutionError {
    /// The leg that is live at the broker.
    pub market: LegOrderResult,
    /// Identifier of the live market leg.
    pub market_identifier: OrderIdentifier,
    /// Identifier the failed limit leg was tagged with.
    pub limit_identifier: OrderIdentifier,
    /// Why the limit leg failed.
    #[source]
    pub cause: Box<ExecutionError>,
}

impl PartialExecutionError {
    /// Broker order reference of the live market leg.
    #[must_use]
    pub const fn market_order_ref(&self) -> u64 {
        self.market.order_ref
    }
}
