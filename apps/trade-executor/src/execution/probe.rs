//! Open position lookup used to pick the evaluate or reevaluate route.
//!
//! Always a fresh broker query; results are never cached between calls.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::broker::{BrokerGateway, OpenPosition, PositionFilter, RetryPolicy, retry_read};
use crate::error::ExecutionError;
use crate::identifier::{IdentifierScope, OrderIdentifier};
use crate::models::{Direction, LegKind};
use crate::observability::record_transport_failure;

/// Which decision path a symbol takes upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeRoute {
    /// Nothing open: evaluate a fresh entry.
    Evaluate,
    /// A position exists: reevaluate it.
    Reevaluate,
}

/// Open position owned by the probed scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSummary {
    /// Position ticket.
    pub ticket: u64,
    /// Instrument symbol.
    pub symbol: String,
    /// Side.
    pub direction: Direction,
    /// Remaining volume.
    pub volume: Decimal,
    /// Average open price.
    pub open_price: Decimal,
    /// Stop-loss, zero for none.
    pub stop_loss: Decimal,
    /// Take-profit, zero for none.
    pub take_profit: Decimal,
    /// Magic number.
    pub identifier: OrderIdentifier,
    /// Leg the position came from, if the identifier decodes.
    pub leg: Option<LegKind>,
    /// Floating profit.
    pub profit: Decimal,
}

impl From<OpenPosition> for PositionSummary {
    fn from(position: OpenPosition) -> Self {
        let leg = position.identifier.parts().ok().map(|parts| parts.leg);
        Self {
            ticket: position.ticket,
            symbol: position.symbol,
            direction: position.direction,
            volume: position.volume,
            open_price: position.open_price,
            stop_loss: position.stop_loss,
            take_profit: position.take_profit,
            identifier: position.identifier,
            leg,
            profit: position.profit,
        }
    }
}

/// Outcome of a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Whether anything in scope is open.
    pub has_open: bool,
    /// The positions found.
    pub positions: Vec<PositionSummary>,
}

impl ProbeResult {
    /// Route implied by this result.
    #[must_use]
    pub const fn route(&self) -> ProbeRoute {
        if self.has_open {
            ProbeRoute::Reevaluate
        } else {
            ProbeRoute::Evaluate
        }
    }
}

/// Answers "does this symbol already have a position of ours".
#[derive(Debug)]
pub struct PositionProbe<B: BrokerGateway> {
    broker: Arc<B>,
    read_policy: RetryPolicy,
}

impl<B: BrokerGateway> PositionProbe<B> {
    /// Create a probe with the given read retry policy.
    #[must_use]
    pub const fn new(broker: Arc<B>, read_policy: RetryPolicy) -> Self {
        Self {
            broker,
            read_policy,
        }
    }

    /// Open positions on `symbol` whose identifier falls inside `scope`.
    ///
    /// Positions from other bots, other configs or with foreign identifiers
    /// are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an empty symbol; `Transport` once read retries
    /// are exhausted.
    pub fn has_open_position(
        &self,
        symbol: &str,
        scope: &IdentifierScope,
    ) -> Result<ProbeResult, ExecutionError> {
        if symbol.trim().is_empty() {
            return Err(ExecutionError::invalid("symbol", "must not be empty"));
        }

        let filter = PositionFilter::symbol(symbol);
        let positions = retry_read(&self.read_policy, "open_positions", || {
            self.broker.open_positions(&filter)
        })
        .map_err(|fault| {
            record_transport_failure("open_positions");
            ExecutionError::from(fault)
        })?;

        let positions: Vec<PositionSummary> = positions
            .into_iter()
            .filter(|position| position.symbol == symbol && scope.contains(position.identifier))
            .map(PositionSummary::from)
            .collect();

        let result = ProbeResult {
            has_open: !positions.is_empty(),
            positions,
        };

        tracing::debug!(
            symbol,
            scope = %scope,
            count = result.positions.len(),
            route = ?result.route(),
            "Probed open positions"
        );

        Ok(result)
    }
}
