//! Stages of a dual-leg open.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a dual-leg open currently is. Linear, no backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualLegStage {
    /// Request passed validation.
    Validated,
    /// Both leg identifiers (magic numbers) encoded.
    #[doc(alias = "MagicsAssigned")]
    #[serde(alias = "magics_assigned")]
    IdentifiersAssigned,
    /// Lot sized and normalized.
    LotComputed,
    /// Market leg accepted by the broker.
    MarketSubmitted,
    /// Limit leg accepted by the broker.
    LimitSubmitted,
    /// Both legs live.
    Done,
    /// Market leg failed; nothing is open.
    MarketFailed,
    /// Market leg live, limit leg failed.
    LimitFailedAfterMarket,
}

impl DualLegStage {
    /// Check if moving to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Validated, Self::IdentifiersAssigned)
                | (Self::IdentifiersAssigned, Self::LotComputed)
                | (Self::LotComputed, Self::MarketSubmitted | Self::MarketFailed)
                | (
                    Self::MarketSubmitted,
                    Self::LimitSubmitted | Self::LimitFailedAfterMarket
                )
                | (Self::LimitSubmitted, Self::Done)
        )
    }

    /// Whether no further stage follows.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done | Self::MarketFailed | Self::LimitFailedAfterMarket
        )
    }

    /// Stable label, also used as the outcome metric label for terminal stages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validated => "validated",
            Self::IdentifiersAssigned => "identifiers_assigned",
            Self::LotComputed => "lot_computed",
            Self::MarketSubmitted => "market_submitted",
            Self::LimitSubmitted => "limit_submitted",
            Self::Done => "done",
            Self::MarketFailed => "market_failed",
            Self::LimitFailedAfterMarket => "limit_failed_after_market",
        }
    }
}

impl fmt::Display for DualLegStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages visited so far, in order.
#[derive(Debug, Clone)]
pub(super) struct StageTrail {
    stages: Vec<DualLegStage>,
}

impl StageTrail {
    pub(super) fn start() -> Self {
        Self {
            stages: vec![DualLegStage::Validated],
        }
    }

    pub(super) fn current(&self) -> DualLegStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(DualLegStage::Validated)
    }

    pub(super) fn advance(&mut self, next: DualLegStage) {
        debug_assert!(
            self.current().can_transition_to(next),
            "illegal dual-leg transition {} -> {next}",
            self.current()
        );
        self.stages.push(next);
    }

    pub(super) fn into_stages(self) -> Vec<DualLegStage> {
        self.stages
    }
}
