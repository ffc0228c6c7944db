//! Order direction, leg kind and broker order classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Long entry.
    Buy,
    /// Short entry.
    Sell,
}

impl Direction {
    /// The direction that flattens a position opened in this direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Broker order type for an immediate entry in this direction.
    #[must_use]
    pub const fn market_order_type(self) -> OrderType {
        match self {
            Self::Buy => OrderType::Buy,
            Self::Sell => OrderType::Sell,
        }
    }

    /// Broker order type for a resting limit entry in this direction.
    #[must_use]
    pub const fn limit_order_type(self) -> OrderType {
        match self {
            Self::Buy => OrderType::BuyLimit,
            Self::Sell => OrderType::SellLimit,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Which leg of a dual-leg entry an order belongs to.
///
/// The discriminant is the digit embedded in the order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    /// Immediate execution at the market reference price.
    Market = 0,
    /// Resting order at the limit price.
    Limit = 1,
}

impl LegKind {
    /// Identifier digit for this leg.
    #[must_use]
    pub const fn digit(self) -> u32 {
        self as u32
    }

    /// Parse an identifier digit. Only `0` and `1` are legs.
    #[must_use]
    pub const fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Self::Market),
            1 => Some(Self::Limit),
            _ => None,
        }
    }

    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
        }
    }

    /// Broker action used to submit this leg.
    #[must_use]
    pub const fn trade_action(self) -> TradeAction {
        match self {
            Self::Market => TradeAction::Deal,
            Self::Limit => TradeAction::Pending,
        }
    }

    /// Broker order type for this leg in the given direction.
    #[must_use]
    pub const fn order_type(self, direction: Direction) -> OrderType {
        match self {
            Self::Market => direction.market_order_type(),
            Self::Limit => direction.limit_order_type(),
        }
    }
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broker order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market buy.
    Buy,
    /// Market sell.
    Sell,
    /// Buy when price falls to the limit.
    BuyLimit,
    /// Sell when price rises to the limit.
    SellLimit,
}

impl OrderType {
    /// Direction of the position this order opens or adds to.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Buy | Self::BuyLimit => Direction::Buy,
            Self::Sell | Self::SellLimit => Direction::Sell,
        }
    }

    /// Whether the order rests on the book instead of executing immediately.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::BuyLimit | Self::SellLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::BuyLimit => write!(f, "BUY_LIMIT"),
            Self::SellLimit => write!(f, "SELL_LIMIT"),
        }
    }
}

/// Broker request action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    /// Execute immediately against the market.
    Deal,
    /// Place a resting order.
    Pending,
}
