//! Magic-number encode/decode.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ExecutionError;
use crate::models::LegKind;

/// Smallest valid identifier.
pub const MIN_IDENTIFIER: u32 = 100_000;
/// Largest valid identifier.
pub const MAX_IDENTIFIER: u32 = 999_999;
/// Largest strategy configuration id.
pub const MAX_CONFIG_ID: u8 = 9;
/// Largest sequence number.
pub const MAX_SEQUENCE: u16 = 999;

const BOT_FACTOR: u32 = 100_000;
const CONFIG_FACTOR: u32 = 10_000;
const LEG_FACTOR: u32 = 1_000;

/// Legacy external bot ids start here.
const LEGACY_BOT_OFFSET: u16 = 100;

/// Integer tag attached to a broker order.
///
/// Values built by [`encode`] always decode. Values read back from the broker
/// may belong to other systems, so [`OrderIdentifier::from_raw`] accepts any
/// integer and [`OrderIdentifier::parts`] re-validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderIdentifier(u32);

impl OrderIdentifier {
    /// Wrap a raw broker-side value without validating it.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Raw integer value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Decode into components.
    pub fn parts(self) -> Result<IdentifierParts, ExecutionError> {
        decode(self.0)
    }
}

impl fmt::Display for OrderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<OrderIdentifier> for u32 {
    fn from(id: OrderIdentifier) -> Self {
        id.0
    }
}

/// Decoded identifier components.
///
/// `bot_id` is always the mapped 1..=9 form. Whether the id was originally a
/// legacy 101..=106 value is not recoverable; callers that care must track it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierParts {
    /// Mapped bot id (1..=9).
    pub bot_id: u8,
    /// Strategy configuration id (0..=9).
    pub config_id: u8,
    /// Leg kind digit.
    pub leg: LegKind,
    /// Sequence number (0..=999).
    pub sequence: u16,
}

/// Map an external bot id onto its identifier digit.
///
/// Accepts `1..=5` unchanged and the legacy range `101..=106` as `1..=6`.
pub fn map_bot_id(bot_id: u16) -> Result<u8, ExecutionError> {
    match bot_id {
        1..=5 => Ok(bot_id as u8),
        101..=106 => Ok((bot_id - LEGACY_BOT_OFFSET) as u8),
        _ => Err(ExecutionError::invalid(
            "bot_id",
            format!("{bot_id} is outside {{1..5}} and {{101..106}}"),
        )),
    }
}

/// Build an identifier from its components.
pub fn encode(
    bot_id: u16,
    config_id: u8,
    leg: LegKind,
    sequence: u16,
) -> Result<OrderIdentifier, ExecutionError> {
    let bot = map_bot_id(bot_id)?;

    if config_id > MAX_CONFIG_ID {
        return Err(ExecutionError::invalid(
            "config_id",
            format!("{config_id} exceeds {MAX_CONFIG_ID}"),
        ));
    }

    if sequence > MAX_SEQUENCE {
        return Err(ExecutionError::invalid(
            "sequence",
            format!("{sequence} exceeds {MAX_SEQUENCE}"),
        ));
    }

    Ok(OrderIdentifier(
        u32::from(bot) * BOT_FACTOR
            + u32::from(config_id) * CONFIG_FACTOR
            + leg.digit() * LEG_FACTOR
            + u32::from(sequence),
    ))
}

/// Split an identifier into its components.
///
/// Rejects anything that is not exactly six digits and anything whose leg
/// digit is neither `0` nor `1`.
pub fn decode(value: u32) -> Result<IdentifierParts, ExecutionError> {
    if !(MIN_IDENTIFIER..=MAX_IDENTIFIER).contains(&value) {
        return Err(ExecutionError::invalid(
            "identifier",
            format!("{value} is not a 6-digit identifier"),
        ));
    }

    let leg_digit = (value / LEG_FACTOR) % 10;
    let Some(leg) = LegKind::from_digit(leg_digit) else {
        return Err(ExecutionError::invalid(
            "identifier",
            format!("{value} has leg digit {leg_digit}, expected 0 or 1"),
        ));
    };

    Ok(IdentifierParts {
        bot_id: (value / BOT_FACTOR) as u8,
        config_id: ((value / CONFIG_FACTOR) % 10) as u8,
        leg,
        sequence: (value % LEG_FACTOR) as u16,
    })
}
