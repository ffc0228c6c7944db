//! Order identifiers ("magic numbers").
//!
//! Every order is tagged with a 6-digit integer naming the bot, the strategy
//! configuration, the leg kind and a sequence number:
//!
//! ```text
//!   B C K S S S
//!   │ │ │ └─┴─┴── sequence      0..=999
//!   │ │ └──────── leg kind      0 = market, 1 = limit
//!   │ └────────── config id     0..=9
//!   └──────────── bot id        1..=9 (legacy 101..=106 map to 1..=6)
//! ```
//!
//! Identifiers are for traceability only. They are not locks and are not
//! used for deduplication. Independent bot processes stay isolated by owning
//! disjoint bot ids.
//!
//! # Example
//!
//! ```rust,ignore
//! use trade_executor::identifier::{decode, encode};
//! use trade_executor::models::LegKind;
//!
//! let id = encode(102, 3, LegKind::Limit, 42)?;
//! assert_eq!(id.value(), 231_042);
//!
//! let parts = decode(id.value())?;
//! assert_eq!(parts.bot_id, 2); // legacy id comes back in mapped form
//! ```

mod codec;
mod scope;
mod sequence;

pub use codec::{
    IdentifierParts, MAX_CONFIG_ID, MAX_IDENTIFIER, MAX_SEQUENCE, MIN_IDENTIFIER, OrderIdentifier,
    decode, encode, map_bot_id,
};
pub use scope::IdentifierScope;
pub use sequence::SequenceCounter;
