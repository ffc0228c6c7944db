//! Bot/config filters over identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::{MAX_CONFIG_ID, OrderIdentifier, map_bot_id};
use crate::error::ExecutionError;

/// Identifier prefix selecting one bot, optionally narrowed to one config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierScope {
    bot_id: u8,
    config_id: Option<u8>,
}

impl IdentifierScope {
    /// Build a scope from an external bot id (legacy ids are mapped).
    pub fn new(bot_id: u16, config_id: Option<u8>) -> Result<Self, ExecutionError> {
        let bot_id = map_bot_id(bot_id)?;

        if let Some(config_id) = config_id
            && config_id > MAX_CONFIG_ID
        {
            return Err(ExecutionError::invalid(
                "config_id",
                format!("{config_id} exceeds {MAX_CONFIG_ID}"),
            ));
        }

        Ok(Self { bot_id, config_id })
    }

    /// Scope covering every config of a bot.
    pub fn bot(bot_id: u16) -> Result<Self, ExecutionError> {
        Self::new(bot_id, None)
    }

    /// Mapped bot digit.
    #[must_use]
    pub const fn bot_id(&self) -> u8 {
        self.bot_id
    }

    /// Config digit, if narrowed.
    #[must_use]
    pub const fn config_id(&self) -> Option<u8> {
        self.config_id
    }

    /// Whether an identifier falls inside this scope.
    ///
    /// Identifiers that do not decode belong to someone else and never match.
    #[must_use]
    pub fn contains(&self, identifier: OrderIdentifier) -> bool {
        let Ok(parts) = identifier.parts() else {
            return false;
        };

        parts.bot_id == self.bot_id
            && self
                .config_id
                .is_none_or(|config_id| parts.config_id == config_id)
    }
}

impl fmt::Display for IdentifierScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.config_id {
            Some(config_id) => write!(f, "{}{}xxxx", self.bot_id, config_id),
            None => write!(f, "{}xxxxx", self.bot_id),
        }
    }
}
