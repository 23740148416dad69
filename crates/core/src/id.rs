//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an account.
///
/// Identifiers are dense and sequential: the first account gets `1`, each
/// subsequent one the successor. They render (and parse) as plain decimal
/// strings, so `AccountId::FIRST.to_string() == "1"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl AccountId {
    /// Identifier assigned to the first account of a ledger.
    pub const FIRST: AccountId = AccountId(1);

    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The identifier allocated right after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<AccountId> for u64 {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl FromStr for AccountId {
    type Err = DomainError;

    /// Only the canonical rendering (`"7"`, not `"07"` or `"+7"`) names an
    /// account; anything else fails like a well-formed but unknown identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(n) if n >= 1 && n.to_string() == s => Ok(Self(n)),
            _ => Err(DomainError::not_found(s)),
        }
    }
}
