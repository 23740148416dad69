use pinledger_core::{AccountId, DomainError, DomainResult, Entity};

use crate::amount::Amount;

/// Shared secret authenticating balance-affecting operations on an account.
///
/// Stored and compared in plaintext. `Debug` never prints the digits.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub fn new(pin: impl Into<String>) -> Self {
        Self(pin.into())
    }

    /// Exact, case-sensitive comparison.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Pin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Pin(****)")
    }
}

impl From<&str> for Pin {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single account held by a [`Bank`](crate::Bank).
///
/// # Invariants
/// - `id` and `pin` never change after creation.
/// - `balance` is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    name: String,
    pin: Pin,
    balance: i64,
}

impl Account {
    pub(crate) fn open(id: AccountId, name: String, pin: Pin) -> Self {
        Self {
            id,
            name,
            pin,
            balance: 0,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Owner name, exactly as given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current balance, if `pin` is the account's PIN.
    pub fn balance(&self, pin: &str) -> DomainResult<i64> {
        self.verify_pin(pin)?;
        Ok(self.balance)
    }

    pub(crate) fn verify_pin(&self, pin: &str) -> DomainResult<()> {
        if !self.pin.matches(pin) {
            return Err(DomainError::InvalidPin);
        }
        Ok(())
    }

    /// Balance without authentication; for validation inside the ledger only.
    pub(crate) fn available(&self) -> i64 {
        self.balance
    }

    pub(crate) fn credit(&mut self, amount: Amount) {
        self.balance += amount.value();
    }

    pub(crate) fn debit(&mut self, amount: Amount) {
        self.balance -= amount.value();
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}
