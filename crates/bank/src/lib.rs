//! Bank module: PIN-authenticated accounts held in a single in-memory ledger.
//!
//! Pure domain logic only: no IO, no persistence. `SharedBank` is the one
//! place that adds locking, for callers that need to share a ledger across
//! threads.

pub mod account;
pub mod amount;
pub mod bank;
pub mod shared;

pub use account::{Account, Pin};
pub use amount::Amount;
pub use bank::{
    AccountOpened, Bank, BankCommand, BankEvent, Deposit, FundsDeposited, FundsTransferred,
    FundsWithdrawn, OpenAccount, Transfer, Withdraw,
};
pub use shared::{AccountSnapshot, SharedBank};
