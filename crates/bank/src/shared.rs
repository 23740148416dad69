//! Thread-safe handle over a [`Bank`].
//!
//! Every operation holds the lock for its full read-check-mutate sequence, so a
//! transfer is observed either entirely or not at all by other threads.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use pinledger_core::{AccountId, DomainResult};

use crate::account::Account;
use crate::bank::Bank;

/// Owned, PIN-free view of an account (references cannot outlive the lock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub name: String,
}

impl From<&Account> for AccountSnapshot {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id(),
            name: account.name().to_string(),
        }
    }
}

/// Cloneable, `Send + Sync` bank handle; clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct SharedBank {
    inner: Arc<RwLock<Bank>>,
}

impl SharedBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_account(&self, name: &str, pin: &str) -> AccountSnapshot {
        AccountSnapshot::from(self.write().create_account(name, pin))
    }

    pub fn find_account(&self, id: &str) -> DomainResult<AccountSnapshot> {
        self.read().find_account(id).map(AccountSnapshot::from)
    }

    pub fn check_balance(&self, id: &str, pin: &str) -> DomainResult<i64> {
        self.read().check_balance(id, pin)
    }

    pub fn deposit(&self, id: &str, amount: i64) -> DomainResult<()> {
        self.write().deposit(id, amount)
    }

    pub fn withdraw(&self, id: &str, pin: &str, amount: i64) -> DomainResult<()> {
        self.write().withdraw(id, pin, amount)
    }

    pub fn transfer(
        &self,
        sender_id: &str,
        sender_pin: &str,
        amount: i64,
        receiver_id: &str,
    ) -> DomainResult<()> {
        self.write().transfer(sender_id, sender_pin, amount, receiver_id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic can only happen before `apply`, and `Bank` never holds a
    // half-applied command, so a poisoned lock still guards a consistent bank.
    fn read(&self) -> RwLockReadGuard<'_, Bank> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Bank> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Bank> for SharedBank {
    fn from(bank: Bank) -> Self {
        Self {
            inner: Arc::new(RwLock::new(bank)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use pinledger_core::DomainError;

    #[test]
    fn snapshots_carry_id_and_name() {
        let bank = SharedBank::new();
        let created = bank.create_account("kabir", "1234");
        assert_eq!(created.id.to_string(), "1");
        assert_eq!(bank.find_account("1").unwrap(), created);
        assert_eq!(
            bank.find_account("2"),
            Err(DomainError::not_found("2"))
        );
    }

    #[test]
    fn concurrent_transfers_conserve_money() {
        let bank = SharedBank::new();
        bank.create_account("kabir", "1234");
        bank.create_account("Yusuf", "3345");
        bank.deposit("1", 10_000).unwrap();
        bank.deposit("2", 10_000).unwrap();

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let bank = bank.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        let _ = if i % 2 == 0 {
                            bank.transfer("1", "1234", 7, "2")
                        } else {
                            bank.transfer("2", "3345", 7, "1")
                        };
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let a = bank.check_balance("1", "1234").unwrap();
        let b = bank.check_balance("2", "3345").unwrap();
        assert!(a >= 0 && b >= 0);
        assert_eq!(a + b, 20_000);
    }

    #[test]
    fn concurrent_creation_keeps_ids_dense() {
        let bank = SharedBank::new();
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let bank = bank.clone();
                thread::spawn(move || {
                    (0..25)
                        .map(|_| bank.create_account("owner", "0000").id.as_u64())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=100).collect::<Vec<_>>());
        assert_eq!(bank.len(), 100);
    }

    #[test]
    fn poisoned_lock_still_serves_a_consistent_bank() {
        let bank = SharedBank::new();
        bank.create_account("kabir", "1234");
        bank.create_account("Yusuf", "3345");
        bank.deposit("1", 5000).unwrap();

        let holder = bank.clone();
        let crashed = thread::spawn(move || {
            let _guard = holder.inner.write().unwrap();
            panic!("worker crashed while holding the bank");
        })
        .join();
        assert!(crashed.is_err());
        assert!(bank.inner.is_poisoned());

        assert_eq!(bank.check_balance("1", "1234"), Ok(5000));
        assert_eq!(bank.check_balance("2", "3345"), Ok(0));

        bank.transfer("1", "1234", 2000, "2").unwrap();
        assert_eq!(bank.check_balance("1", "1234"), Ok(3000));
        assert_eq!(bank.check_balance("2", "3345"), Ok(2000));
        assert_eq!(
            bank.transfer("1", "0000", 1, "2"),
            Err(DomainError::InvalidPin)
        );
        assert_eq!(bank.create_account("new", "0000").id.to_string(), "3");
    }

    #[test]
    fn wraps_an_existing_bank() {
        let mut bank = Bank::new();
        bank.create_account("kabir", "1234");
        bank.deposit("1", 5000).unwrap();

        let shared = SharedBank::from(bank);
        shared.withdraw("1", "1234", 2000).unwrap();
        assert_eq!(shared.check_balance("1", "1234"), Ok(3000));
        assert!(!shared.is_empty());
    }
}
