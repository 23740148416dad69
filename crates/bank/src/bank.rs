use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use pinledger_core::{AccountId, Aggregate, DomainError, DomainResult};
use pinledger_events::Event;

use crate::account::{Account, Pin};
use crate::amount::Amount;

/// Command: OpenAccount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAccount {
    pub name: String,
    pub pin: Pin,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Deposit. No PIN is required to pay money in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub account_id: String,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Withdraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdraw {
    pub account_id: String,
    pub pin: Pin,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub sender_id: String,
    pub sender_pin: Pin,
    pub amount: i64,
    pub receiver_id: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankCommand {
    OpenAccount(OpenAccount),
    Deposit(Deposit),
    Withdraw(Withdraw),
    Transfer(Transfer),
}

/// Event: AccountOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct AccountOpened {
    pub account_id: AccountId,
    pub name: String,
    #[serde(skip)]
    pub pin: Pin,
    pub occurred_at: DateTime<Utc>,
}

/// Event: FundsDeposited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct FundsDeposited {
    pub account_id: AccountId,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Event: FundsWithdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct FundsWithdrawn {
    pub account_id: AccountId,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

/// Event: FundsTransferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct FundsTransferred {
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BankEvent {
    AccountOpened(AccountOpened),
    FundsDeposited(FundsDeposited),
    FundsWithdrawn(FundsWithdrawn),
    FundsTransferred(FundsTransferred),
}

impl Event for BankEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BankEvent::AccountOpened(_) => "bank.account.opened",
            BankEvent::FundsDeposited(_) => "bank.account.deposited",
            BankEvent::FundsWithdrawn(_) => "bank.account.withdrawn",
            BankEvent::FundsTransferred(_) => "bank.account.transferred",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BankEvent::AccountOpened(e) => e.occurred_at,
            BankEvent::FundsDeposited(e) => e.occurred_at,
            BankEvent::FundsWithdrawn(e) => e.occurred_at,
            BankEvent::FundsTransferred(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: Bank, the registry owning every account.
///
/// # Invariants
/// - Account ids are dense: `1`, `2`, ... in creation order, never reused.
/// - No balance is ever negative.
/// - A rejected command changes nothing (balances, next id, version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    accounts: BTreeMap<AccountId, Account>,
    next_id: AccountId,
    version: u64,
}

impl Bank {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            next_id: AccountId::FIRST,
            version: 0,
        }
    }

    /// Open an account with a zero balance under the next sequential id.
    ///
    /// Name and PIN are taken as given; this never fails.
    pub fn create_account(&mut self, name: &str, pin: &str) -> &Account {
        let opened = self.decide_open(&OpenAccount {
            name: name.to_string(),
            pin: Pin::new(pin),
            occurred_at: Utc::now(),
        });
        self.version += 1;
        tracing::info!(account_id = %opened.account_id, version = self.version, "account opened");
        self.insert_opened(opened)
    }

    pub fn find_account(&self, id: &str) -> DomainResult<&Account> {
        let account_id: AccountId = id.parse()?;
        self.accounts
            .get(&account_id)
            .ok_or_else(|| DomainError::not_found(id))
    }

    pub fn check_balance(&self, id: &str, pin: &str) -> DomainResult<i64> {
        self.find_account(id)?.balance(pin)
    }

    pub fn deposit(&mut self, id: &str, amount: i64) -> DomainResult<()> {
        self.dispatch(BankCommand::Deposit(Deposit {
            account_id: id.to_string(),
            amount,
            occurred_at: Utc::now(),
        }))
        .map(|_| ())
    }

    pub fn withdraw(&mut self, id: &str, pin: &str, amount: i64) -> DomainResult<()> {
        self.dispatch(BankCommand::Withdraw(Withdraw {
            account_id: id.to_string(),
            pin: Pin::new(pin),
            amount,
            occurred_at: Utc::now(),
        }))
        .map(|_| ())
    }

    pub fn transfer(
        &mut self,
        sender_id: &str,
        sender_pin: &str,
        amount: i64,
        receiver_id: &str,
    ) -> DomainResult<()> {
        self.dispatch(BankCommand::Transfer(Transfer {
            sender_id: sender_id.to_string(),
            sender_pin: Pin::new(sender_pin),
            amount,
            receiver_id: receiver_id.to_string(),
            occurred_at: Utc::now(),
        }))
        .map(|_| ())
    }

    /// Accounts in creation order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn dispatch(&mut self, command: BankCommand) -> DomainResult<Vec<BankEvent>> {
        match self.execute(&command) {
            Ok(events) => {
                for event in &events {
                    tracing::debug!(
                        event_type = event.event_type(),
                        version = self.version,
                        "command applied"
                    );
                }
                Ok(events)
            }
            Err(err) => {
                tracing::debug!(error_kind = err.kind(), error = %err, "command rejected");
                Err(err)
            }
        }
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregate for Bank {
    type Command = BankCommand;
    type Event = BankEvent;
    type Error = DomainError;

    fn version(&self) -> u64 {
        self.version
    }

    /// Events that would break an invariant (an out-of-sequence account id,
    /// a debit the balance cannot cover, an overflowing credit, an unknown
    /// account) are ignored and do not bump `version()`.
    fn apply(&mut self, event: &Self::Event) {
        let applied = match event {
            BankEvent::AccountOpened(e) if e.account_id == self.next_id => {
                self.insert_opened(e.clone());
                true
            }
            BankEvent::AccountOpened(_) => false,
            BankEvent::FundsDeposited(e) => self.credit(e.account_id, e.amount),
            BankEvent::FundsWithdrawn(e) => self.debit(e.account_id, e.amount),
            BankEvent::FundsTransferred(e) => self.move_funds(e),
        };

        if applied {
            self.version += 1;
        } else {
            tracing::warn!(event_type = event.event_type(), "event ignored: breaks ledger invariants");
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BankCommand::OpenAccount(cmd) => Ok(vec![BankEvent::AccountOpened(self.decide_open(cmd))]),
            BankCommand::Deposit(cmd) => self.handle_deposit(cmd),
            BankCommand::Withdraw(cmd) => self.handle_withdraw(cmd),
            BankCommand::Transfer(cmd) => self.handle_transfer(cmd),
        }
    }
}

impl Bank {
    /// Caller guarantees `opened.account_id == self.next_id`.
    fn insert_opened(&mut self, opened: AccountOpened) -> &Account {
        let id = opened.account_id;
        self.next_id = id.next();
        self.accounts
            .entry(id)
            .or_insert_with(|| Account::open(id, opened.name, opened.pin))
    }

    fn credit(&mut self, id: AccountId, amount: Amount) -> bool {
        match self.accounts.get_mut(&id) {
            Some(account) if Self::ensure_credit_fits(account, amount).is_ok() => {
                account.credit(amount);
                true
            }
            _ => false,
        }
    }

    fn debit(&mut self, id: AccountId, amount: Amount) -> bool {
        match self.accounts.get_mut(&id) {
            Some(account) if account.available() >= amount.value() => {
                account.debit(amount);
                true
            }
            _ => false,
        }
    }

    fn move_funds(&mut self, e: &FundsTransferred) -> bool {
        let covered = self
            .accounts
            .get(&e.sender_id)
            .is_some_and(|sender| sender.available() >= e.amount.value());
        let fits = self.accounts.get(&e.receiver_id).is_some_and(|receiver| {
            e.sender_id == e.receiver_id || Self::ensure_credit_fits(receiver, e.amount).is_ok()
        });
        if !(covered && fits) {
            return false;
        }

        self.debit(e.sender_id, e.amount) && self.credit(e.receiver_id, e.amount)
    }

    fn decide_open(&self, cmd: &OpenAccount) -> AccountOpened {
        AccountOpened {
            account_id: self.next_id,
            name: cmd.name.clone(),
            pin: cmd.pin.clone(),
            occurred_at: cmd.occurred_at,
        }
    }

    /// `amount` must be positive and no larger than what `account` holds.
    fn ensure_covered(account: &Account, amount: i64) -> DomainResult<Amount> {
        let amount = Amount::new(amount)?;
        if amount.value() > account.available() {
            return Err(DomainError::invalid_amount(
                "amount exceeds available balance",
            ));
        }
        Ok(amount)
    }

    fn ensure_credit_fits(account: &Account, amount: Amount) -> DomainResult<()> {
        if account.available().checked_add(amount.value()).is_none() {
            return Err(DomainError::invalid_amount("balance would overflow"));
        }
        Ok(())
    }

    fn handle_deposit(&self, cmd: &Deposit) -> DomainResult<Vec<BankEvent>> {
        let account = self.find_account(&cmd.account_id)?;
        let amount = Amount::new(cmd.amount)?;
        Self::ensure_credit_fits(account, amount)?;

        Ok(vec![BankEvent::FundsDeposited(FundsDeposited {
            account_id: account.id(),
            amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_withdraw(&self, cmd: &Withdraw) -> DomainResult<Vec<BankEvent>> {
        let account = self.find_account(&cmd.account_id)?;
        account.verify_pin(cmd.pin.expose())?;
        let amount = Self::ensure_covered(account, cmd.amount)?;

        Ok(vec![BankEvent::FundsWithdrawn(FundsWithdrawn {
            account_id: account.id(),
            amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    // Order matters: sender, sender pin, amount, then receiver.
    fn handle_transfer(&self, cmd: &Transfer) -> DomainResult<Vec<BankEvent>> {
        let sender = self.find_account(&cmd.sender_id)?;
        sender.verify_pin(cmd.sender_pin.expose())?;
        let amount = Self::ensure_covered(sender, cmd.amount)?;
        let receiver = self.find_account(&cmd.receiver_id)?;
        if receiver.id() != sender.id() {
            Self::ensure_credit_fits(receiver, amount)?;
        }

        Ok(vec![BankEvent::FundsTransferred(FundsTransferred {
            sender_id: sender.id(),
            receiver_id: receiver.id(),
            amount,
            occurred_at: cmd.occurred_at,
        })])
    }
}
