//! In-memory fungible token used as the settlement value transfer.
//!
//! Holders mint balances and approve the ledger operator to move up to an
//! allowance on their behalf. A settlement transfer spends both the sender's
//! balance and the sender's allowance.

use std::collections::HashMap;
use std::sync::Mutex;

use splitledger_core::{Amount, LedgerError, LedgerResult, MemberId, ensure_positive};
use splitledger_engine::{TransferError, ValueTransfer};

#[derive(Debug, Default)]
struct Accounts {
    balances: HashMap<MemberId, Amount>,
    allowances: HashMap<MemberId, Amount>,
}

impl Accounts {
    fn balance(&self, account: &MemberId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, account: &MemberId) -> Amount {
        self.allowances.get(account).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryToken {
    accounts: Mutex<Accounts>,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` new units to `account`. Returns the new balance.
    pub fn mint(&self, account: &MemberId, amount: Amount) -> LedgerResult<Amount> {
        ensure_positive(amount, "mint amount")?;
        let mut accounts = self.lock()?;

        let balance = accounts
            .balance(account)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid_amount(format!("minting {amount} to {account} overflows")))?;
        accounts.balances.insert(account.clone(), balance);

        tracing::debug!(account = %account, amount = %amount, balance = %balance, "minted");
        Ok(balance)
    }

    /// Let the ledger operator move up to `amount` from `account`.
    ///
    /// Replaces any previous allowance.
    pub fn approve(&self, account: &MemberId, amount: Amount) -> LedgerResult<()> {
        let mut accounts = self.lock()?;
        if amount == 0 {
            accounts.allowances.remove(account);
        } else {
            accounts.allowances.insert(account.clone(), amount);
        }
        Ok(())
    }

    pub fn balance_of(&self, account: &MemberId) -> LedgerResult<Amount> {
        Ok(self.lock()?.balance(account))
    }

    pub fn allowance(&self, account: &MemberId) -> LedgerResult<Amount> {
        Ok(self.lock()?.allowance(account))
    }

    fn lock(&self) -> LedgerResult<std::sync::MutexGuard<'_, Accounts>> {
        self.accounts
            .lock()
            .map_err(|_| LedgerError::unavailable("token accounts lock poisoned"))
    }
}

impl ValueTransfer for InMemoryToken {
    fn transfer(&self, from: &MemberId, to: &MemberId, amount: Amount) -> Result<(), TransferError> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| TransferError::Rejected("token accounts lock poisoned".to_string()))?;

        let available = accounts.balance(from);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                account: from.clone(),
                available,
                required: amount,
            });
        }
        let approved = accounts.allowance(from);
        if approved < amount {
            return Err(TransferError::InsufficientAllowance {
                account: from.clone(),
                approved,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = accounts
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected(format!("balance of {to} would overflow")))?;

        accounts.balances.insert(from.clone(), available - amount);
        accounts.balances.insert(to.clone(), credited);
        accounts.allowances.insert(from.clone(), approved - amount);

        Ok(())
    }
}
