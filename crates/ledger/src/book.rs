use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use splitledger_core::{Amount, GroupId, LedgerError, LedgerResult, MemberId};

use crate::debt::{DebtLedger, Netting};

/// Group-keyed registry of debt ledgers.
///
/// Each group's ledger sits behind its own mutex: operations on one group are
/// serialized, different groups do not contend. The outer lock only guards
/// the registry itself and is never held while a group ledger is in use.
#[derive(Debug, Default)]
pub struct LedgerBook {
    groups: RwLock<HashMap<GroupId, Arc<Mutex<DebtLedger>>>>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` inside the critical section of `group`, creating an empty
    /// ledger on first use.
    ///
    /// Everything `f` reads and writes is observed atomically by other
    /// callers of the same group.
    pub fn with_group<T>(
        &self,
        group: &GroupId,
        f: impl FnOnce(&mut DebtLedger) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let ledger = self.ledger_for(group)?;
        let mut guard = ledger
            .lock()
            .map_err(|_| LedgerError::unavailable(format!("ledger of group {group} is poisoned")))?;
        f(&mut guard)
    }

    pub fn record_obligation(
        &self,
        group: &GroupId,
        debtor: &MemberId,
        creditor: &MemberId,
        amount: Amount,
    ) -> LedgerResult<Netting> {
        self.with_group(group, |ledger| ledger.record_obligation(debtor, creditor, amount))
    }

    pub fn settle(
        &self,
        group: &GroupId,
        payer: &MemberId,
        receiver: &MemberId,
        requested: Amount,
    ) -> LedgerResult<Amount> {
        self.with_group(group, |ledger| ledger.settle(payer, receiver, requested))
    }

    /// Amount `debtor` owes `creditor` in `group`; zero when nothing was ever
    /// recorded for the group.
    pub fn query_owed(
        &self,
        group: &GroupId,
        debtor: &MemberId,
        creditor: &MemberId,
    ) -> LedgerResult<Amount> {
        self.read(group, |ledger| ledger.owed(debtor, creditor))
            .map(|owed| owed.unwrap_or(0))
    }

    /// Copy of the group's current ledger (empty when the group has none).
    pub fn snapshot(&self, group: &GroupId) -> LedgerResult<DebtLedger> {
        self.read(group, DebtLedger::clone)
            .map(|ledger| ledger.unwrap_or_else(|| DebtLedger::new(group.clone())))
    }

    /// Read from an existing ledger without creating one.
    fn read<T>(&self, group: &GroupId, f: impl FnOnce(&DebtLedger) -> T) -> LedgerResult<Option<T>> {
        let existing = {
            let groups = self
                .groups
                .read()
                .map_err(|_| LedgerError::unavailable("ledger registry is poisoned"))?;
            groups.get(group).cloned()
        };

        let Some(ledger) = existing else {
            return Ok(None);
        };
        let guard = ledger
            .lock()
            .map_err(|_| LedgerError::unavailable(format!("ledger of group {group} is poisoned")))?;
        Ok(Some(f(&guard)))
    }

    fn ledger_for(&self, group: &GroupId) -> LedgerResult<Arc<Mutex<DebtLedger>>> {
        {
            let groups = self
                .groups
                .read()
                .map_err(|_| LedgerError::unavailable("ledger registry is poisoned"))?;
            if let Some(ledger) = groups.get(group) {
                return Ok(ledger.clone());
            }
        }

        let mut groups = self
            .groups
            .write()
            .map_err(|_| LedgerError::unavailable("ledger registry is poisoned"))?;
        Ok(groups
            .entry(group.clone())
            .or_insert_with(|| Arc::new(Mutex::new(DebtLedger::new(group.clone()))))
            .clone())
    }
}
