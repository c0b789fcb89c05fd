//! Test doubles for the engine's collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use splitledger_core::{Amount, GroupId, MemberId};

use crate::ports::{Clock, MembershipDirectory, TransferError, ValueTransfer};

pub fn member(name: &str) -> MemberId {
    MemberId::new(name).unwrap()
}

pub fn group(name: &str) -> GroupId {
    GroupId::new(name).unwrap()
}

pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[derive(Debug, Default)]
pub struct StaticDirectory {
    groups: HashMap<GroupId, HashSet<MemberId>>,
}

impl StaticDirectory {
    pub fn with_group(mut self, name: &str, members: &[&str]) -> Self {
        self.groups
            .insert(group(name), members.iter().map(|m| member(m)).collect());
        self
    }
}

impl MembershipDirectory for StaticDirectory {
    fn group_exists(&self, group: &GroupId) -> bool {
        self.groups.contains_key(group)
    }

    fn is_member(&self, group: &GroupId, member: &MemberId) -> bool {
        self.groups
            .get(group)
            .is_some_and(|members| members.contains(member))
    }
}

/// Records every transfer; fails while `failing` is set.
#[derive(Debug, Default)]
pub struct RecordingTransfer {
    pub calls: Mutex<Vec<(MemberId, MemberId, Amount)>>,
    pub failing: Mutex<bool>,
}

impl RecordingTransfer {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(true),
        }
    }

    pub fn calls(&self) -> Vec<(MemberId, MemberId, Amount)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ValueTransfer for RecordingTransfer {
    fn transfer(&self, from: &MemberId, to: &MemberId, amount: Amount) -> Result<(), TransferError> {
        self.calls
            .lock()
            .unwrap()
            .push((from.clone(), to.clone(), amount));
        if *self.failing.lock().unwrap() {
            return Err(TransferError::Rejected("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoppedClock(pub DateTime<Utc>);

impl Clock for StoppedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
