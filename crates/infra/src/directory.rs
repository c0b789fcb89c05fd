//! In-memory group directory: creation, joins and membership checks.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use splitledger_core::{Entity, GroupId, LedgerError, LedgerResult, MemberId};
use splitledger_engine::MembershipDirectory;

/// A named group and its members.
///
/// Members are only ever added; the set is never empty once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    members: BTreeSet<MemberId>,
}

impl Group {
    pub fn members(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Entity for Group {
    type Id = GroupId;

    fn id(&self) -> &GroupId {
        &self.id
    }
}

/// Group registry kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryGroupDirectory {
    groups: RwLock<HashMap<GroupId, Group>>,
}

impl InMemoryGroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `name` with exactly `members`.
    ///
    /// `creator` is recorded in the log only; a creator who wants to take
    /// part lists themselves or joins later. Duplicate members are collapsed.
    #[tracing::instrument(skip_all, fields(group = %name, creator = %creator))]
    pub fn create_group(&self, name: &str, creator: &MemberId, members: &[MemberId]) -> LedgerResult<GroupId> {
        let id = GroupId::new(name)?;
        if members.is_empty() {
            return Err(LedgerError::EmptyMemberSet);
        }

        let mut groups = self
            .groups
            .write()
            .map_err(|_| LedgerError::unavailable("group directory lock poisoned"))?;
        if groups.contains_key(&id) {
            return Err(LedgerError::GroupAlreadyExists(id));
        }

        let set: BTreeSet<MemberId> = members.iter().cloned().collect();
        let size = set.len();

        groups.insert(
            id.clone(),
            Group {
                id: id.clone(),
                members: set,
            },
        );

        tracing::info!(members = size, "group created");
        Ok(id)
    }

    #[tracing::instrument(skip_all, fields(group = %group, member = %member))]
    pub fn join_group(&self, group: &GroupId, member: &MemberId) -> LedgerResult<()> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| LedgerError::unavailable("group directory lock poisoned"))?;
        let record = groups
            .get_mut(group)
            .ok_or_else(|| LedgerError::NoSuchGroup(group.clone()))?;

        if !record.members.insert(member.clone()) {
            return Err(LedgerError::AlreadyMember {
                group: group.clone(),
                member: member.clone(),
            });
        }

        tracing::info!(members = record.members.len(), "member joined");
        Ok(())
    }

    /// Members of `group`, sorted.
    pub fn members(&self, group: &GroupId) -> LedgerResult<Vec<MemberId>> {
        Ok(self.group(group)?.members.into_iter().collect())
    }

    pub fn group(&self, group: &GroupId) -> LedgerResult<Group> {
        let groups = self
            .groups
            .read()
            .map_err(|_| LedgerError::unavailable("group directory lock poisoned"))?;
        groups
            .get(group)
            .cloned()
            .ok_or_else(|| LedgerError::NoSuchGroup(group.clone()))
    }
}

impl MembershipDirectory for InMemoryGroupDirectory {
    fn group_exists(&self, group: &GroupId) -> bool {
        self.groups
            .read()
            .map(|groups| groups.contains_key(group))
            .unwrap_or(false)
    }

    fn is_member(&self, group: &GroupId, member: &MemberId) -> bool {
        self.groups
            .read()
            .map(|groups| groups.get(group).is_some_and(|g| g.contains(member)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> MemberId {
        MemberId::new(name).unwrap()
    }

    #[test]
    fn members_are_exactly_the_listed_ones() {
        let directory = InMemoryGroupDirectory::new();
        let group = directory
            .create_group("trip", &member("alice"), &[member("carol"), member("bob"), member("bob")])
            .unwrap();

        assert_eq!(directory.members(&group).unwrap(), vec![member("bob"), member("carol")]);
        assert!(!directory.is_member(&group, &member("alice")));
    }

    #[test]
    fn creator_can_join_their_own_group() {
        let directory = InMemoryGroupDirectory::new();
        let owner = member("owner");
        let group = directory
            .create_group(
                "Weekend Trip",
                &owner,
                &[member("addr1"), member("addr2"), member("addr3")],
            )
            .unwrap();

        assert_eq!(
            directory.join_group(&group, &member("addr1")).unwrap_err(),
            LedgerError::AlreadyMember {
                group: group.clone(),
                member: member("addr1"),
            }
        );
        directory.join_group(&group, &owner).unwrap();
        assert!(directory.is_member(&group, &owner));
        assert_eq!(directory.group(&group).unwrap().len(), 4);
    }

    #[test]
    fn creation_rejects_bad_input() {
        let directory = InMemoryGroupDirectory::new();
        let alice = member("alice");

        assert!(matches!(
            directory.create_group("  ", &alice, &[member("bob")]),
            Err(LedgerError::InvalidId(_))
        ));
        assert_eq!(
            directory.create_group("trip", &alice, &[]).unwrap_err(),
            LedgerError::EmptyMemberSet
        );

        directory.create_group("trip", &alice, &[member("bob")]).unwrap();
        assert_eq!(
            directory.create_group("trip", &member("bob"), &[alice]).unwrap_err(),
            LedgerError::GroupAlreadyExists(GroupId::new("trip").unwrap())
        );
    }

    #[test]
    fn join_adds_exactly_once() {
        let directory = InMemoryGroupDirectory::new();
        let group = directory
            .create_group("flat", &member("alice"), &[member("bob")])
            .unwrap();

        directory.join_group(&group, &member("carol")).unwrap();
        assert!(directory.is_member(&group, &member("carol")));
        assert_eq!(
            directory.join_group(&group, &member("carol")).unwrap_err(),
            LedgerError::AlreadyMember {
                group: group.clone(),
                member: member("carol"),
            }
        );
        assert_eq!(directory.group(&group).unwrap().len(), 2);
    }

    #[test]
    fn unknown_group_is_reported() {
        let directory = InMemoryGroupDirectory::new();
        let moon = GroupId::new("moon").unwrap();

        assert!(!directory.group_exists(&moon));
        assert_eq!(
            directory.join_group(&moon, &member("alice")).unwrap_err(),
            LedgerError::NoSuchGroup(moon.clone())
        );
        assert_eq!(directory.members(&moon).unwrap_err(), LedgerError::NoSuchGroup(moon));
    }
}
