//! Membership policy - the single source of truth for posting rights.
//!
//! Every place that needs to know whether a user counts as a participant of
//! a community (community detail rendering, event creation, event editing)
//! asks this one predicate. There is no fallback branching: the member set
//! always exists, and an anonymous viewer is simply not a member.

use std::collections::HashSet;

use anyhow::Result;
use sqlx::PgPool;

use crate::common::{CommunityId, UserId};

/// A loaded snapshot of one community's ownership and member set.
///
/// The decision itself is pure; loading is the only part that touches the
/// database. Membership is evaluated against the snapshot taken at check
/// time and is not re-validated retroactively when membership later changes.
#[derive(Debug, Clone)]
pub struct Membership {
    community_id: CommunityId,
    owner_id: UserId,
    member_ids: HashSet<UserId>,
}

impl Membership {
    pub fn new(community_id: CommunityId, owner_id: UserId, member_ids: HashSet<UserId>) -> Self {
        Self {
            community_id,
            owner_id,
            member_ids,
        }
    }

    /// Load the snapshot for a community in one query.
    ///
    /// Returns `Ok(None)` if the community does not exist.
    pub async fn load(community_id: CommunityId, pool: &PgPool) -> Result<Option<Self>> {
        let rows: Vec<(UserId, Option<UserId>)> = sqlx::query_as(
            "SELECT c.owner_id, m.user_id
             FROM communities c
             LEFT JOIN community_members m ON m.community_id = c.id
             WHERE c.id = $1",
        )
        .bind(community_id)
        .fetch_all(pool)
        .await?;

        let Some(&(owner_id, _)) = rows.first() else {
            return Ok(None);
        };

        let member_ids = rows.into_iter().filter_map(|(_, member)| member).collect();
        Ok(Some(Self::new(community_id, owner_id, member_ids)))
    }

    pub fn community_id(&self) -> CommunityId {
        self.community_id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// True iff the viewer is the community's owner.
    ///
    /// False for an anonymous viewer; never errors.
    pub fn is_owner(&self, viewer: Option<UserId>) -> bool {
        viewer == Some(self.owner_id)
    }

    /// True iff the viewer is the owner or appears in the member set.
    ///
    /// The owner is implicitly a member even when absent from the explicit
    /// set. False for an anonymous viewer; never errors.
    pub fn is_member(&self, viewer: Option<UserId>) -> bool {
        match viewer {
            Some(user_id) => user_id == self.owner_id || self.member_ids.contains(&user_id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(owner: UserId, members: &[UserId]) -> Membership {
        Membership::new(
            CommunityId::new(),
            owner,
            members.iter().copied().collect(),
        )
    }

    #[test]
    fn test_owner_is_member_even_outside_member_set() {
        let owner = UserId::new();
        let membership = snapshot(owner, &[]);
        assert!(membership.is_member(Some(owner)));
        assert!(membership.is_owner(Some(owner)));
    }

    #[test]
    fn test_explicit_member_is_member_but_not_owner() {
        let owner = UserId::new();
        let member = UserId::new();
        let membership = snapshot(owner, &[member]);
        assert!(membership.is_member(Some(member)));
        assert!(!membership.is_owner(Some(member)));
    }

    #[test]
    fn test_stranger_is_not_member() {
        let membership = snapshot(UserId::new(), &[UserId::new()]);
        assert!(!membership.is_member(Some(UserId::new())));
    }

    #[test]
    fn test_anonymous_is_never_member() {
        let owner = UserId::new();
        let membership = snapshot(owner, &[UserId::new()]);
        assert!(!membership.is_member(None));
        assert!(!membership.is_owner(None));
    }

    #[test]
    fn test_join_then_leave_round_trip() {
        let owner = UserId::new();
        let user = UserId::new();

        let before = snapshot(owner, &[]);
        assert!(!before.is_member(Some(user)));

        // join: user appears in the member set
        let joined = snapshot(owner, &[user]);
        assert!(joined.is_member(Some(user)));

        // leave: the set no longer contains the user
        let left = snapshot(owner, &[]);
        assert!(!left.is_member(Some(user)));
    }
}
