//! Pure membership authorization rules
//!
//! Every rule here is a function of roles and flags alone, with no storage
//! access. Services fetch the relevant memberships and ask these functions
//! for a verdict, then apply the verdict transactionally.

use super::entity::{Membership, TeamRole};

/// Outcome of an authorized role change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    /// Ownership transfer: the requester steps down to admin and the
    /// target becomes the owner, as one atomic swap
    TransferOwnership,
    /// Plain assignment of the requested role to the target
    Assign(TeamRole),
}

/// Rule violation with the reason spelled out
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Owner can only transfer ownership to an admin")]
    TransferTargetNotAdmin,
    #[error("Team owners must transfer ownership before changing their own role.")]
    OwnerSelfDemotion,
    #[error("Admins cannot modify other admins or the team owner.")]
    AdminModifiesPeer,
    #[error("Admins can only promote members to team admin.")]
    AdminInvalidPromotion,
    #[error("Permission denied.")]
    MemberManagesRoles,
    #[error("Admins cannot remove other admins or the team owner from the team.")]
    AdminKicksPeer,
    #[error("User does not have permission to remove members from the team.")]
    MemberKicks,
    #[error("Team owners must transfer ownership before leaving.")]
    OwnerLeaves,
    #[error("Only the team owner can delete this team.")]
    NonOwnerDeletesTeam,
    #[error("Only team owner or admins can update invite permissions.")]
    InviteToggleByMember,
    #[error("Inviter does not have permission to invite users to this team.")]
    InviterLacksPermission,
}

/// Decide whether `requester_role` may set `target_role` to `new_role`.
///
/// Callers must reject the `new_role == target_role` no-op before asking;
/// this function only rules on genuine changes.
pub fn authorize_role_change(
    requester_role: TeamRole,
    target_role: TeamRole,
    new_role: TeamRole,
) -> Result<RoleChange, PolicyViolation> {
    match requester_role {
        TeamRole::Owner => {
            if new_role == TeamRole::Owner {
                if target_role == TeamRole::Admin {
                    Ok(RoleChange::TransferOwnership)
                } else {
                    Err(PolicyViolation::TransferTargetNotAdmin)
                }
            } else if target_role == TeamRole::Owner {
                // A team has exactly one owner, so an owner-roled target is
                // the requester. Demoting them would leave the team ownerless.
                Err(PolicyViolation::OwnerSelfDemotion)
            } else {
                Ok(RoleChange::Assign(new_role))
            }
        }
        TeamRole::Admin => {
            if target_role != TeamRole::Member {
                Err(PolicyViolation::AdminModifiesPeer)
            } else if new_role != TeamRole::Admin {
                Err(PolicyViolation::AdminInvalidPromotion)
            } else {
                Ok(RoleChange::Assign(TeamRole::Admin))
            }
        }
        TeamRole::Member => Err(PolicyViolation::MemberManagesRoles),
    }
}

/// Decide whether `requester_role` may remove a user with `target_role`.
pub fn authorize_kick(
    requester_role: TeamRole,
    target_role: TeamRole,
) -> Result<(), PolicyViolation> {
    match requester_role {
        TeamRole::Owner => Ok(()),
        TeamRole::Admin => {
            if target_role == TeamRole::Member {
                Ok(())
            } else {
                Err(PolicyViolation::AdminKicksPeer)
            }
        }
        TeamRole::Member => Err(PolicyViolation::MemberKicks),
    }
}

/// Decide whether the holder of `membership` may leave the team.
pub fn authorize_leave(membership: &Membership) -> Result<(), PolicyViolation> {
    if membership.role() == TeamRole::Owner {
        Err(PolicyViolation::OwnerLeaves)
    } else {
        Ok(())
    }
}

/// Decide whether `requester_role` may toggle another member's invite flag.
pub fn authorize_invite_toggle(requester_role: TeamRole) -> Result<(), PolicyViolation> {
    if requester_role.can_always_invite() {
        Ok(())
    } else {
        Err(PolicyViolation::InviteToggleByMember)
    }
}

/// Decide whether the holder of `membership` may send invitations.
pub fn authorize_invite(membership: &Membership) -> Result<(), PolicyViolation> {
    if membership.may_invite() {
        Ok(())
    } else {
        Err(PolicyViolation::InviterLacksPermission)
    }
}

/// Decide whether `requester_role` may delete the team.
pub fn authorize_team_delete(requester_role: TeamRole) -> Result<(), PolicyViolation> {
    if requester_role.can_delete_team() {
        Ok(())
    } else {
        Err(PolicyViolation::NonOwnerDeletesTeam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::team::TeamId;
    use crate::domain::user::UserId;
    use TeamRole::{Admin, Member, Owner};

    #[test]
    fn test_owner_transfers_to_admin() {
        assert_eq!(
            authorize_role_change(Owner, Admin, Owner),
            Ok(RoleChange::TransferOwnership)
        );
    }

    #[test]
    fn test_owner_cannot_transfer_to_member() {
        assert_eq!(
            authorize_role_change(Owner, Member, Owner),
            Err(PolicyViolation::TransferTargetNotAdmin)
        );
    }

    #[test]
    fn test_owner_promotes_and_demotes_freely() {
        assert_eq!(
            authorize_role_change(Owner, Member, Admin),
            Ok(RoleChange::Assign(Admin))
        );
        assert_eq!(
            authorize_role_change(Owner, Admin, Member),
            Ok(RoleChange::Assign(Member))
        );
    }

    #[test]
    fn test_owner_cannot_demote_self() {
        assert_eq!(
            authorize_role_change(Owner, Owner, Admin),
            Err(PolicyViolation::OwnerSelfDemotion)
        );
        assert_eq!(
            authorize_role_change(Owner, Owner, Member),
            Err(PolicyViolation::OwnerSelfDemotion)
        );
    }

    #[test]
    fn test_admin_promotes_member_to_admin() {
        assert_eq!(
            authorize_role_change(Admin, Member, Admin),
            Ok(RoleChange::Assign(Admin))
        );
    }

    #[test]
    fn test_admin_cannot_touch_peers_or_owner() {
        assert_eq!(
            authorize_role_change(Admin, Admin, Member),
            Err(PolicyViolation::AdminModifiesPeer)
        );
        assert_eq!(
            authorize_role_change(Admin, Owner, Admin),
            Err(PolicyViolation::AdminModifiesPeer)
        );
    }

    #[test]
    fn test_admin_cannot_grant_ownership() {
        assert_eq!(
            authorize_role_change(Admin, Member, Owner),
            Err(PolicyViolation::AdminInvalidPromotion)
        );
    }

    #[test]
    fn test_member_cannot_manage_roles() {
        assert_eq!(
            authorize_role_change(Member, Member, Admin),
            Err(PolicyViolation::MemberManagesRoles)
        );
    }

    #[test]
    fn test_kick_matrix() {
        // Owner kicks anyone
        assert!(authorize_kick(Owner, Owner).is_ok());
        assert!(authorize_kick(Owner, Admin).is_ok());
        assert!(authorize_kick(Owner, Member).is_ok());

        // Admin kicks members only
        assert!(authorize_kick(Admin, Member).is_ok());
        assert_eq!(
            authorize_kick(Admin, Admin),
            Err(PolicyViolation::AdminKicksPeer)
        );
        assert_eq!(
            authorize_kick(Admin, Owner),
            Err(PolicyViolation::AdminKicksPeer)
        );

        // Members kick nobody
        assert_eq!(
            authorize_kick(Member, Member),
            Err(PolicyViolation::MemberKicks)
        );
    }

    #[test]
    fn test_owner_cannot_leave() {
        let team = TeamId::generate();
        let owner = Membership::founder(team, UserId::generate());
        assert_eq!(
            authorize_leave(&owner),
            Err(PolicyViolation::OwnerLeaves)
        );

        let mut member = Membership::invitation(team, UserId::generate(), UserId::generate());
        member.accept();
        assert!(authorize_leave(&member).is_ok());
    }

    #[test]
    fn test_invite_toggle_requires_owner_or_admin() {
        assert!(authorize_invite_toggle(Owner).is_ok());
        assert!(authorize_invite_toggle(Admin).is_ok());
        assert_eq!(
            authorize_invite_toggle(Member),
            Err(PolicyViolation::InviteToggleByMember)
        );
    }

    #[test]
    fn test_invite_requires_role_or_flag() {
        let team = TeamId::generate();
        let owner = Membership::founder(team, UserId::generate());
        assert!(authorize_invite(&owner).is_ok());

        let mut member = Membership::invitation(team, UserId::generate(), UserId::generate());
        member.accept();
        assert_eq!(
            authorize_invite(&member),
            Err(PolicyViolation::InviterLacksPermission)
        );

        member.set_can_invite(true);
        assert!(authorize_invite(&member).is_ok());
    }

    #[test]
    fn test_pending_membership_cannot_invite_even_with_flag() {
        let team = TeamId::generate();
        let mut pending = Membership::invitation(team, UserId::generate(), UserId::generate());
        pending.set_can_invite(true);
        assert_eq!(
            authorize_invite(&pending),
            Err(PolicyViolation::InviterLacksPermission)
        );
    }

    #[test]
    fn test_only_owner_deletes_team() {
        assert!(authorize_team_delete(Owner).is_ok());
        assert_eq!(
            authorize_team_delete(Admin),
            Err(PolicyViolation::NonOwnerDeletesTeam)
        );
        assert_eq!(
            authorize_team_delete(Member),
            Err(PolicyViolation::NonOwnerDeletesTeam)
        );
    }
}
