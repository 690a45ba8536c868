//! Membership entity - the join record binding a user to a team

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::team::TeamId;
use crate::domain::user::UserId;

/// Role of a user within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Sole top-authority role per team - cannot leave without transfer
    Owner,
    /// Can manage members below owner level
    Admin,
    /// Regular team member
    #[default]
    Member,
}

impl TeamRole {
    /// Check if this role implicitly carries invite rights
    pub fn can_always_invite(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Check if this role can delete the team
    pub fn can_delete_team(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl std::str::FromStr for TeamRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error for a role string outside {owner, admin, member}
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("The only valid roles are owner, admin and member.")]
pub struct UnknownRole(pub String);

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
        }
    }
}

/// Membership record
///
/// Composite-unique on (user, team). A pending membership is an invitation
/// that has not been accepted and carries no team rights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Team this record belongs to
    team_id: TeamId,
    /// Member (or invitee) identity
    user_id: UserId,
    /// Role within the team
    role: TeamRole,
    /// True until the invitee accepts
    is_pending: bool,
    /// Who granted the invitation; absent for the founder's own row
    #[serde(skip_serializing_if = "Option::is_none")]
    invited_by: Option<UserId>,
    /// Member-level override to invite without being owner/admin
    can_invite: bool,
    /// Row creation timestamp, set once
    joined_on: DateTime<Utc>,
}

impl Membership {
    /// The founder's own membership, created together with the team
    pub fn founder(team_id: TeamId, user_id: UserId) -> Self {
        Self {
            team_id,
            user_id,
            role: TeamRole::Owner,
            is_pending: false,
            invited_by: None,
            can_invite: true,
            joined_on: Utc::now(),
        }
    }

    /// A pending invitation created by `invited_by`
    pub fn invitation(team_id: TeamId, user_id: UserId, invited_by: UserId) -> Self {
        Self {
            team_id,
            user_id,
            role: TeamRole::Member,
            is_pending: true,
            invited_by: Some(invited_by),
            can_invite: false,
            joined_on: Utc::now(),
        }
    }

    /// Rebuild a membership from stored fields
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        team_id: TeamId,
        user_id: UserId,
        role: TeamRole,
        is_pending: bool,
        invited_by: Option<UserId>,
        can_invite: bool,
        joined_on: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id,
            user_id,
            role,
            is_pending,
            invited_by,
            can_invite,
            joined_on,
        }
    }

    // Getters

    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> TeamRole {
        self.role
    }

    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    pub fn invited_by(&self) -> Option<&UserId> {
        self.invited_by.as_ref()
    }

    pub fn can_invite(&self) -> bool {
        self.can_invite
    }

    pub fn joined_on(&self) -> DateTime<Utc> {
        self.joined_on
    }

    /// An active membership: accepted, carries team rights
    pub fn is_active(&self) -> bool {
        !self.is_pending
    }

    /// Whether this record lets its holder invite others
    pub fn may_invite(&self) -> bool {
        self.is_active() && (self.role.can_always_invite() || self.can_invite)
    }

    // Mutators

    /// Accept the invitation
    pub fn accept(&mut self) {
        self.is_pending = false;
    }

    /// Change the role
    pub fn set_role(&mut self, role: TeamRole) {
        self.role = role;
    }

    /// Toggle the member-level invite permission
    pub fn set_can_invite(&mut self, can_invite: bool) {
        self.can_invite = can_invite;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ids() -> (TeamId, UserId, UserId) {
        (TeamId::generate(), UserId::generate(), UserId::generate())
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(TeamRole::from_str("owner").unwrap(), TeamRole::Owner);
        assert_eq!(TeamRole::from_str("admin").unwrap(), TeamRole::Admin);
        assert_eq!(TeamRole::from_str("member").unwrap(), TeamRole::Member);
        assert!(TeamRole::from_str("superuser").is_err());
        assert!(TeamRole::from_str("Owner").is_err());
    }

    #[test]
    fn test_role_display_round_trip() {
        for role in [TeamRole::Owner, TeamRole::Admin, TeamRole::Member] {
            assert_eq!(TeamRole::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn test_founder_membership() {
        let (team, user, _) = ids();
        let m = Membership::founder(team, user.clone());

        assert_eq!(m.role(), TeamRole::Owner);
        assert!(m.is_active());
        assert!(m.can_invite());
        assert!(m.invited_by().is_none());
        assert!(m.may_invite());
    }

    #[test]
    fn test_invitation_membership() {
        let (team, invitee, inviter) = ids();
        let m = Membership::invitation(team, invitee, inviter.clone());

        assert_eq!(m.role(), TeamRole::Member);
        assert!(m.is_pending());
        assert!(!m.can_invite());
        assert_eq!(m.invited_by(), Some(&inviter));
    }

    #[test]
    fn test_pending_carries_no_invite_rights() {
        let (team, invitee, inviter) = ids();
        let mut m = Membership::invitation(team, invitee, inviter);

        assert!(!m.may_invite());

        // Still none after accept: plain member without the override
        m.accept();
        assert!(!m.may_invite());

        m.set_can_invite(true);
        assert!(m.may_invite());
    }

    #[test]
    fn test_accept() {
        let (team, invitee, inviter) = ids();
        let mut m = Membership::invitation(team, invitee, inviter);

        m.accept();
        assert!(m.is_active());
        assert_eq!(m.role(), TeamRole::Member);
    }

    #[test]
    fn test_admin_invites_without_flag() {
        let (team, user, inviter) = ids();
        let mut m = Membership::invitation(team, user, inviter);
        m.accept();
        m.set_role(TeamRole::Admin);

        assert!(!m.can_invite());
        assert!(m.may_invite());
    }
}
