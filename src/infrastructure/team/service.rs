//! Team service orchestrating the membership lifecycle
//!
//! Authorization verdicts come from `domain::membership::policy`; this
//! service resolves identities, fetches memberships and applies the
//! verdicts through the repositories.

use std::sync::Arc;

use crate::domain::membership::{
    policy::{self, RoleChange},
    Membership, MembershipRepository, TeamRole,
};
use crate::domain::team::{
    validate_team_description, validate_team_name, Team, TeamId, TeamRepository,
};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// Request for creating a team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    /// Usernames to invite as part of team creation
    pub invite_usernames: Vec<String>,
}

/// Per-username outcome of an invitation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    Invited,
    UserNotFound,
    AlreadyInvited,
    AlreadyMember,
    InviterNotMember,
    InviterNotPermitted,
}

/// One entry in the invitation report returned to the caller
#[derive(Debug, Clone)]
pub struct InviteReport {
    pub username: String,
    pub outcome: InviteOutcome,
}

/// Result of creating a team
#[derive(Debug, Clone)]
pub struct CreatedTeam {
    pub team: Team,
    pub invitations: Vec<InviteReport>,
}

/// A membership row joined with its user record, for listings.
///
/// `user` is `None` when the directory row has vanished; callers fall
/// back to the user ID stored on the membership.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    pub user: Option<User>,
    pub membership: Membership,
}

/// A team joined with the caller's role in it
#[derive(Debug, Clone)]
pub struct TeamWithRole {
    pub team: Team,
    pub role: TeamRole,
}

/// A pending invitation joined with team and inviter details
#[derive(Debug, Clone)]
pub struct PendingInvitation {
    pub team: Team,
    pub role: TeamRole,
    pub invited_by: Option<String>,
}

/// Outcome of a role update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleUpdateOutcome {
    /// Ownership moved to the target; the requester is now an admin
    OwnershipTransferred,
    /// The target now holds this role
    RoleAssigned(TeamRole),
}

/// Accept or decline a pending invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Decline,
}

/// Team service
#[derive(Debug)]
pub struct TeamService<T, M, U>
where
    T: TeamRepository,
    M: MembershipRepository,
    U: UserRepository,
{
    teams: Arc<T>,
    memberships: Arc<M>,
    users: Arc<U>,
}

impl<T, M, U> TeamService<T, M, U>
where
    T: TeamRepository,
    M: MembershipRepository,
    U: UserRepository,
{
    pub fn new(teams: Arc<T>, memberships: Arc<M>, users: Arc<U>) -> Self {
        Self {
            teams,
            memberships,
            users,
        }
    }

    /// Create a team with the creator as its owner, inviting the given
    /// usernames in the same call
    pub async fn create_team(
        &self,
        creator: &UserId,
        request: CreateTeamRequest,
    ) -> Result<CreatedTeam, DomainError> {
        validate_team_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        if let Some(description) = &request.description {
            validate_team_description(description)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let mut team =
            Team::new(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        if let Some(description) = request.description {
            team = team.with_description(description);
        }

        // The repository persists the team and its founder row as one unit
        let founder = Membership::founder(team.id(), creator.clone());
        let team = self.teams.create(team, founder).await?;

        let mut invitations = Vec::with_capacity(request.invite_usernames.len());
        for username in request.invite_usernames {
            let outcome = self.invite_one(team.id(), creator, &username).await?;
            invitations.push(InviteReport { username, outcome });
        }

        tracing::info!(team_id = %team.id(), creator = %creator, "Team created");

        Ok(CreatedTeam { team, invitations })
    }

    /// Get a team by ID
    pub async fn get_team(&self, team_id: TeamId) -> Result<Team, DomainError> {
        self.teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Team not found."))
    }

    /// Delete a team; only its owner may do this
    pub async fn delete_team(&self, requester: &UserId, team_id: TeamId) -> Result<(), DomainError> {
        let team = self.get_team(team_id).await?;

        let membership = self.memberships.get(team.id(), requester).await?;
        match membership {
            Some(m) if m.role() == TeamRole::Owner => {}
            _ => {
                return Err(DomainError::forbidden(
                    "Only the team owner can delete this team.",
                ))
            }
        }

        // The repository removes the membership rows with the team
        self.teams.delete(team.id()).await?;

        tracing::info!(team_id = %team.id(), "Team deleted");

        Ok(())
    }

    /// List all members of a team, pending invitations included.
    ///
    /// Only an active member of the team may see the listing.
    pub async fn members(
        &self,
        requester: &UserId,
        team_id: TeamId,
    ) -> Result<Vec<MemberRecord>, DomainError> {
        let team = self.get_team(team_id).await?;

        let requester_membership = self.memberships.get(team.id(), requester).await?;
        if !requester_membership.is_some_and(|m| m.is_active()) {
            return Err(DomainError::forbidden(
                "You must be a team member to view this.",
            ));
        }

        let memberships = self.memberships.list_for_team(team.id()).await?;
        let mut records = Vec::with_capacity(memberships.len());

        for membership in memberships {
            let user = self.users.get(membership.user_id()).await?;
            records.push(MemberRecord { user, membership });
        }

        Ok(records)
    }

    /// Get the role and invite flag of a user in a team.
    ///
    /// With `username` absent, reports on the requester themselves. The
    /// queried user must be an active member.
    pub async fn role_of(
        &self,
        requester: &UserId,
        team_id: TeamId,
        username: Option<&str>,
    ) -> Result<Membership, DomainError> {
        let team = self.get_team(team_id).await?;

        let target_id = match username {
            Some(name) => match self.users.get_by_username(name).await? {
                Some(user) => user.id().clone(),
                None => {
                    return Err(DomainError::forbidden(
                        "You must be a team member to view this.",
                    ))
                }
            },
            None => requester.clone(),
        };

        let membership = self.memberships.get(team.id(), &target_id).await?;
        match membership {
            Some(m) if m.is_active() => Ok(m),
            _ => Err(DomainError::forbidden(
                "You must be a team member to view this.",
            )),
        }
    }

    /// Change a member's role, including ownership transfer
    pub async fn update_role(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
        new_role: TeamRole,
    ) -> Result<RoleUpdateOutcome, DomainError> {
        let (requester_membership, mut target_membership) = self
            .requester_and_target(team_id, requester, target_username)
            .await?;

        if new_role == target_membership.role() {
            return Err(DomainError::validation(format!(
                "{} already has the role of {}.",
                target_username, new_role
            )));
        }

        let verdict = policy::authorize_role_change(
            requester_membership.role(),
            target_membership.role(),
            new_role,
        )
        .map_err(|e| DomainError::forbidden(e.to_string()))?;

        match verdict {
            RoleChange::TransferOwnership => {
                self.memberships
                    .transfer_ownership(team_id, requester, target_membership.user_id())
                    .await?;

                tracing::info!(
                    team_id = %team_id,
                    from = %requester,
                    to = %target_membership.user_id(),
                    "Ownership transferred"
                );

                Ok(RoleUpdateOutcome::OwnershipTransferred)
            }
            RoleChange::Assign(role) => {
                target_membership.set_role(role);
                self.memberships.update(&target_membership).await?;

                Ok(RoleUpdateOutcome::RoleAssigned(role))
            }
        }
    }

    /// Remove another user from the team
    pub async fn kick(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
    ) -> Result<(), DomainError> {
        let (requester_membership, target_membership) = self
            .requester_and_target(team_id, requester, target_username)
            .await?;

        if requester == target_membership.user_id() {
            return Err(DomainError::validation(
                "User should leave the team by using the leave button",
            ));
        }

        policy::authorize_kick(requester_membership.role(), target_membership.role())
            .map_err(|e| DomainError::forbidden(e.to_string()))?;

        self.memberships
            .delete(team_id, target_membership.user_id())
            .await?;

        tracing::info!(
            team_id = %team_id,
            kicked = %target_membership.user_id(),
            by = %requester,
            "Member removed from team"
        );

        Ok(())
    }

    /// Leave a team; owners must transfer ownership first
    pub async fn leave(&self, requester: &UserId, team_id: TeamId) -> Result<(), DomainError> {
        let team = self
            .teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Team could not be found."))?;

        let membership = self.memberships.get(team.id(), requester).await?;
        let membership = match membership {
            Some(m) if m.is_active() => m,
            _ => {
                return Err(DomainError::forbidden(
                    "User is not an active member of this team.",
                ))
            }
        };

        policy::authorize_leave(&membership).map_err(|e| DomainError::forbidden(e.to_string()))?;

        self.memberships.delete(team.id(), requester).await?;

        Ok(())
    }

    /// Grant or revoke a member's invite permission.
    ///
    /// Only owners and admins may toggle the flag, only plain members carry
    /// one, and setting it to its current value is rejected.
    pub async fn set_invite_permission(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
        can_invite: bool,
    ) -> Result<(), DomainError> {
        let team = self
            .teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Team or user not found."))?;
        let target_user = self
            .users
            .get_by_username(target_username)
            .await?
            .ok_or_else(|| DomainError::not_found("Team or user not found."))?;

        let requester_membership = self.memberships.get(team.id(), requester).await?;
        let requester_membership = match requester_membership {
            Some(m) if m.is_active() => m,
            _ => {
                return Err(DomainError::forbidden(
                    "User is not a member of this team.",
                ))
            }
        };

        policy::authorize_invite_toggle(requester_membership.role())
            .map_err(|e| DomainError::forbidden(e.to_string()))?;

        let target_membership = self.memberships.get(team.id(), target_user.id()).await?;
        let mut target_membership = match target_membership {
            Some(m) if m.role() == TeamRole::Member => m,
            _ => {
                return Err(DomainError::validation(
                    "Only regular members need to have invite permissions changed.",
                ))
            }
        };

        if target_membership.can_invite() == can_invite {
            let status_text = if can_invite {
                "already has"
            } else {
                "already does not have"
            };
            return Err(DomainError::validation(format!(
                "{} {} invite permissions.",
                target_username, status_text
            )));
        }

        target_membership.set_can_invite(can_invite);
        self.memberships.update(&target_membership).await?;

        Ok(())
    }

    /// Invite users to a team by username, reporting per-username outcomes
    pub async fn invite_users(
        &self,
        requester: &UserId,
        team_id: TeamId,
        usernames: Vec<String>,
    ) -> Result<Vec<InviteReport>, DomainError> {
        if usernames.is_empty() {
            return Err(DomainError::validation(
                "At least one username must be provided in list format.",
            ));
        }

        let team = self.get_team(team_id).await?;

        let mut reports = Vec::with_capacity(usernames.len());
        for username in usernames {
            let outcome = self.invite_one(team.id(), requester, &username).await?;
            reports.push(InviteReport { username, outcome });
        }

        Ok(reports)
    }

    /// Accept or decline a pending invitation
    pub async fn respond_to_invitation(
        &self,
        user: &UserId,
        team_id: TeamId,
        action: InvitationAction,
    ) -> Result<(), DomainError> {
        let membership = self.memberships.get(team_id, user).await?;
        let mut membership = match membership {
            Some(m) if m.is_pending() => m,
            _ => {
                return Err(DomainError::not_found(
                    "No pending invitation found for this team.",
                ))
            }
        };

        match action {
            InvitationAction::Accept => {
                membership.accept();
                self.memberships.update(&membership).await?;
            }
            InvitationAction::Decline => {
                self.memberships.delete(team_id, user).await?;
            }
        }

        Ok(())
    }

    /// Teams the user is an active member of, with their role in each
    pub async fn user_teams(&self, user: &UserId) -> Result<Vec<TeamWithRole>, DomainError> {
        let memberships = self.memberships.list_for_user(user, false).await?;
        let mut teams = Vec::with_capacity(memberships.len());

        for membership in memberships {
            if let Some(team) = self.teams.get(membership.team_id()).await? {
                teams.push(TeamWithRole {
                    team,
                    role: membership.role(),
                });
            }
        }

        Ok(teams)
    }

    /// The user's pending invitations, with inviter usernames resolved
    pub async fn user_invitations(
        &self,
        user: &UserId,
    ) -> Result<Vec<PendingInvitation>, DomainError> {
        let memberships = self.memberships.list_for_user(user, true).await?;
        let mut invitations = Vec::with_capacity(memberships.len());

        for membership in memberships {
            let Some(team) = self.teams.get(membership.team_id()).await? else {
                continue;
            };

            let invited_by = match membership.invited_by() {
                Some(inviter) => self
                    .users
                    .get(inviter)
                    .await?
                    .map(|u| u.username().to_string()),
                None => None,
            };

            invitations.push(PendingInvitation {
                team,
                role: membership.role(),
                invited_by,
            });
        }

        Ok(invitations)
    }

    /// Usernames that can still be invited.
    ///
    /// Excludes the requester, and with a team given, everyone who already
    /// has a membership record in it.
    pub async fn invitable_users(
        &self,
        requester: &UserId,
        team_id: Option<TeamId>,
    ) -> Result<Vec<String>, DomainError> {
        let requester_username = self
            .users
            .get(requester)
            .await?
            .map(|u| u.username().to_string());

        let mut usernames: Vec<String> = self
            .users
            .list_usernames()
            .await?
            .into_iter()
            .filter(|name| Some(name) != requester_username.as_ref())
            .collect();

        if let Some(team_id) = team_id {
            let members = self.memberships.list_for_team(team_id).await?;
            let mut member_names = Vec::with_capacity(members.len());
            for membership in &members {
                if let Some(user) = self.users.get(membership.user_id()).await? {
                    member_names.push(user.username().to_string());
                }
            }
            usernames.retain(|name| !member_names.contains(name));
        }

        Ok(usernames)
    }

    /// Delete a user's account.
    ///
    /// Ownership must be handed over or the teams deleted first, so no team
    /// is ever left without an owner.
    pub async fn delete_account(&self, user: &UserId) -> Result<(), DomainError> {
        let owned = self.memberships.teams_owned_by(user).await?;
        if !owned.is_empty() {
            return Err(DomainError::validation(
                "Please transfer ownership or delete your teams before deleting your account.",
            ));
        }

        // The repository removes the membership rows with the account
        self.users.delete(user).await?;

        tracing::info!(user = %user, "User account deleted");

        Ok(())
    }

    /// Names of the teams the user still owns, for the deletion guard message
    pub async fn owned_team_names(&self, user: &UserId) -> Result<Vec<String>, DomainError> {
        let owned = self.memberships.teams_owned_by(user).await?;
        let mut names = Vec::with_capacity(owned.len());

        for team_id in owned {
            if let Some(team) = self.teams.get(team_id).await? {
                names.push(team.name().to_string());
            }
        }

        Ok(names)
    }

    /// Shared lookup for operations acting on another member: resolves the
    /// team, the requester's active membership and the target's membership
    async fn requester_and_target(
        &self,
        team_id: TeamId,
        requester: &UserId,
        target_username: &str,
    ) -> Result<(Membership, Membership), DomainError> {
        let team = self
            .teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Team could not be found."))?;

        let requester_membership = self.memberships.get(team.id(), requester).await?;
        let requester_membership = match requester_membership {
            Some(m) if m.is_active() => m,
            _ => {
                return Err(DomainError::forbidden(
                    "User is not a member of this team.",
                ))
            }
        };

        let target_user = self.users.get_by_username(target_username).await?;
        let target_membership = match target_user {
            Some(user) => self.memberships.get(team.id(), user.id()).await?,
            None => None,
        };
        let target_membership = target_membership
            .ok_or_else(|| DomainError::not_found("User is not a member of this team."))?;

        Ok((requester_membership, target_membership))
    }

    async fn invite_one(
        &self,
        team_id: TeamId,
        requester: &UserId,
        username: &str,
    ) -> Result<InviteOutcome, DomainError> {
        let invited_user = match self.users.get_by_username(username).await? {
            Some(user) => user,
            None => return Ok(InviteOutcome::UserNotFound),
        };

        let requester_membership = self.memberships.get(team_id, requester).await?;
        let requester_membership = match requester_membership {
            Some(m) if m.is_active() => m,
            _ => return Ok(InviteOutcome::InviterNotMember),
        };

        if policy::authorize_invite(&requester_membership).is_err() {
            return Ok(InviteOutcome::InviterNotPermitted);
        }

        if let Some(existing) = self.memberships.get(team_id, invited_user.id()).await? {
            return Ok(if existing.is_pending() {
                InviteOutcome::AlreadyInvited
            } else {
                InviteOutcome::AlreadyMember
            });
        }

        let invitation =
            Membership::invitation(team_id, invited_user.id().clone(), requester.clone());

        // A concurrent invite can slip in between the check and the insert;
        // the unique (user, team) constraint settles it.
        match self.memberships.create(invitation).await {
            Ok(_) => Ok(InviteOutcome::Invited),
            Err(DomainError::Conflict { .. }) => Ok(InviteOutcome::AlreadyInvited),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::membership::in_memory::InMemoryMembershipRepository;
    use crate::infrastructure::storage::MemoryStore;
    use crate::infrastructure::team::in_memory::InMemoryTeamRepository;
    use crate::infrastructure::user::in_memory::InMemoryUserRepository;

    type Service =
        TeamService<InMemoryTeamRepository, InMemoryMembershipRepository, InMemoryUserRepository>;

    struct Fixture {
        service: Service,
        users: Arc<InMemoryUserRepository>,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let teams = Arc::new(InMemoryTeamRepository::with_store(store.clone()));
            let memberships = Arc::new(InMemoryMembershipRepository::with_store(store.clone()));
            let users = Arc::new(InMemoryUserRepository::with_store(store));
            let service = TeamService::new(teams, memberships.clone(), users.clone());
            Self { service, users }
        }

        async fn user(&self, username: &str) -> UserId {
            let user = User::new(
                UserId::generate(),
                username,
                format!("{}@example.org", username),
                "hash",
            );
            self.users.create(user).await.unwrap().id().clone()
        }

        async fn team_with_owner(&self, owner: &UserId, name: &str) -> TeamId {
            let created = self
                .service
                .create_team(
                    owner,
                    CreateTeamRequest {
                        name: name.to_string(),
                        description: None,
                        invite_usernames: vec![],
                    },
                )
                .await
                .unwrap();
            created.team.id()
        }

        /// Invite a user and accept on their behalf
        async fn join(&self, team: TeamId, inviter: &UserId, username: &str, member: &UserId) {
            self.service
                .invite_users(inviter, team, vec![username.to_string()])
                .await
                .unwrap();
            self.service
                .respond_to_invitation(member, team, InvitationAction::Accept)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_team_makes_creator_owner() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;

        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        let role = fx.service.role_of(&alice, team, None).await.unwrap();
        assert_eq!(role.role(), TeamRole::Owner);
        assert!(role.can_invite());
    }

    #[tokio::test]
    async fn test_create_team_with_invites() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        fx.user("bob").await;

        let created = fx
            .service
            .create_team(
                &alice,
                CreateTeamRequest {
                    name: "SDG Hackers".to_string(),
                    description: Some("Working on goal 13".to_string()),
                    invite_usernames: vec!["bob".to_string(), "ghost".to_string()],
                },
            )
            .await
            .unwrap();

        assert_eq!(created.invitations.len(), 2);
        assert_eq!(created.invitations[0].outcome, InviteOutcome::Invited);
        assert_eq!(created.invitations[1].outcome, InviteOutcome::UserNotFound);
    }

    #[tokio::test]
    async fn test_get_team_not_found() {
        let fx = Fixture::new();
        let result = fx.service.get_team(TeamId::generate()).await;
        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_only_owner_deletes_team() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        let result = fx.service.delete_team(&bob, team).await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));

        fx.service.delete_team(&alice, team).await.unwrap();
        assert!(fx.service.get_team(team).await.is_err());

        // Memberships went with the team
        assert!(fx.service.user_teams(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_members_listing_requires_active_membership() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        // Bob has only a pending invite
        fx.service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();

        let result = fx.service.members(&bob, team).await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));

        // The owner sees both rows, the pending one included
        let members = fx.service.members(&alice, team).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().any(|m| m.membership.is_pending()));
    }

    #[tokio::test]
    async fn test_invite_and_accept() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        let reports = fx
            .service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();
        assert_eq!(reports[0].outcome, InviteOutcome::Invited);

        let invitations = fx.service.user_invitations(&bob).await.unwrap();
        assert_eq!(invitations.len(), 1);
        assert_eq!(invitations[0].invited_by.as_deref(), Some("alice"));

        fx.service
            .respond_to_invitation(&bob, team, InvitationAction::Accept)
            .await
            .unwrap();

        let role = fx.service.role_of(&bob, team, None).await.unwrap();
        assert_eq!(role.role(), TeamRole::Member);
        assert!(fx.service.user_invitations(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decline_then_reinvite() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        fx.service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();
        fx.service
            .respond_to_invitation(&bob, team, InvitationAction::Decline)
            .await
            .unwrap();

        // Declining removed the row, so a fresh invite is possible
        let reports = fx
            .service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();
        assert_eq!(reports[0].outcome, InviteOutcome::Invited);
    }

    #[tokio::test]
    async fn test_duplicate_invite_reported() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        fx.service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();
        let reports = fx
            .service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();
        assert_eq!(reports[0].outcome, InviteOutcome::AlreadyInvited);

        fx.service
            .respond_to_invitation(&bob, team, InvitationAction::Accept)
            .await
            .unwrap();
        let reports = fx
            .service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();
        assert_eq!(reports[0].outcome, InviteOutcome::AlreadyMember);
    }

    #[tokio::test]
    async fn test_member_without_flag_cannot_invite() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        fx.user("carol").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        let reports = fx
            .service
            .invite_users(&bob, team, vec!["carol".to_string()])
            .await
            .unwrap();
        assert_eq!(reports[0].outcome, InviteOutcome::InviterNotPermitted);

        // Grant the flag and retry
        fx.service
            .set_invite_permission(&alice, team, "bob", true)
            .await
            .unwrap();
        let reports = fx
            .service
            .invite_users(&bob, team, vec!["carol".to_string()])
            .await
            .unwrap();
        assert_eq!(reports[0].outcome, InviteOutcome::Invited);
    }

    #[tokio::test]
    async fn test_invite_toggle_noop_rejected() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        // Bob starts without the flag; revoking it again is an error
        let result = fx
            .service
            .set_invite_permission(&alice, team, "bob", false)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));

        fx.service
            .set_invite_permission(&alice, team, "bob", true)
            .await
            .unwrap();
        let result = fx
            .service
            .set_invite_permission(&alice, team, "bob", true)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_invite_toggle_only_for_plain_members() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        fx.service
            .update_role(&alice, team, "bob", TeamRole::Admin)
            .await
            .unwrap();

        let result = fx
            .service
            .set_invite_permission(&alice, team, "bob", true)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_ownership_transfer() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        // Must promote to admin before transferring
        let result = fx
            .service
            .update_role(&alice, team, "bob", TeamRole::Owner)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));

        fx.service
            .update_role(&alice, team, "bob", TeamRole::Admin)
            .await
            .unwrap();
        let outcome = fx
            .service
            .update_role(&alice, team, "bob", TeamRole::Owner)
            .await
            .unwrap();
        assert_eq!(outcome, RoleUpdateOutcome::OwnershipTransferred);

        // Old owner is now admin, new owner can delete the team
        let alice_role = fx.service.role_of(&alice, team, None).await.unwrap();
        assert_eq!(alice_role.role(), TeamRole::Admin);
        fx.service.delete_team(&bob, team).await.unwrap();
    }

    #[tokio::test]
    async fn test_owner_cannot_demote_self() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        for role in [TeamRole::Admin, TeamRole::Member] {
            let result = fx.service.update_role(&alice, team, "alice", role).await;
            assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
        }

        // The team still has its owner
        let role = fx.service.role_of(&alice, team, None).await.unwrap();
        assert_eq!(role.role(), TeamRole::Owner);
    }

    #[tokio::test]
    async fn test_role_noop_rejected() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        let result = fx
            .service
            .update_role(&alice, team, "bob", TeamRole::Member)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_double_promote_rejected() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        fx.service
            .update_role(&alice, team, "bob", TeamRole::Admin)
            .await
            .unwrap();
        let result = fx
            .service
            .update_role(&alice, team, "bob", TeamRole::Admin)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_admin() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let carol = fx.user("carol").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;
        fx.join(team, &alice, "carol", &carol).await;

        fx.service
            .update_role(&alice, team, "bob", TeamRole::Admin)
            .await
            .unwrap();
        fx.service
            .update_role(&alice, team, "carol", TeamRole::Admin)
            .await
            .unwrap();

        let result = fx
            .service
            .update_role(&bob, team, "carol", TeamRole::Member)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_kick_matrix() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let carol = fx.user("carol").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;
        fx.join(team, &alice, "carol", &carol).await;

        fx.service
            .update_role(&alice, team, "bob", TeamRole::Admin)
            .await
            .unwrap();

        // Admin cannot kick the owner
        let result = fx.service.kick(&bob, team, "alice").await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));

        // Member cannot kick anyone
        let result = fx.service.kick(&carol, team, "bob").await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));

        // Admin kicks a member
        fx.service.kick(&bob, team, "carol").await.unwrap();
        assert!(fx.service.role_of(&carol, team, None).await.is_err());
    }

    #[tokio::test]
    async fn test_kick_self_rejected() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        let result = fx.service.kick(&alice, team, "alice").await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_owner_cannot_leave() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        let result = fx.service.leave(&alice, team).await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));

        fx.service.leave(&bob, team).await.unwrap();
        assert!(fx.service.user_teams(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_invitee_cannot_leave() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        fx.service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();

        let result = fx.service.leave(&bob, team).await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_user_teams_excludes_pending() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team_a = fx.team_with_owner(&alice, "Team A").await;
        let _team_b = fx.team_with_owner(&bob, "Team B").await;

        fx.service
            .invite_users(&alice, team_a, vec!["bob".to_string()])
            .await
            .unwrap();

        let teams = fx.service.user_teams(&bob).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team.name(), "Team B");
        assert_eq!(teams[0].role, TeamRole::Owner);
    }

    #[tokio::test]
    async fn test_invitable_users_filters_team_members() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        fx.user("carol").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        // Bob is pending, yet already excluded from the invitable list
        fx.service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();

        let all = fx.service.invitable_users(&alice, None).await.unwrap();
        assert_eq!(all, vec!["bob", "carol"]);

        let filtered = fx
            .service
            .invitable_users(&alice, Some(team))
            .await
            .unwrap();
        assert_eq!(filtered, vec!["carol"]);
        let _ = bob;
    }

    #[tokio::test]
    async fn test_delete_account_blocked_for_owners() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        let result = fx.service.delete_account(&alice).await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
        assert_eq!(
            fx.service.owned_team_names(&alice).await.unwrap(),
            vec!["SDG Hackers"]
        );

        // After transferring ownership, deletion works and memberships go
        fx.service
            .update_role(&alice, team, "bob", TeamRole::Admin)
            .await
            .unwrap();
        fx.service
            .update_role(&alice, team, "bob", TeamRole::Owner)
            .await
            .unwrap();
        fx.service.delete_account(&alice).await.unwrap();

        let members = fx.service.members(&bob, team).await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn test_role_of_other_member() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        let role = fx
            .service
            .role_of(&bob, team, Some("alice"))
            .await
            .unwrap();
        assert_eq!(role.role(), TeamRole::Owner);
    }

    #[tokio::test]
    async fn test_role_of_pending_member_hidden() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        fx.service
            .invite_users(&alice, team, vec!["bob".to_string()])
            .await
            .unwrap();

        let result = fx.service.role_of(&bob, team, None).await;
        assert!(matches!(result.unwrap_err(), DomainError::Forbidden { .. }));
        let _ = bob;
    }

    #[tokio::test]
    async fn test_empty_invite_list_rejected() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;

        let result = fx.service.invite_users(&alice, team, vec![]).await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_respond_without_invitation() {
        let fx = Fixture::new();
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let team = fx.team_with_owner(&alice, "SDG Hackers").await;
        fx.join(team, &alice, "bob", &bob).await;

        // Active members have no pending invitation to respond to
        let result = fx
            .service
            .respond_to_invitation(&bob, team, InvitationAction::Accept)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }
}
