//! Application state for shared services

use std::sync::Arc;

use crate::domain::membership::{Membership, MembershipRepository, TeamRole};
use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::team::{
    CreateTeamRequest, CreatedTeam, InvitationAction, InviteReport, MemberRecord,
    PendingInvitation, RoleUpdateOutcome, TeamService, TeamWithRole,
};
use crate::infrastructure::user::{PasswordHasher, RegisterRequest, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub team_service: Arc<dyn TeamServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
}

/// Trait for team and membership operations
#[async_trait::async_trait]
pub trait TeamServiceTrait: Send + Sync {
    async fn create_team(
        &self,
        creator: &UserId,
        request: CreateTeamRequest,
    ) -> Result<CreatedTeam, DomainError>;
    async fn get_team(&self, team_id: TeamId) -> Result<Team, DomainError>;
    async fn delete_team(&self, requester: &UserId, team_id: TeamId) -> Result<(), DomainError>;
    async fn members(
        &self,
        requester: &UserId,
        team_id: TeamId,
    ) -> Result<Vec<MemberRecord>, DomainError>;
    async fn role_of(
        &self,
        requester: &UserId,
        team_id: TeamId,
        username: Option<&str>,
    ) -> Result<Membership, DomainError>;
    async fn update_role(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
        new_role: TeamRole,
    ) -> Result<RoleUpdateOutcome, DomainError>;
    async fn kick(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
    ) -> Result<(), DomainError>;
    async fn leave(&self, requester: &UserId, team_id: TeamId) -> Result<(), DomainError>;
    async fn set_invite_permission(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
        can_invite: bool,
    ) -> Result<(), DomainError>;
    async fn invite_users(
        &self,
        requester: &UserId,
        team_id: TeamId,
        usernames: Vec<String>,
    ) -> Result<Vec<InviteReport>, DomainError>;
    async fn respond_to_invitation(
        &self,
        user: &UserId,
        team_id: TeamId,
        action: InvitationAction,
    ) -> Result<(), DomainError>;
    async fn user_teams(&self, user: &UserId) -> Result<Vec<TeamWithRole>, DomainError>;
    async fn user_invitations(&self, user: &UserId)
        -> Result<Vec<PendingInvitation>, DomainError>;
    async fn invitable_users(
        &self,
        requester: &UserId,
        team_id: Option<TeamId>,
    ) -> Result<Vec<String>, DomainError>;
    async fn delete_account(&self, user: &UserId) -> Result<(), DomainError>;
    async fn owned_team_names(&self, user: &UserId) -> Result<Vec<String>, DomainError>;
}

/// Trait for user directory operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<User, DomainError>;
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;
    async fn list_usernames(&self) -> Result<Vec<String>, DomainError>;
}

#[async_trait::async_trait]
impl<T, M, U> TeamServiceTrait for TeamService<T, M, U>
where
    T: TeamRepository + 'static,
    M: MembershipRepository + 'static,
    U: UserRepository + 'static,
{
    async fn create_team(
        &self,
        creator: &UserId,
        request: CreateTeamRequest,
    ) -> Result<CreatedTeam, DomainError> {
        TeamService::create_team(self, creator, request).await
    }

    async fn get_team(&self, team_id: TeamId) -> Result<Team, DomainError> {
        TeamService::get_team(self, team_id).await
    }

    async fn delete_team(&self, requester: &UserId, team_id: TeamId) -> Result<(), DomainError> {
        TeamService::delete_team(self, requester, team_id).await
    }

    async fn members(
        &self,
        requester: &UserId,
        team_id: TeamId,
    ) -> Result<Vec<MemberRecord>, DomainError> {
        TeamService::members(self, requester, team_id).await
    }

    async fn role_of(
        &self,
        requester: &UserId,
        team_id: TeamId,
        username: Option<&str>,
    ) -> Result<Membership, DomainError> {
        TeamService::role_of(self, requester, team_id, username).await
    }

    async fn update_role(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
        new_role: TeamRole,
    ) -> Result<RoleUpdateOutcome, DomainError> {
        TeamService::update_role(self, requester, team_id, target_username, new_role).await
    }

    async fn kick(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
    ) -> Result<(), DomainError> {
        TeamService::kick(self, requester, team_id, target_username).await
    }

    async fn leave(&self, requester: &UserId, team_id: TeamId) -> Result<(), DomainError> {
        TeamService::leave(self, requester, team_id).await
    }

    async fn set_invite_permission(
        &self,
        requester: &UserId,
        team_id: TeamId,
        target_username: &str,
        can_invite: bool,
    ) -> Result<(), DomainError> {
        TeamService::set_invite_permission(self, requester, team_id, target_username, can_invite)
            .await
    }

    async fn invite_users(
        &self,
        requester: &UserId,
        team_id: TeamId,
        usernames: Vec<String>,
    ) -> Result<Vec<InviteReport>, DomainError> {
        TeamService::invite_users(self, requester, team_id, usernames).await
    }

    async fn respond_to_invitation(
        &self,
        user: &UserId,
        team_id: TeamId,
        action: InvitationAction,
    ) -> Result<(), DomainError> {
        TeamService::respond_to_invitation(self, user, team_id, action).await
    }

    async fn user_teams(&self, user: &UserId) -> Result<Vec<TeamWithRole>, DomainError> {
        TeamService::user_teams(self, user).await
    }

    async fn user_invitations(
        &self,
        user: &UserId,
    ) -> Result<Vec<PendingInvitation>, DomainError> {
        TeamService::user_invitations(self, user).await
    }

    async fn invitable_users(
        &self,
        requester: &UserId,
        team_id: Option<TeamId>,
    ) -> Result<Vec<String>, DomainError> {
        TeamService::invitable_users(self, requester, team_id).await
    }

    async fn delete_account(&self, user: &UserId) -> Result<(), DomainError> {
        TeamService::delete_account(self, user).await
    }

    async fn owned_team_names(&self, user: &UserId) -> Result<Vec<String>, DomainError> {
        TeamService::owned_team_names(self, user).await
    }
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        UserService::register(self, request).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn list_usernames(&self) -> Result<Vec<String>, DomainError> {
        UserService::list_usernames(self).await
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        team_service: Arc<dyn TeamServiceTrait>,
        user_service: Arc<dyn UserServiceTrait>,
        jwt_service: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self {
            team_service,
            user_service,
            jwt_service,
        }
    }
}
