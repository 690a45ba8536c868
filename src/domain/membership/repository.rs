//! Membership repository trait

use async_trait::async_trait;

use super::entity::Membership;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for team membership records
///
/// Implementations enforce the composite uniqueness of (user, team):
/// `create` returns `DomainError::Conflict` when a record for the pair
/// already exists, which is the authoritative guard against concurrent
/// duplicate invitations.
#[async_trait]
pub trait MembershipRepository: Send + Sync + std::fmt::Debug {
    /// Get the membership of a user within a team
    async fn get(&self, team_id: TeamId, user_id: &UserId)
        -> Result<Option<Membership>, DomainError>;

    /// List all memberships of a team, pending invitations included
    async fn list_for_team(&self, team_id: TeamId) -> Result<Vec<Membership>, DomainError>;

    /// List a user's memberships, filtered by pending state
    async fn list_for_user(
        &self,
        user_id: &UserId,
        pending: bool,
    ) -> Result<Vec<Membership>, DomainError>;

    /// Insert a new membership; `Conflict` if the (user, team) pair exists
    async fn create(&self, membership: Membership) -> Result<Membership, DomainError>;

    /// Persist changes to an existing membership
    async fn update(&self, membership: &Membership) -> Result<(), DomainError>;

    /// Remove a membership, returning whether a row was removed
    async fn delete(&self, team_id: TeamId, user_id: &UserId) -> Result<bool, DomainError>;

    /// Swap ownership atomically: `from` becomes admin, `to` becomes owner.
    ///
    /// Both memberships must exist; either both rows change or neither does,
    /// so no interleaving can observe a team with zero or two owners.
    async fn transfer_ownership(
        &self,
        team_id: TeamId,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), DomainError>;

    /// Teams in which the user holds the owner role with an active membership
    async fn teams_owned_by(&self, user_id: &UserId) -> Result<Vec<TeamId>, DomainError>;
}
