//! Team repository trait

use async_trait::async_trait;

use super::entity::{Team, TeamId};
use crate::domain::membership::Membership;
use crate::domain::DomainError;

/// Repository for the team registry
///
/// A team never exists without an owner, so creation takes the founding
/// membership along with the team and persists both as one atomic unit,
/// and deletion removes the team's membership rows with it.
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Get a team by ID
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError>;

    /// Create a team together with its founding owner membership; neither
    /// is persisted if the other cannot be
    async fn create(&self, team: Team, founder: Membership) -> Result<Team, DomainError>;

    /// Delete a team and its memberships, returning whether a team row
    /// was removed
    async fn delete(&self, id: TeamId) -> Result<bool, DomainError>;

    /// Check if a team exists
    async fn exists(&self, id: TeamId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}
