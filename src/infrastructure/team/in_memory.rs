//! In-memory team repository
//!
//! Useful for testing and development. Data is lost when the process
//! terminates. Backed by the shared [`MemoryStore`], so team creation
//! writes the founder membership under the same lock and deletion takes
//! the team's membership rows with it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::membership::Membership;
use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::MemoryStore;

#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the repository on a store shared with the other repositories
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        let tables = self.store.read()?;
        Ok(tables.teams.get(&id).cloned())
    }

    async fn create(&self, team: Team, founder: Membership) -> Result<Team, DomainError> {
        let mut tables = self.store.write()?;

        if tables.teams.contains_key(&team.id()) {
            return Err(DomainError::conflict(format!(
                "Team with ID '{}' already exists",
                team.id()
            )));
        }

        // Both rows go in under the one write lock; no caller can observe
        // the team without its owner.
        tables.teams.insert(team.id(), team.clone());
        tables
            .memberships
            .insert((founder.team_id(), founder.user_id().clone()), founder);

        Ok(team)
    }

    async fn delete(&self, id: TeamId) -> Result<bool, DomainError> {
        let mut tables = self.store.write()?;

        let removed = tables.teams.remove(&id).is_some();
        if removed {
            tables.memberships.retain(|(team, _), _| *team != id);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::membership::{MembershipRepository, TeamRole};
    use crate::domain::user::UserId;
    use crate::infrastructure::membership::InMemoryMembershipRepository;

    fn team(name: &str) -> Team {
        Team::new(name.to_string()).unwrap()
    }

    fn founder_for(team: &Team) -> (UserId, Membership) {
        let owner = UserId::generate();
        (owner.clone(), Membership::founder(team.id(), owner))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryTeamRepository::new();
        let t = team("Climate Action Crew");
        let (_, founder) = founder_for(&t);
        let t = repo.create(t, founder).await.unwrap();

        let found = repo.get(t.id()).await.unwrap();
        assert_eq!(found.unwrap().name(), "Climate Action Crew");
    }

    #[tokio::test]
    async fn test_create_writes_founder_row() {
        let store = Arc::new(MemoryStore::new());
        let repo = InMemoryTeamRepository::with_store(store.clone());
        let memberships = InMemoryMembershipRepository::with_store(store);

        let t = team("Ocean Cleanup");
        let (owner, founder) = founder_for(&t);
        let t = repo.create(t, founder).await.unwrap();

        let row = memberships.get(t.id(), &owner).await.unwrap().unwrap();
        assert_eq!(row.role(), TeamRole::Owner);
        assert!(!row.is_pending());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let repo = InMemoryTeamRepository::new();
        let found = repo.get(TeamId::generate()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_memberships() {
        let store = Arc::new(MemoryStore::new());
        let repo = InMemoryTeamRepository::with_store(store.clone());
        let memberships = InMemoryMembershipRepository::with_store(store);

        let t = team("Ocean Cleanup");
        let (owner, founder) = founder_for(&t);
        let t = repo.create(t, founder).await.unwrap();

        let other = team("Solar Builders");
        let (_, other_founder) = founder_for(&other);
        let other = repo.create(other, other_founder).await.unwrap();

        let invitee = UserId::generate();
        memberships
            .create(Membership::invitation(t.id(), invitee.clone(), owner.clone()))
            .await
            .unwrap();

        assert!(repo.delete(t.id()).await.unwrap());
        assert!(!repo.delete(t.id()).await.unwrap());
        assert!(!repo.exists(t.id()).await.unwrap());

        // The deleted team's rows are gone, the other team's survive
        assert!(memberships.get(t.id(), &owner).await.unwrap().is_none());
        assert!(memberships.get(t.id(), &invitee).await.unwrap().is_none());
        assert_eq!(memberships.list_for_team(other.id()).await.unwrap().len(), 1);
    }
}
