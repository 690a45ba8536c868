//! In-memory membership repository
//!
//! Backed by the shared [`MemoryStore`]; the store's single `RwLock`
//! makes multi-row operations such as the ownership transfer atomic
//! with respect to every other call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::membership::{Membership, MembershipRepository, TeamRole};
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::MemoryStore;

#[derive(Debug, Default)]
pub struct InMemoryMembershipRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the repository on a store shared with the other repositories
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn get(
        &self,
        team_id: TeamId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, DomainError> {
        let tables = self.store.read()?;
        Ok(tables.memberships.get(&(team_id, user_id.clone())).cloned())
    }

    async fn list_for_team(&self, team_id: TeamId) -> Result<Vec<Membership>, DomainError> {
        let tables = self.store.read()?;

        let mut rows: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|m| m.team_id() == team_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.joined_on());
        Ok(rows)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        pending: bool,
    ) -> Result<Vec<Membership>, DomainError> {
        let tables = self.store.read()?;

        let mut rows: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|m| m.user_id() == user_id && m.is_pending() == pending)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.joined_on());
        Ok(rows)
    }

    async fn create(&self, membership: Membership) -> Result<Membership, DomainError> {
        let key = (membership.team_id(), membership.user_id().clone());
        let mut tables = self.store.write()?;

        if tables.memberships.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "User '{}' already has a membership in team '{}'",
                key.1, key.0
            )));
        }

        tables.memberships.insert(key, membership.clone());
        Ok(membership)
    }

    async fn update(&self, membership: &Membership) -> Result<(), DomainError> {
        let key = (membership.team_id(), membership.user_id().clone());
        let mut tables = self.store.write()?;

        if !tables.memberships.contains_key(&key) {
            return Err(DomainError::not_found(format!(
                "No membership for user '{}' in team '{}'",
                key.1, key.0
            )));
        }

        tables.memberships.insert(key, membership.clone());
        Ok(())
    }

    async fn delete(&self, team_id: TeamId, user_id: &UserId) -> Result<bool, DomainError> {
        let mut tables = self.store.write()?;
        Ok(tables
            .memberships
            .remove(&(team_id, user_id.clone()))
            .is_some())
    }

    async fn transfer_ownership(
        &self,
        team_id: TeamId,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), DomainError> {
        let mut tables = self.store.write()?;

        let from_key = (team_id, from.clone());
        let to_key = (team_id, to.clone());

        // Both rows checked before either changes; the write lock is held
        // for the whole swap.
        if !tables.memberships.contains_key(&from_key) {
            return Err(DomainError::not_found(format!(
                "No membership for user '{}' in team '{}'",
                from, team_id
            )));
        }
        if !tables.memberships.contains_key(&to_key) {
            return Err(DomainError::not_found(format!(
                "No membership for user '{}' in team '{}'",
                to, team_id
            )));
        }

        if let Some(m) = tables.memberships.get_mut(&from_key) {
            m.set_role(TeamRole::Admin);
        }
        if let Some(m) = tables.memberships.get_mut(&to_key) {
            m.set_role(TeamRole::Owner);
        }

        Ok(())
    }

    async fn teams_owned_by(&self, user_id: &UserId) -> Result<Vec<TeamId>, DomainError> {
        let tables = self.store.read()?;

        Ok(tables
            .memberships
            .values()
            .filter(|m| m.user_id() == user_id && m.role() == TeamRole::Owner && m.is_active())
            .map(|m| m.team_id())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (TeamId, UserId, UserId) {
        (TeamId::generate(), UserId::generate(), UserId::generate())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryMembershipRepository::new();
        let (team, user, _) = ids();

        repo.create(Membership::founder(team, user.clone()))
            .await
            .unwrap();

        let found = repo.get(team, &user).await.unwrap().unwrap();
        assert_eq!(found.role(), TeamRole::Owner);
    }

    #[tokio::test]
    async fn test_duplicate_pair_conflicts() {
        let repo = InMemoryMembershipRepository::new();
        let (team, user, inviter) = ids();

        repo.create(Membership::founder(team, inviter.clone()))
            .await
            .unwrap();
        repo.create(Membership::invitation(team, user.clone(), inviter.clone()))
            .await
            .unwrap();

        let result = repo
            .create(Membership::invitation(team, user, inviter))
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_same_user_two_teams_allowed() {
        let repo = InMemoryMembershipRepository::new();
        let user = UserId::generate();

        repo.create(Membership::founder(TeamId::generate(), user.clone()))
            .await
            .unwrap();
        repo.create(Membership::founder(TeamId::generate(), user.clone()))
            .await
            .unwrap();

        assert_eq!(repo.teams_owned_by(&user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_for_user_splits_pending() {
        let repo = InMemoryMembershipRepository::new();
        let user = UserId::generate();
        let inviter = UserId::generate();

        repo.create(Membership::founder(TeamId::generate(), user.clone()))
            .await
            .unwrap();
        repo.create(Membership::invitation(
            TeamId::generate(),
            user.clone(),
            inviter,
        ))
        .await
        .unwrap();

        assert_eq!(repo.list_for_user(&user, false).await.unwrap().len(), 1);
        assert_eq!(repo.list_for_user(&user, true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_ownership_swaps_roles() {
        let repo = InMemoryMembershipRepository::new();
        let (team, owner, admin) = ids();

        repo.create(Membership::founder(team, owner.clone()))
            .await
            .unwrap();
        let mut m = Membership::invitation(team, admin.clone(), owner.clone());
        m.accept();
        m.set_role(TeamRole::Admin);
        repo.create(m).await.unwrap();

        repo.transfer_ownership(team, &owner, &admin).await.unwrap();

        assert_eq!(
            repo.get(team, &owner).await.unwrap().unwrap().role(),
            TeamRole::Admin
        );
        assert_eq!(
            repo.get(team, &admin).await.unwrap().unwrap().role(),
            TeamRole::Owner
        );

        // Exactly one owner after the swap
        let owners = repo
            .list_for_team(team)
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.role() == TeamRole::Owner)
            .count();
        assert_eq!(owners, 1);
    }

    #[tokio::test]
    async fn test_transfer_missing_target_changes_nothing() {
        let repo = InMemoryMembershipRepository::new();
        let (team, owner, ghost) = ids();

        repo.create(Membership::founder(team, owner.clone()))
            .await
            .unwrap();

        let result = repo.transfer_ownership(team, &owner, &ghost).await;
        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));

        // Owner row untouched
        assert_eq!(
            repo.get(team, &owner).await.unwrap().unwrap().role(),
            TeamRole::Owner
        );
    }
}
