//! In-memory user repository

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::MemoryStore;

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the repository on a store shared with the other repositories
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let tables = self.store.read()?;
        Ok(tables.users.get(id.as_str()).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.store.read()?;
        Ok(tables
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.store.write()?;

        if tables.users.contains_key(user.id().as_str()) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if tables.users.values().any(|u| u.username() == user.username()) {
            return Err(DomainError::conflict(format!(
                "Username '{}' is already taken",
                user.username()
            )));
        }

        tables
            .users
            .insert(user.id().as_str().to_string(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.store.write()?;

        if !tables.users.contains_key(user.id().as_str()) {
            return Err(DomainError::not_found(format!(
                "User with ID '{}' not found",
                user.id()
            )));
        }

        tables
            .users
            .insert(user.id().as_str().to_string(), user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut tables = self.store.write()?;

        let removed = tables.users.remove(id.as_str()).is_some();
        if removed {
            tables.memberships.retain(|(_, user), _| user != id);
        }

        Ok(removed)
    }

    async fn list_usernames(&self) -> Result<Vec<String>, DomainError> {
        let tables = self.store.read()?;

        let mut usernames: Vec<String> = tables
            .users
            .values()
            .map(|u| u.username().to_string())
            .collect();
        usernames.sort();
        Ok(usernames)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let tables = self.store.read()?;
        Ok(tables.users.len())
    }
}
