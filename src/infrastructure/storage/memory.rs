//! Shared in-memory store backing the development repositories
//!
//! All tables live behind one `RwLock`, so multi-row operations such as
//! team creation with its founder row and the cascading deletes happen
//! atomically with respect to every other call, mirroring what the
//! PostgreSQL backend gets from transactions and foreign keys.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::membership::Membership;
use crate::domain::team::{Team, TeamId};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

pub(crate) type MembershipKey = (TeamId, UserId);

/// The tables of the store, guarded together
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: HashMap<String, User>,
    pub teams: HashMap<TeamId, Team>,
    pub memberships: HashMap<MembershipKey, Membership>,
}

/// In-memory storage shared by the user, team and membership repositories
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DomainError> {
        self.tables
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DomainError> {
        self.tables
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}
