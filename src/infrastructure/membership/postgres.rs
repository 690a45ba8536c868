//! PostgreSQL membership repository implementation
//!
//! The UNIQUE (user_id, team_id) constraint is the source of truth for
//! duplicate invitations under concurrency, and the ownership transfer
//! runs both role updates inside a single transaction.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::membership::{Membership, MembershipRepository, TeamRole};
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of MembershipRepository
#[derive(Debug, Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn get(
        &self,
        team_id: TeamId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT team_id, user_id, role, is_pending, invited_by, can_invite, joined_on
            FROM team_members
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id.as_uuid())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get membership: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_membership(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_for_team(&self, team_id: TeamId) -> Result<Vec<Membership>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT team_id, user_id, role, is_pending, invited_by, can_invite, joined_on
            FROM team_members
            WHERE team_id = $1
            ORDER BY joined_on
            "#,
        )
        .bind(team_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list team memberships: {}", e)))?;

        let mut memberships = Vec::with_capacity(rows.len());

        for row in rows {
            memberships.push(row_to_membership(&row)?);
        }

        Ok(memberships)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        pending: bool,
    ) -> Result<Vec<Membership>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT team_id, user_id, role, is_pending, invited_by, can_invite, joined_on
            FROM team_members
            WHERE user_id = $1 AND is_pending = $2
            ORDER BY joined_on
            "#,
        )
        .bind(user_id.as_str())
        .bind(pending)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list user memberships: {}", e)))?;

        let mut memberships = Vec::with_capacity(rows.len());

        for row in rows {
            memberships.push(row_to_membership(&row)?);
        }

        Ok(memberships)
    }

    async fn create(&self, membership: Membership) -> Result<Membership, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role, is_pending, invited_by, can_invite, joined_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(membership.team_id().as_uuid())
        .bind(membership.user_id().as_str())
        .bind(role_to_str(membership.role()))
        .bind(membership.is_pending())
        .bind(membership.invited_by().map(|u| u.as_str()))
        .bind(membership.can_invite())
        .bind(membership.joined_on())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "User '{}' already has a membership in team '{}'",
                    membership.user_id(),
                    membership.team_id()
                ))
            } else {
                DomainError::storage(format!("Failed to create membership: {}", e))
            }
        })?;

        Ok(membership)
    }

    async fn update(&self, membership: &Membership) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE team_members
            SET role = $3, is_pending = $4, can_invite = $5
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(membership.team_id().as_uuid())
        .bind(membership.user_id().as_str())
        .bind(role_to_str(membership.role()))
        .bind(membership.is_pending())
        .bind(membership.can_invite())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update membership: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "No membership for user '{}' in team '{}'",
                membership.user_id(),
                membership.team_id()
            )));
        }

        Ok(())
    }

    async fn delete(&self, team_id: TeamId, user_id: &UserId) -> Result<bool, DomainError> {
        let result =
            sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
                .bind(team_id.as_uuid())
                .bind(user_id.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to delete membership: {}", e))
                })?;

        Ok(result.rows_affected() > 0)
    }

    async fn transfer_ownership(
        &self,
        team_id: TeamId,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let demoted = sqlx::query(
            "UPDATE team_members SET role = 'admin' WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id.as_uuid())
        .bind(from.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to demote owner: {}", e)))?;

        if demoted.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "No membership for user '{}' in team '{}'",
                from, team_id
            )));
        }

        let promoted = sqlx::query(
            "UPDATE team_members SET role = 'owner' WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id.as_uuid())
        .bind(to.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to promote admin: {}", e)))?;

        if promoted.rows_affected() == 0 {
            // Dropping tx rolls back the demotion
            return Err(DomainError::not_found(format!(
                "No membership for user '{}' in team '{}'",
                to, team_id
            )));
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transfer: {}", e)))?;

        Ok(())
    }

    async fn teams_owned_by(&self, user_id: &UserId) -> Result<Vec<TeamId>, DomainError> {
        let ids: Vec<uuid::Uuid> = sqlx::query_scalar(
            r#"
            SELECT team_id
            FROM team_members
            WHERE user_id = $1 AND role = 'owner' AND is_pending = FALSE
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list owned teams: {}", e)))?;

        Ok(ids.into_iter().map(TeamId::from).collect())
    }
}

fn row_to_membership(row: &sqlx::postgres::PgRow) -> Result<Membership, DomainError> {
    let team_id: uuid::Uuid = row.get("team_id");
    let user_id: String = row.get("user_id");
    let role: String = row.get("role");
    let is_pending: bool = row.get("is_pending");
    let invited_by: Option<String> = row.get("invited_by");
    let can_invite: bool = row.get("can_invite");
    let joined_on: chrono::DateTime<chrono::Utc> = row.get("joined_on");

    let user_id = UserId::new(&user_id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let invited_by = invited_by
        .map(|id| {
            UserId::new(&id).map_err(|e| {
                DomainError::storage(format!("Invalid inviter ID in database: {}", e))
            })
        })
        .transpose()?;

    Ok(Membership::from_parts(
        TeamId::from(team_id),
        user_id,
        str_to_role(&role),
        is_pending,
        invited_by,
        can_invite,
        joined_on,
    ))
}

pub(crate) fn role_to_str(role: TeamRole) -> &'static str {
    match role {
        TeamRole::Owner => "owner",
        TeamRole::Admin => "admin",
        TeamRole::Member => "member",
    }
}

fn str_to_role(s: &str) -> TeamRole {
    match s {
        "owner" => TeamRole::Owner,
        "admin" => TeamRole::Admin,
        _ => TeamRole::Member,
    }
}
