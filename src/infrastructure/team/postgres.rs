//! PostgreSQL team repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::membership::Membership;
use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::membership::postgres::role_to_str;

/// PostgreSQL implementation of TeamRepository
///
/// Creation inserts the team and its founder membership in one
/// transaction. Membership rows reference teams with ON DELETE CASCADE,
/// so deleting a team removes its memberships in the same statement.
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get team: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_team(&row))),
            None => Ok(None),
        }
    }

    async fn create(&self, team: Team, founder: Membership) -> Result<Team, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO teams (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(team.id().as_uuid())
        .bind(team.name())
        .bind(team.description())
        .bind(team.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Team with ID '{}' already exists", team.id()))
            } else {
                DomainError::storage(format!("Failed to create team: {}", e))
            }
        })?;

        // Dropping tx on any failure below rolls the team row back
        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role, is_pending, invited_by, can_invite, joined_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(founder.team_id().as_uuid())
        .bind(founder.user_id().as_str())
        .bind(role_to_str(founder.role()))
        .bind(founder.is_pending())
        .bind(founder.invited_by().map(|u| u.as_str()))
        .bind(founder.can_invite())
        .bind(founder.joined_on())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create founder membership: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit team creation: {}", e)))?;

        Ok(team)
    }

    async fn delete(&self, id: TeamId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete team: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_team(row: &sqlx::postgres::PgRow) -> Team {
    let id: uuid::Uuid = row.get("id");
    let name: String = row.get("name");
    let description: Option<String> = row.get("description");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    Team::from_parts(TeamId::from(id), name, description, created_at)
}
