//! SDG Platform API
//!
//! Backend for a sustainable-development action platform. Users register,
//! form teams around initiatives, invite one another and manage membership
//! through an owner/admin/member role hierarchy.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use api::state::AppState;
use config::StorageBackend;
use infrastructure::auth::{JwtConfig, JwtService};
use infrastructure::membership::{InMemoryMembershipRepository, PostgresMembershipRepository};
use infrastructure::storage::{run_storage_migrations, MemoryStore};
use infrastructure::team::{InMemoryTeamRepository, PostgresTeamRepository, TeamService};
use infrastructure::user::{Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService};

/// Create application state with in-memory defaults
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create application state from configuration, wiring the selected
/// storage backend into the services
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    )));
    let hasher = Arc::new(Argon2Hasher::new());

    match config.storage.backend {
        StorageBackend::Memory => {
            // One store behind all three repositories, so cross-table
            // operations stay atomic
            let store = Arc::new(MemoryStore::new());
            let users = Arc::new(InMemoryUserRepository::with_store(store.clone()));
            let teams = Arc::new(InMemoryTeamRepository::with_store(store.clone()));
            let memberships = Arc::new(InMemoryMembershipRepository::with_store(store));

            let user_service = Arc::new(UserService::new(users.clone(), hasher));
            let team_service = Arc::new(TeamService::new(teams, memberships, users));

            Ok(AppState::new(team_service, user_service, jwt_service))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .storage
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for the postgres backend"))?;

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;

            run_storage_migrations(&pool).await?;

            let users = Arc::new(PostgresUserRepository::new(pool.clone()));
            let teams = Arc::new(PostgresTeamRepository::new(pool.clone()));
            let memberships = Arc::new(PostgresMembershipRepository::new(pool));

            let user_service = Arc::new(UserService::new(users.clone(), hasher));
            let team_service = Arc::new(TeamService::new(teams, memberships, users));

            Ok(AppState::new(team_service, user_service, jwt_service))
        }
    }
}
