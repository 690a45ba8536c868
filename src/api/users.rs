//! Self-scoped user endpoints
//!
//! The caller's teams, pending invitations, and account deletion.

use axum::{
    extract::State,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::teams::MessageResponse;
use crate::api::types::{ApiError, Json};
use crate::domain::membership::TeamRole;
use crate::domain::team::{Team, TeamId};
use crate::infrastructure::team::InvitationAction;

/// Create the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", delete(delete_account))
        .route("/me/teams", get(my_teams))
        .route("/me/invitations", get(my_invitations))
        .route("/me/invitations/respond", post(respond_to_invitation))
}

/// A team joined with the caller's role
#[derive(Debug, Serialize)]
pub struct TeamWithRoleResponse {
    #[serde(flatten)]
    pub team: Team,
    pub role: TeamRole,
}

#[derive(Debug, Serialize)]
pub struct MyTeamsResponse {
    pub teams: Vec<TeamWithRoleResponse>,
}

/// A pending invitation joined with team and inviter details
#[derive(Debug, Serialize)]
pub struct PendingInvitationResponse {
    #[serde(flatten)]
    pub team: Team,
    pub role: TeamRole,
    pub invited_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MyInvitationsResponse {
    pub pending_invitations: Vec<PendingInvitationResponse>,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub team_id: String,
    pub action: String,
}

/// List the caller's active teams with their role in each
///
/// GET /users/me/teams
pub async fn my_teams(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<MyTeamsResponse>, ApiError> {
    let teams = state
        .team_service
        .user_teams(user.id())
        .await?
        .into_iter()
        .map(|t| TeamWithRoleResponse {
            team: t.team,
            role: t.role,
        })
        .collect();

    Ok(Json(MyTeamsResponse { teams }))
}

/// List the caller's pending invitations
///
/// GET /users/me/invitations
pub async fn my_invitations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<MyInvitationsResponse>, ApiError> {
    let pending_invitations = state
        .team_service
        .user_invitations(user.id())
        .await?
        .into_iter()
        .map(|i| PendingInvitationResponse {
            team: i.team,
            role: i.role,
            invited_by: i.invited_by,
        })
        .collect();

    Ok(Json(MyInvitationsResponse { pending_invitations }))
}

/// Accept or decline a pending invitation
///
/// POST /users/me/invitations/respond
pub async fn respond_to_invitation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<RespondBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let team_id = TeamId::parse(&body.team_id)
        .map_err(|_| ApiError::bad_request("Invalid team id").with_param("team_id"))?;

    let action = match body.action.as_str() {
        "accept" => InvitationAction::Accept,
        "decline" => InvitationAction::Decline,
        _ => {
            return Err(
                ApiError::bad_request("Action must be either accept or decline.")
                    .with_param("action"),
            )
        }
    };

    state
        .team_service
        .respond_to_invitation(user.id(), team_id, action)
        .await?;

    let message = match action {
        InvitationAction::Accept => "You have joined the team.",
        InvitationAction::Decline => "Invitation declined.",
    };

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// Delete the caller's account
///
/// DELETE /users/me
///
/// Blocked while the caller still owns teams; the error names them.
pub async fn delete_account(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.team_service.delete_account(user.id()).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: "User account has been deleted".to_string(),
        })),
        Err(e) => {
            let owned = state
                .team_service
                .owned_team_names(user.id())
                .await
                .unwrap_or_default();
            if owned.is_empty() {
                Err(ApiError::from(e))
            } else {
                // Name the teams blocking deletion so the caller knows
                // what to transfer or delete first
                Err(ApiError::forbidden(format!(
                    "Please transfer ownership or delete your teams before deleting your account. Owned teams: {}.",
                    owned.join(", ")
                ))
                .with_param("owned_teams"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_with_role_flattens_team_fields() {
        let team = Team::new("Ocean Cleanup").unwrap();
        let json = serde_json::to_value(TeamWithRoleResponse {
            team,
            role: TeamRole::Admin,
        })
        .unwrap();

        assert_eq!(json["name"], "Ocean Cleanup");
        assert_eq!(json["role"], "admin");
        assert!(json.get("team").is_none());
    }

    #[test]
    fn test_pending_invitation_carries_inviter() {
        let team = Team::new("Solar Co-op").unwrap();
        let json = serde_json::to_value(PendingInvitationResponse {
            team,
            role: TeamRole::Member,
            invited_by: Some("ada".to_string()),
        })
        .unwrap();

        assert_eq!(json["invited_by"], "ada");
        assert_eq!(json["role"], "member");
    }
}
