//! Team and membership API endpoints
//!
//! Team lifecycle, member listings, role management, invitations and the
//! member-level invite permission toggle.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::membership::{Membership, TeamRole};
use crate::domain::team::{Team, TeamId};
use crate::domain::user::User;
use crate::infrastructure::team::{
    CreateTeamRequest, InviteOutcome, InviteReport, RoleUpdateOutcome,
};

/// Create the teams router
pub fn create_teams_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_team))
        .route("/users", get(invitable_users))
        .route("/{id}", get(get_team).delete(delete_team))
        .route("/{id}/members", get(list_members))
        .route("/{id}/role", post(get_role))
        .route("/{id}/update-role", post(update_role))
        .route("/{id}/kick", post(kick_member))
        .route("/{id}/leave", post(leave_team))
        .route("/{id}/invite-permissions", post(set_invite_permission))
        .route("/{id}/invite", post(invite_users))
}

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Team create request
#[derive(Debug, Deserialize)]
pub struct CreateTeamBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub invite_usernames: Vec<String>,
}

/// Response for team creation
#[derive(Debug, Serialize)]
pub struct CreateTeamResponse {
    pub team: Team,
    pub message: String,
    pub invitations: Vec<InvitationResult>,
}

/// Per-username invitation result, either a success or an error message
#[derive(Debug, Serialize)]
pub struct InvitationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvitationResult {
    fn from_report(report: &InviteReport) -> Self {
        let username = &report.username;
        match report.outcome {
            InviteOutcome::Invited => Self {
                success: Some(format!("User '{username}' has been invited.")),
                error: None,
            },
            InviteOutcome::UserNotFound => Self {
                success: None,
                error: Some(format!("User '{username}' not found.")),
            },
            InviteOutcome::AlreadyInvited => Self {
                success: None,
                error: Some(format!("User '{username}' has already been invited.")),
            },
            InviteOutcome::AlreadyMember => Self {
                success: None,
                error: Some(format!("User '{username}' is already a member of the team.")),
            },
            InviteOutcome::InviterNotMember => Self {
                success: None,
                error: Some("Inviter is not a member of this team.".to_string()),
            },
            InviteOutcome::InviterNotPermitted => Self {
                success: None,
                error: Some(
                    "Inviter does not have permission to invite users to this team.".to_string(),
                ),
            },
        }
    }
}

/// User details embedded in a member listing entry
#[derive(Debug, Serialize)]
pub struct MemberUserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
}

/// Membership row joined with its user record, for member listings
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user: MemberUserResponse,
    pub role: TeamRole,
    pub is_pending: bool,
    pub can_invite: bool,
    pub joined_on: String,
}

impl MemberResponse {
    fn new(user: Option<User>, membership: &Membership) -> Self {
        // A vanished directory row still renders an entry, keyed by the
        // user ID stored on the membership
        let user = match user {
            Some(u) => MemberUserResponse {
                id: u.id().to_string(),
                username: u.username().to_string(),
                email: Some(u.email().to_string()),
            },
            None => MemberUserResponse {
                id: membership.user_id().to_string(),
                username: membership.user_id().to_string(),
                email: None,
            },
        };

        Self {
            user,
            role: membership.role(),
            is_pending: membership.is_pending(),
            can_invite: membership.can_invite(),
            joined_on: membership.joined_on().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub members: Vec<MemberResponse>,
}

/// Request body naming an optional member to look up
#[derive(Debug, Deserialize)]
pub struct RoleQueryBody {
    #[serde(default)]
    pub username: Option<String>,
}

/// Role lookup response
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: TeamRole,
    pub can_invite: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleBody {
    pub username: String,
    /// Accepts `role` as well, for older clients
    #[serde(alias = "role")]
    pub new_role: String,
}

#[derive(Debug, Deserialize)]
pub struct KickBody {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct InvitePermissionBody {
    pub username: String,
    pub can_invite: bool,
}

#[derive(Debug, Deserialize)]
pub struct InviteBody {
    #[serde(default)]
    pub usernames: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub message: String,
    pub invitations: Vec<InvitationResult>,
}

#[derive(Debug, Serialize)]
pub struct InvitableUsersResponse {
    pub usernames: Vec<String>,
}

/// Parse a team id path segment, rejecting malformed UUIDs
fn parse_team_id(id: &str) -> Result<TeamId, ApiError> {
    TeamId::parse(id)
        .map_err(|_| ApiError::bad_request("Invalid team id").with_param("team_id"))
}

/// Create a new team
///
/// POST /teams/create
///
/// The creator becomes the team owner. Any usernames supplied in
/// `invite_usernames` receive pending invitations, reported per username.
pub async fn create_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateTeamBody>,
) -> Result<(StatusCode, Json<CreateTeamResponse>), ApiError> {
    let created = state
        .team_service
        .create_team(
            user.id(),
            CreateTeamRequest {
                name: body.name,
                description: body.description,
                invite_usernames: body.invite_usernames,
            },
        )
        .await?;

    let invitations = created
        .invitations
        .iter()
        .map(InvitationResult::from_report)
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(CreateTeamResponse {
            team: created.team,
            message: "Team created successfully.".to_string(),
            invitations,
        }),
    ))
}

/// List usernames the caller could invite
///
/// GET /teams/users
///
/// With a `Team-Id` header, excludes anyone already holding a membership
/// (active or pending) in that team.
pub async fn invitable_users(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    headers: HeaderMap,
) -> Result<Json<InvitableUsersResponse>, ApiError> {
    let team_id = match headers.get("Team-Id") {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| ApiError::bad_request("Invalid team id").with_param("Team-Id"))?;
            Some(
                TeamId::parse(raw)
                    .map_err(|_| ApiError::bad_request("Invalid team id").with_param("Team-Id"))?,
            )
        }
        None => None,
    };

    let usernames = state
        .team_service
        .invitable_users(user.id(), team_id)
        .await?;

    Ok(Json(InvitableUsersResponse { usernames }))
}

/// Fetch a single team
///
/// GET /teams/{id}
pub async fn get_team(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    let team_id = parse_team_id(&id)?;
    let team = state.team_service.get_team(team_id).await?;

    Ok(Json(team))
}

/// Delete a team, owner only
///
/// DELETE /teams/{id}
pub async fn delete_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    state.team_service.delete_team(user.id(), team_id).await?;

    Ok(Json(MessageResponse {
        message: "Team deleted successfully.".to_string(),
    }))
}

/// List team members, including pending invitees
///
/// GET /teams/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<MembersResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    let records = state.team_service.members(user.id(), team_id).await?;

    let members = records
        .into_iter()
        .map(|r| MemberResponse::new(r.user, &r.membership))
        .collect();

    Ok(Json(MembersResponse { members }))
}

/// Look up the caller's (or a named member's) role in a team
///
/// POST /teams/{id}/role
pub async fn get_role(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<RoleQueryBody>,
) -> Result<Json<RoleResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    let membership = state
        .team_service
        .role_of(user.id(), team_id, body.username.as_deref())
        .await?;

    Ok(Json(RoleResponse {
        role: membership.role(),
        can_invite: membership.can_invite(),
    }))
}

/// Change a member's role or transfer ownership
///
/// POST /teams/{id}/update-role
pub async fn update_role(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateRoleBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    // Reject unknown role strings before touching any state
    let new_role = TeamRole::from_str(&body.new_role)
        .map_err(|e| ApiError::bad_request(e.to_string()).with_param("new_role"))?;

    let outcome = state
        .team_service
        .update_role(user.id(), team_id, &body.username, new_role)
        .await?;

    let message = match outcome {
        RoleUpdateOutcome::OwnershipTransferred => {
            format!("Ownership transferred to {}.", body.username)
        }
        RoleUpdateOutcome::RoleAssigned(role) => {
            format!("{} is now a team {}.", body.username, role)
        }
    };

    Ok(Json(MessageResponse { message }))
}

/// Remove a member from a team
///
/// POST /teams/{id}/kick
pub async fn kick_member(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<KickBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    state
        .team_service
        .kick(user.id(), team_id, &body.username)
        .await?;

    Ok(Json(MessageResponse {
        message: format!("{} was removed from the team.", body.username),
    }))
}

/// Leave a team
///
/// POST /teams/{id}/leave
///
/// Owners must transfer ownership first.
pub async fn leave_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    state.team_service.leave(user.id(), team_id).await?;

    Ok(Json(MessageResponse {
        message: "You have left the team successfully.".to_string(),
    }))
}

/// Grant or revoke a regular member's invite permission
///
/// POST /teams/{id}/invite-permissions
pub async fn set_invite_permission(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<InvitePermissionBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    state
        .team_service
        .set_invite_permission(user.id(), team_id, &body.username, body.can_invite)
        .await?;

    let verb = if body.can_invite { "granted" } else { "revoked" };

    Ok(Json(MessageResponse {
        message: format!("Invite permission {} for {}.", verb, body.username),
    }))
}

/// Invite users to a team by username
///
/// POST /teams/{id}/invite
pub async fn invite_users(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<InviteBody>,
) -> Result<Json<InviteResponse>, ApiError> {
    let team_id = parse_team_id(&id)?;
    let reports = state
        .team_service
        .invite_users(user.id(), team_id, body.usernames)
        .await?;

    let invitations = reports.iter().map(InvitationResult::from_report).collect();

    Ok(Json(InviteResponse {
        message: "Invite process completed.".to_string(),
        invitations,
    }))
}
