//! Team repository implementations and the team service

pub mod in_memory;
pub mod postgres;
pub mod service;

pub use in_memory::InMemoryTeamRepository;
pub use postgres::PostgresTeamRepository;
pub use service::{
    CreateTeamRequest, CreatedTeam, InvitationAction, InviteOutcome, InviteReport, MemberRecord,
    PendingInvitation, RoleUpdateOutcome, TeamService, TeamWithRole,
};
