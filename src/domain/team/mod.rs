//! Team domain module
//!
//! Teams are the collaboration unit for SDG action plans. A team row holds
//! only identity and description; who belongs to it, and with what role,
//! lives in the membership records.

mod entity;
mod repository;
mod validation;

pub use entity::{Team, TeamId};
pub use repository::TeamRepository;
pub use validation::{validate_team_description, validate_team_name, TeamValidationError};
