//! Team membership domain module

mod entity;
pub mod policy;
mod repository;

pub use entity::{Membership, TeamRole, UnknownRole};
pub use repository::MembershipRepository;
