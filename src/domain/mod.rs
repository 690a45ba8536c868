//! Domain layer: entities, validation, repository traits and policy rules

mod error;
pub mod membership;
pub mod team;
pub mod user;

pub use error::DomainError;
