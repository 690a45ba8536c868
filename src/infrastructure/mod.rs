//! Infrastructure layer: repositories, services and cross-cutting concerns

pub mod auth;
pub mod logging;
pub mod membership;
pub mod storage;
pub mod team;
pub mod user;
