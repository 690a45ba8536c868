//! API middleware and request extractors

pub mod user_auth;

pub use user_auth::RequireUser;
