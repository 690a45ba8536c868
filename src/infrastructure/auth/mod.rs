//! Authentication infrastructure module
//!
//! This module provides JWT token management for user authentication.

pub mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
