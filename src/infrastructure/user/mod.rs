//! User repository implementations, password hashing and the user service

pub mod in_memory;
pub mod password;
pub mod postgres;
pub mod service;

pub use in_memory::InMemoryUserRepository;
pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres::PostgresUserRepository;
pub use service::{RegisterRequest, UserService};
