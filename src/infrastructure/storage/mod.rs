//! Storage infrastructure

pub mod memory;
pub mod migrations;

pub use memory::MemoryStore;
pub use migrations::{run_storage_migrations, Migration, PostgresMigrator};
