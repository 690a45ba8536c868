//! CLI module for the SDG platform API
//!
//! Provides subcommands for running the server and managing storage:
//! - `serve`: run the HTTP API server
//! - `migrate`: apply pending database migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// SDG Platform API - teams, roles and invitations for sustainability initiatives
#[derive(Parser)]
#[command(name = "sdg-platform-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}
