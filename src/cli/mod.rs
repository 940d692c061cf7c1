//! CLI module for the recipes API
//!
//! - `serve`: run the HTTP server
//! - `config`: print the effective configuration with secrets hidden

pub mod config;
pub mod serve;

use clap::{Parser, Subcommand};

/// Recipes API - recipe sharing service
#[derive(Parser)]
#[command(name = "recipes-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve(serve::ServeArgs),

    /// Print the effective configuration
    Config,
}
