//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};

/// CORE CLI
#[derive(Parser, Debug)]
#[command(name = "core")]
#[command(author, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display the current CORE CLI version
    Version(VersionArgs),

    /// Check for and apply CORE CLI updates
    #[command(subcommand)]
    Update(UpdateCommands),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Update commands
#[derive(Subcommand, Debug)]
pub enum UpdateCommands {
    /// Check the release host for a newer version
    Check(UpdateCheckArgs),

    /// Download and install the latest version, replacing this binary
    Apply(UpdateApplyArgs),
}

#[derive(Args, Debug)]
pub struct UpdateCheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpdateApplyArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
