//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, entity::EntityCommands, init::InitArgs,
    request::RequestCommands, status::StatusArgs,
};

#[derive(Parser)]
#[command(name = "gestdoc")]
#[command(author, version, about = "Document custody requests for a records archive")]
#[command(long_about = "Registers custody requests for archived boxes and keeps the reference lists \
(warehouses, clients, sectors, requesters, operators, contacts, users) they are filled from.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .gestdoc/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new gestdoc project
    Init(InitArgs),

    /// Reference data: warehouses, clients, sectors, requesters, ...
    #[command(subcommand, visible_alias = "ent")]
    Entity(EntityCommands),

    /// Custody requests
    #[command(subcommand, visible_alias = "sol")]
    Request(RequestCommands),

    /// Show the request dashboard
    Status(StatusArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, text for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
