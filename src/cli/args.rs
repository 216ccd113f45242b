//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    audit::AuditArgs,
    completions::CompletionsArgs,
    doc::DocCommands,
    init::InitArgs,
    review::ReviewArgs,
    roster::RosterCommands,
    workflow::{approve::ApproveArgs, reject::RejectArgs, submit::SubmitArgs},
};

#[derive(Parser)]
#[command(name = "fdc")]
#[command(author, version, about = "Folio Document Control")]
#[command(
    long_about = "A controlled-document registry: immutable version history, an approval \
                  workflow, and periodic review scheduling for ISO 9001 style document control."
)]
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

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Vault root (default: auto-detect by finding .fdc/)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new document vault
    Init(InitArgs),

    /// Controlled document management
    #[command(subcommand)]
    Doc(DocCommands),

    /// Submit draft versions for review
    Submit(SubmitArgs),

    /// Approve pending versions
    Approve(ApproveArgs),

    /// Reject pending versions back to draft
    Reject(RejectArgs),

    /// Periodic review report (overdue and due-soon documents)
    Review(ReviewArgs),

    /// Manage the approval roster
    #[command(subcommand)]
    Roster(RosterCommands),

    /// Verify stored content against the registry
    Audit(AuditArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
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
