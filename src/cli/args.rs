//! Command-line argument definitions.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::render::parse_assignment;

/// Index a prompt library into a searchable JSON snapshot and query it.
#[derive(Parser, Debug)]
#[command(name = "promptlib")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Library root holding the prompt and fragment directories.
    #[arg(long, global = true, default_value = ".", env = "PROMPTLIB_ROOT")]
    pub root: PathBuf,

    /// Path to a config file (defaults to <root>/promptlib.yaml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Index snapshot path, relative to the root (overrides the configured output).
    #[arg(long, global = true, env = "PROMPTLIB_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config file and create the document directories.
    Init(InitArgs),

    /// Scan the library and write the index snapshot.
    Index(IndexArgs),

    /// Filter prompts or fragments in the index.
    Search(SearchArgs),

    /// Check prompt metadata for required fields and formats.
    Validate,

    /// Report prompts with identical bodies.
    Duplicates,

    /// Render a prompt with variables and includes expanded.
    Render(RenderArgs),

    /// Show a summary of the written index.
    Status,
}

/// Arguments for the init command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Only initialize if not already initialized.
    #[arg(long)]
    pub if_needed: bool,

    /// Overwrite an existing config file.
    #[arg(long, conflicts_with = "if_needed")]
    pub force: bool,
}

/// Arguments for the index command.
#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Build and report without writing the snapshot.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the search command.
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Case-insensitive text to look for in names, descriptions, and bodies.
    pub term: Option<String>,

    /// Only prompts in this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Only prompts carrying this tag (repeat to require several).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Search fragments instead of prompts.
    #[arg(long)]
    pub fragments: bool,

    /// Build the index in memory instead of reading the snapshot file.
    #[arg(long)]
    pub rebuild: bool,
}

/// Arguments for the render command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Path to the prompt file.
    pub file: PathBuf,

    /// Variable to substitute, as KEY=VALUE (repeatable).
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub vars: Vec<(String, String)>,

    /// Seed variables from the prompt's `sample` metadata.
    #[arg(short = 's', long)]
    pub use_sample: bool,
}
