//! CLI module for promptlib.
//!
//! Defines command-line argument parsing and the handlers for each subcommand.

pub mod args;
pub mod commands;

pub use args::{Cli, Command};
pub use commands::run;
