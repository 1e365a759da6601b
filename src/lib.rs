//! promptlib - index a prompt library and query the result.
//!
//! The index builder walks a tree of prompt documents (YAML header plus
//! body) and a tree of fragment snippets, and produces one immutable
//! [`PromptIndex`] snapshot. The query engine filters that snapshot by
//! free-text term, category, and tags.

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod render;

pub use config::Config;
pub use error::{LibraryError, Result};
pub use index::{BuildOutcome, BuildReport, Fragment, IndexBuilder, Prompt, PromptIndex};
pub use query::{filter_fragments, filter_prompts, Query};
