//! Checking prompt metadata against the library's conventions.
//!
//! Every prompt needs a `name`, `description`, and `version`. Versions are
//! `X.Y.Z`; names are lowercase letters, digits, and hyphens.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::index::discovery::{discover, relative_path};
use crate::index::frontmatter;

const REQUIRED_FIELDS: &[&str] = &["name", "description", "version"];

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"));
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid regex"));

/// A problem found in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationSummary {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Problems with a single prompt document's text.
pub fn validate_document(raw: &str) -> Vec<String> {
    let metadata = frontmatter::split(raw)
        .and_then(|doc| match doc.header {
            Some(header) => frontmatter::parse_metadata(Some(header)).map(Some),
            None => Ok(None),
        })
        .ok()
        .flatten()
        .filter(|m| !m.is_empty());

    let Some(metadata) = metadata else {
        return vec!["missing or invalid metadata header".to_string()];
    };

    let mut problems: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| metadata.get(field).is_none())
        .map(|field| format!("missing required field '{field}'"))
        .collect();

    if let Some(version) = metadata.get("version") {
        if !matches_str(version, &VERSION_REGEX) {
            problems.push("invalid version format (expected X.Y.Z)".to_string());
        }
    }
    if let Some(name) = metadata.get("name") {
        if !matches_str(name, &NAME_REGEX) {
            problems.push("invalid name format (use lowercase, numbers, hyphens)".to_string());
        }
    }

    problems
}

fn matches_str(value: &Value, regex: &Regex) -> bool {
    value.as_str().is_some_and(|s| regex.is_match(s))
}

/// Validate one prompt file, reporting paths relative to `root`.
pub fn validate_file(path: &Path, root: &Path) -> Vec<ValidationIssue> {
    let rel = relative_path(path, root);
    let messages = match std::fs::read_to_string(path) {
        Ok(raw) => validate_document(&raw),
        Err(err) => vec![format!("unreadable: {err}")],
    };

    messages
        .into_iter()
        .map(|message| ValidationIssue {
            path: rel.clone(),
            message,
        })
        .collect()
}

/// Validate every prompt in the library.
pub fn validate_library(config: &Config) -> ValidationSummary {
    let paths = discover(&config.prompts_path(), &config.prompt_extension);
    let issues = paths
        .iter()
        .flat_map(|path| validate_file(path, &config.root))
        .collect();

    ValidationSummary {
        checked: paths.len(),
        issues,
    }
}
