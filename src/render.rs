//! Rendering a prompt body as a template.
//!
//! Two constructs are understood: `{% include 'path' %}` pulls in another
//! file relative to the library root, and `{{ key }}` is replaced by a
//! variable's value. Includes are expanded first, so included text can use
//! variables too. Placeholders without a value are left untouched.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::warn;

use crate::error::{LibraryError, Result};
use crate::index::frontmatter;

static INCLUDE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%\s*include\s*'([^']+)'\s*%\}").expect("valid regex"));
static VARIABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("valid regex"));

pub type Variables = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub text: String,
    /// Include targets that could not be read; their directives stay in `text`.
    pub missing_includes: Vec<String>,
}

/// Render `template` against `variables`, resolving includes under `root`.
pub fn render(template: &str, variables: &Variables, root: &Path) -> Rendered {
    let mut missing_includes = Vec::new();

    let expanded = INCLUDE_REGEX.replace_all(template, |caps: &Captures| {
        let target = &caps[1];
        match std::fs::read_to_string(root.join(target)) {
            Ok(content) => content,
            Err(err) => {
                warn!(include = target, error = %err, "include not found");
                missing_includes.push(target.to_string());
                caps[0].to_string()
            }
        }
    });

    let text = VARIABLE_REGEX
        .replace_all(&expanded, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned();

    Rendered {
        text,
        missing_includes,
    }
}

/// Render a prompt file.
///
/// When `use_sample` is set, the prompt's `sample` values seed the variables;
/// `overrides` are applied on top.
pub fn render_file(
    path: &Path,
    root: &Path,
    overrides: &[(String, String)],
    use_sample: bool,
) -> Result<Rendered> {
    let raw = std::fs::read_to_string(path).map_err(|source| LibraryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = frontmatter::split(&raw)?;

    let mut variables = Variables::new();
    if use_sample {
        variables.extend(frontmatter::parse_metadata(document.header)?.sample());
    }
    variables.extend(overrides.iter().cloned());

    Ok(render(document.body, &variables, root))
}

/// Parse a `KEY=VALUE` assignment.
pub fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_variables() {
        let temp = TempDir::new().unwrap();
        let rendered = render(
            "Review {{language}} code: {{ code }} ({{missing}})",
            &vars(&[("language", "Rust"), ("code", "fn main() {}")]),
            temp.path(),
        );
        assert_eq!(rendered.text, "Review Rust code: fn main() {} ({{missing}})");
    }

    #[test]
    fn test_values_are_not_reexpanded() {
        let temp = TempDir::new().unwrap();
        let rendered = render("{{a}}", &vars(&[("a", "{{b}}"), ("b", "x")]), temp.path());
        assert_eq!(rendered.text, "{{b}}");
    }

    #[test]
    fn test_includes_resolve_against_root_before_variables() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("fragments/tone")).unwrap();
        std::fs::write(temp.path().join("fragments/tone/formal.md"), "Address {{who}} formally.").unwrap();

        let rendered = render(
            "{% include 'fragments/tone/formal.md' %}\n{%include 'fragments/none.md'%}",
            &vars(&[("who", "the reader")]),
            temp.path(),
        );

        assert_eq!(
            rendered.text,
            "Address the reader formally.\n{%include 'fragments/none.md'%}"
        );
        assert_eq!(rendered.missing_includes, vec!["fragments/none.md"]);
    }

    #[test]
    fn test_render_file_uses_sample_then_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("p.prompty");
        std::fs::write(
            &path,
            "---\nname: p\nsample:\n  topic: cats\n  count: 3\n---\nWrite {{count}} facts about {{topic}}.",
        )
        .unwrap();

        let sampled = render_file(&path, temp.path(), &[], true).unwrap();
        assert_eq!(sampled.text, "Write 3 facts about cats.");

        let overridden = render_file(
            &path,
            temp.path(),
            &[("topic".to_string(), "dogs".to_string())],
            true,
        )
        .unwrap();
        assert_eq!(overridden.text, "Write 3 facts about dogs.");

        let raw = render_file(&path, temp.path(), &[], false).unwrap();
        assert_eq!(raw.text, "Write {{count}} facts about {{topic}}.");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("lang=rust=fun"),
            Ok(("lang".to_string(), "rust=fun".to_string()))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
