//! Building an index snapshot from the library on disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::discovery::{discover, relative_path, stem};
use super::frontmatter;
use super::models::{Fragment, Prompt, PromptIndex};
use crate::check::duplicates::{find_duplicate_ids, DuplicateId};
use crate::config::Config;
use crate::error::{LibraryError, Result};

/// Which collection a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Prompt,
    Fragment,
}

/// A document left out of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub path: String,
    pub kind: DocumentKind,
    pub reason: String,
}

/// Diagnostics gathered during a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub prompts_parsed: usize,
    pub fragments_parsed: usize,
    pub skipped: Vec<SkippedDocument>,
    pub duplicate_ids: Vec<DuplicateId>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.duplicate_ids.is_empty()
    }
}

/// Result of a build: the snapshot and what happened while making it.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub index: PromptIndex,
    pub report: BuildReport,
}

/// Scans the prompt and fragment trees described by a [`Config`].
pub struct IndexBuilder<'a> {
    config: &'a Config,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build a snapshot stamped with the current time.
    pub fn build(&self) -> BuildOutcome {
        self.build_at(Utc::now())
    }

    /// Build a snapshot stamped with `generated_at`.
    ///
    /// Unreadable or malformed documents are skipped and listed in the report.
    pub fn build_at(&self, generated_at: DateTime<Utc>) -> BuildOutcome {
        let root = &self.config.root;
        let mut report = BuildReport::default();

        let prompt_ext = &self.config.prompt_extension;
        let prompt_paths = discover(&self.config.prompts_path(), prompt_ext);
        let prompts = parse_all(&prompt_paths, root, DocumentKind::Prompt, &mut report, |p| {
            parse_prompt(p, root, prompt_ext)
        });

        let fragment_ext = &self.config.fragment_extension;
        let fragment_paths = discover(&self.config.fragments_path(), fragment_ext);
        let fragments = parse_all(&fragment_paths, root, DocumentKind::Fragment, &mut report, |p| {
            parse_fragment(p, root, fragment_ext)
        });

        report.prompts_parsed = prompts.len();
        report.fragments_parsed = fragments.len();
        report.duplicate_ids = find_duplicate_ids(
            prompts
                .iter()
                .map(|p| (p.id.as_str(), p.path.as_str()))
                .chain(fragments.iter().map(|f| (f.id.as_str(), f.path.as_str()))),
        );
        for dup in &report.duplicate_ids {
            warn!(id = %dup.id, paths = ?dup.paths, "duplicate id");
        }

        info!(
            prompts = report.prompts_parsed,
            fragments = report.fragments_parsed,
            skipped = report.skipped.len(),
            "built index"
        );

        BuildOutcome {
            index: PromptIndex::assemble(prompts, fragments, generated_at),
            report,
        }
    }
}

/// Parse documents in parallel, keeping discovery order in the output.
fn parse_all<T, F>(
    paths: &[PathBuf],
    root: &Path,
    kind: DocumentKind,
    report: &mut BuildReport,
    parse: F,
) -> Vec<T>
where
    T: Send,
    F: Fn(&Path) -> Result<T> + Sync,
{
    let results: Vec<Result<T>> = paths.par_iter().map(|path| parse(path.as_path())).collect();

    let mut records = Vec::with_capacity(results.len());
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                let path = relative_path(path, root);
                warn!(path = %path, error = %err, "skipping document");
                report.skipped.push(SkippedDocument {
                    path,
                    kind,
                    reason: err.to_string(),
                });
            }
        }
    }
    records
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| LibraryError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse one prompt document.
pub fn parse_prompt(path: &Path, root: &Path, extension: &str) -> Result<Prompt> {
    let raw = read(path)?;
    parse_prompt_str(raw, path, root, extension)
}

/// Parse prompt text already read from `path`.
pub fn parse_prompt_str(raw: String, path: &Path, root: &Path, extension: &str) -> Result<Prompt> {
    let document = frontmatter::split(&raw)?;
    let metadata = frontmatter::parse_metadata(document.header)?;
    let body = document.body.trim().to_string();

    let id = match metadata.name() {
        Some(name) => name.into_owned(),
        None => stem(path, extension),
    };
    debug!(id = %id, path = %path.display(), "parsed prompt");

    Ok(Prompt {
        id,
        path: relative_path(path, root),
        metadata,
        body,
        raw_body: raw,
    })
}

/// Read one fragment. Its category is the name of the directory holding it.
pub fn parse_fragment(path: &Path, root: &Path, extension: &str) -> Result<Fragment> {
    let content = read(path)?;
    let category = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = stem(path, extension);

    Ok(Fragment {
        id: format!("{category}/{name}"),
        path: relative_path(path, root),
        category,
        name,
        content: content.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn library() -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        let config = Config::with_root(temp.path());
        (temp, config)
    }

    #[test]
    fn test_prompt_id_uses_declared_name() {
        let (temp, config) = library();
        write(
            temp.path(),
            "prompts/coding/review.prompty",
            "---\nname: code-review\ncategory: coding\n---\n\n  Review this.  \n",
        );

        let outcome = IndexBuilder::new(&config).build();
        let prompt = &outcome.index.prompts[0];

        assert_eq!(prompt.id, "code-review");
        assert_eq!(prompt.path, "prompts/coding/review.prompty");
        assert_eq!(prompt.body, "Review this.");
        assert!(prompt.raw_body.starts_with("---\nname: code-review"));
        assert!(prompt.raw_body.ends_with("  \n"));
    }

    #[test]
    fn test_prompt_id_falls_back_to_stem() {
        let (temp, config) = library();
        write(temp.path(), "prompts/summarize.prompty", "---\ndescription: d\n---\nBody");
        write(temp.path(), "prompts/blank.prompty", "---\nname: \"\"\n---\nBody");
        write(temp.path(), "prompts/plain.prompty", "No header at all");

        let outcome = IndexBuilder::new(&config).build();
        let ids: Vec<&str> = outcome.index.prompts.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["blank", "plain", "summarize"]);
        assert_eq!(outcome.index.prompts[1].body, "No header at all");
    }

    #[test]
    fn test_scalar_name_and_tags_are_kept_as_text() {
        let (temp, config) = library();
        write(temp.path(), "prompts/x.prompty", "---\nname: 42\ntags: [1, ai]\n---\nBody");

        let index = IndexBuilder::new(&config).build().index;

        assert_eq!(index.prompts[0].id, "42");
        assert_eq!(index.tags, vec!["1", "ai"]);
    }

    #[test]
    fn test_fragment_id_is_category_and_name() {
        let (temp, config) = library();
        write(temp.path(), "fragments/tone/formal.md", "\nBe formal.\n");
        write(temp.path(), "fragments/format/json.md", "Reply in JSON.");

        let outcome = IndexBuilder::new(&config).build();
        let fragments = &outcome.index.fragments;

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].id, "format/json");
        assert_eq!(fragments[1].id, "tone/formal");
        assert_eq!(fragments[1].category, "tone");
        assert_eq!(fragments[1].name, "formal");
        assert_eq!(fragments[1].content, "Be formal.");
        assert_eq!(fragments[1].path, "fragments/tone/formal.md");
    }

    #[test]
    fn test_missing_directories_yield_empty_index() {
        let (_temp, config) = library();
        let outcome = IndexBuilder::new(&config).build();

        assert!(outcome.index.prompts.is_empty());
        assert!(outcome.index.fragments.is_empty());
        assert!(outcome.report.is_clean());
    }

    #[test]
    fn test_malformed_documents_are_skipped_and_reported() {
        let (temp, config) = library();
        write(temp.path(), "prompts/good.prompty", "---\nname: good\n---\nok");
        write(temp.path(), "prompts/bad-yaml.prompty", "---\nname: [oops\n---\nbody");
        write(temp.path(), "prompts/unclosed.prompty", "---\nname: x\nbody");

        let outcome = IndexBuilder::new(&config).build();

        assert_eq!(outcome.index.prompts.len(), 1);
        assert_eq!(outcome.report.prompts_parsed, 1);
        let skipped: Vec<&str> = outcome.report.skipped.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(skipped, vec!["prompts/bad-yaml.prompty", "prompts/unclosed.prompty"]);
        assert!(outcome
            .report
            .skipped
            .iter()
            .all(|s| s.kind == DocumentKind::Prompt));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_prompt_is_indexed() {
        let (temp, config) = library();
        write(temp.path(), "shared/real.prompty", "---\nname: linked\n---\nShared body");
        fs::create_dir_all(temp.path().join("prompts")).unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("shared/real.prompty"),
            temp.path().join("prompts/linked.prompty"),
        )
        .unwrap();

        let outcome = IndexBuilder::new(&config).build();

        assert_eq!(outcome.index.prompts.len(), 1);
        assert_eq!(outcome.index.prompts[0].id, "linked");
        assert_eq!(outcome.index.prompts[0].path, "prompts/linked.prompty");
        assert!(outcome.report.skipped.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_reported() {
        let (temp, config) = library();
        write(temp.path(), "prompts/a.prompty", "---\nname: same\n---\none");
        write(temp.path(), "prompts/b.prompty", "---\nname: same\n---\ntwo");

        let outcome = IndexBuilder::new(&config).build();

        assert_eq!(outcome.index.prompts.len(), 2);
        assert_eq!(outcome.report.duplicate_ids.len(), 1);
        assert_eq!(outcome.report.duplicate_ids[0].id, "same");
    }

    #[test]
    fn test_facets_are_deduplicated() {
        let (temp, config) = library();
        for (file, category, tags) in [
            ("a", "x", "[t1]"),
            ("b", "y", "[t1, t2]"),
            ("c", "x", "[t2]"),
        ] {
            write(
                temp.path(),
                &format!("prompts/{file}.prompty"),
                &format!("---\nname: {file}\ncategory: {category}\ntags: {tags}\n---\nbody"),
            );
        }

        let index = IndexBuilder::new(&config).build().index;

        assert_eq!(index.tags, vec!["t1", "t2"]);
        assert_eq!(index.categories, vec!["x", "y"]);
    }

    #[test]
    fn test_rebuild_is_reproducible() {
        let (temp, config) = library();
        write(temp.path(), "prompts/z.prompty", "---\nname: z\ntags: [b]\n---\nz");
        write(temp.path(), "prompts/a/a.prompty", "---\nname: a\ntags: [a]\n---\na");
        write(temp.path(), "fragments/x/y.md", "y");

        let first = IndexBuilder::new(&config).build().index;
        let second = IndexBuilder::new(&config).build().index;

        assert_eq!(first.prompts, second.prompts);
        assert_eq!(first.fragments, second.fragments);
        assert_eq!(first.tags, second.tags);
        assert_eq!(first.categories, second.categories);
    }
}
