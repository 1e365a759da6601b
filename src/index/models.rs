//! Record types stored in the index snapshot.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata declared in a prompt's header.
///
/// The schema is advisory: fields are kept verbatim and the accessors below
/// read them leniently. Identity fields (`name`, `category`, `tags`) accept
/// numbers and booleans as their text form; lists and mappings read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A string field, or `None` if it is missing, not a string, or blank.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// A scalar field as text, or `None` if it is missing, not a scalar, or blank.
    pub fn scalar_field(&self, key: &str) -> Option<Cow<'_, str>> {
        self.0
            .get(key)
            .and_then(scalar_text)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn name(&self) -> Option<Cow<'_, str>> {
        self.scalar_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    pub fn category(&self) -> Option<Cow<'_, str>> {
        self.scalar_field("category")
    }

    /// Declared tags. Entries that are lists, mappings, or null are ignored.
    pub fn tags(&self) -> Vec<Cow<'_, str>> {
        match self.0.get("tags") {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Sample variable values, stringified.
    pub fn sample(&self) -> BTreeMap<String, String> {
        let Some(Value::Object(sample)) = self.0.get("sample") else {
            return BTreeMap::new();
        };
        sample
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A prompt document: metadata header plus instructional body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Declared `name`, or the filename stem when none is declared.
    pub id: String,
    /// Path relative to the library root, `/`-separated.
    pub path: String,
    pub metadata: Metadata,
    /// Content after the header, trimmed.
    pub body: String,
    /// The document exactly as read from disk.
    pub raw_body: String,
}

impl Prompt {
    /// Display name: the declared string name, falling back to the id.
    ///
    /// A scalar name that is not a string already became the id.
    pub fn name(&self) -> &str {
        self.metadata.str_field("name").unwrap_or(&self.id)
    }

    pub fn description(&self) -> &str {
        self.metadata.description().unwrap_or_default()
    }

    pub fn category(&self) -> Option<Cow<'_, str>> {
        self.metadata.category()
    }

    pub fn tags(&self) -> Vec<Cow<'_, str>> {
        self.metadata.tags()
    }
}

/// A reusable snippet grouped under a category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// `{category}/{name}`.
    pub id: String,
    pub path: String,
    /// Name of the directory holding the fragment.
    pub category: String,
    /// Filename stem.
    pub name: String,
    /// Trimmed file content.
    pub content: String,
}

/// The snapshot produced by one index build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptIndex {
    pub prompts: Vec<Prompt>,
    pub fragments: Vec<Fragment>,
    /// Distinct tags in first-seen order.
    pub tags: Vec<String>,
    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl PromptIndex {
    /// Assemble a snapshot, deriving the tag and category facets from the prompts.
    pub fn assemble(
        prompts: Vec<Prompt>,
        fragments: Vec<Fragment>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let tags = distinct(prompts.iter().flat_map(Prompt::tags));
        let categories = distinct(prompts.iter().filter_map(Prompt::category));

        Self {
            prompts,
            fragments,
            tags,
            categories,
            generated_at,
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = Cow<'a, str>>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(value.clone()))
        .map(Cow::into_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => Metadata::new(map),
            _ => panic!("expected object"),
        }
    }

    fn prompt(id: &str, meta: Value) -> Prompt {
        Prompt {
            id: id.to_string(),
            path: format!("prompts/{id}.prompty"),
            metadata: metadata(meta),
            body: String::new(),
            raw_body: String::new(),
        }
    }

    #[test]
    fn test_metadata_accessors_are_lenient() {
        let meta = metadata(json!({
            "name": "code-review",
            "description": "",
            "version": 1,
            "tags": ["rust", ["nested"], "review"],
            "sample": { "lang": "rust", "lines": 40 }
        }));

        assert_eq!(meta.name().as_deref(), Some("code-review"));
        assert_eq!(meta.description(), None);
        assert_eq!(meta.version(), None);
        assert_eq!(meta.category(), None);
        assert_eq!(meta.tags(), vec!["rust", "review"]);
        assert_eq!(meta.sample().get("lines").map(String::as_str), Some("40"));
    }

    #[test]
    fn test_scalar_identity_fields_read_as_text() {
        let meta = metadata(json!({
            "name": 42,
            "category": true,
            "tags": [1, "ai", 2.5, null]
        }));

        assert_eq!(meta.name().as_deref(), Some("42"));
        assert_eq!(meta.category().as_deref(), Some("true"));
        assert_eq!(meta.tags(), vec!["1", "ai", "2.5"]);
    }

    #[test]
    fn test_numeric_tags_join_the_facets() {
        let prompts = vec![
            prompt("a", json!({ "category": 2024, "tags": [1, "ai"] })),
            prompt("b", json!({ "category": "2024", "tags": ["1"] })),
        ];

        let index = PromptIndex::assemble(prompts, Vec::new(), Utc::now());

        assert_eq!(index.tags, vec!["1", "ai"]);
        assert_eq!(index.categories, vec!["2024"]);
    }

    #[test]
    fn test_tags_not_a_list_reads_as_empty() {
        let meta = metadata(json!({ "tags": "rust" }));
        assert!(meta.tags().is_empty());
    }

    #[test]
    fn test_assemble_collects_distinct_facets_in_first_seen_order() {
        let prompts = vec![
            prompt("a", json!({ "category": "x", "tags": ["t1"] })),
            prompt("b", json!({ "category": "y", "tags": ["t2", "t1"] })),
            prompt("c", json!({ "tags": ["t2", "t3"] })),
            prompt("d", json!({ "category": "x" })),
        ];

        let index = PromptIndex::assemble(prompts, Vec::new(), Utc::now());

        assert_eq!(index.tags, vec!["t1", "t2", "t3"]);
        assert_eq!(index.categories, vec!["x", "y"]);
    }

    #[test]
    fn test_snapshot_json_uses_camel_case_keys() {
        let mut p = prompt("a", json!({ "name": "a" }));
        p.raw_body = "---\nname: a\n---\n".to_string();
        let index = PromptIndex::assemble(vec![p], Vec::new(), Utc::now());

        let value = serde_json::to_value(&index).unwrap();
        assert!(value.get("generatedAt").is_some());
        assert!(value["prompts"][0].get("rawBody").is_some());
        assert_eq!(value["prompts"][0]["metadata"]["name"], "a");
    }
}
