//! Splitting a prompt document into its YAML header and body.
//!
//! A header starts with a `---` line at the very top of the document and
//! ends at the next `---` line. Documents without one are all body.

use serde_json::Value;

use super::models::Metadata;
use crate::error::{LibraryError, Result};

const DELIMITER: &str = "---";

/// A document split at its header delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    /// Raw header text between the delimiters, if the document has one.
    pub header: Option<&'a str>,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

/// Split `content` into header and body.
///
/// Fails when the opening delimiter is present but never closed.
pub fn split(content: &str) -> Result<Document<'_>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(Document {
            header: None,
            body: content,
        });
    };
    if first.trim_end() != DELIMITER {
        return Ok(Document {
            header: None,
            body: content,
        });
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Ok(Document {
                header: Some(&content[header_start..offset]),
                body: &content[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(LibraryError::MalformedHeader(
        "missing closing `---` delimiter".to_string(),
    ))
}

/// Decode a header into metadata. A missing or blank header yields empty metadata.
pub fn parse_metadata(header: Option<&str>) -> Result<Metadata> {
    let Some(header) = header.filter(|h| !h.trim().is_empty()) else {
        return Ok(Metadata::default());
    };

    match serde_yaml::from_str::<Value>(header)? {
        Value::Null => Ok(Metadata::default()),
        Value::Object(fields) => Ok(Metadata::new(fields)),
        other => Err(LibraryError::MalformedHeader(format!(
            "expected a mapping, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
