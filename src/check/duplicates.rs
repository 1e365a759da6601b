//! Duplicate detection: repeated ids and repeated prompt bodies.

use std::collections::HashMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::index::Prompt;

/// An id produced by more than one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    pub id: String,
    pub paths: Vec<String>,
}

/// Prompts whose bodies are identical once the header is stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub digest: String,
    pub paths: Vec<String>,
}

/// Hex SHA-256 of a prompt body, ignoring surrounding whitespace.
pub fn body_digest(body: &str) -> String {
    hex::encode(Sha256::digest(body.trim().as_bytes()))
}

/// Ids shared by two or more `(id, path)` records, in first-seen order.
pub fn find_duplicate_ids<'a>(
    records: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<DuplicateId> {
    group_by_key(records)
        .into_iter()
        .map(|(id, paths)| DuplicateId { id, paths })
        .collect()
}

/// Groups of prompts sharing a body, in first-seen order.
pub fn find_duplicate_bodies(prompts: &[Prompt]) -> Vec<DuplicateGroup> {
    let digests: Vec<(String, &str)> = prompts
        .iter()
        .map(|p| (body_digest(&p.body), p.path.as_str()))
        .collect();

    group_by_key(digests.iter().map(|(digest, path)| (digest.as_str(), *path)))
        .into_iter()
        .map(|(digest, paths)| DuplicateGroup { digest, paths })
        .collect()
}

fn group_by_key<'a>(
    records: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<(String, Vec<String>)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for (key, path) in records {
        match positions.get(key) {
            Some(&i) => groups[i].1.push(path.to_string()),
            None => {
                positions.insert(key, groups.len());
                groups.push((key.to_string(), vec![path.to_string()]));
            }
        }
    }

    groups.retain(|(_, paths)| paths.len() > 1);
    groups
}
