//! Library hygiene checks: metadata validation and duplicate detection.

pub mod duplicates;
pub mod validate;

pub use duplicates::{find_duplicate_bodies, find_duplicate_ids, DuplicateGroup, DuplicateId};
pub use validate::{validate_library, ValidationIssue, ValidationSummary};
