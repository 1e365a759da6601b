//! Index building: discovering documents, parsing them, and writing the snapshot.

pub mod builder;
pub mod discovery;
pub mod frontmatter;
pub mod models;
pub mod snapshot;

pub use builder::{BuildOutcome, BuildReport, DocumentKind, IndexBuilder, SkippedDocument};
pub use models::*;
pub use snapshot::{read_index, write_index};
