#![deny(missing_docs)]
//! mdmod core: frontmatter splitting, located errors, path and identifier helpers.

/// Error locations, frontmatter errors and load warnings.
pub mod error;
/// YAML frontmatter splitting.
pub mod frontmatter;
/// Markdown predicate, fallback path joins.
pub mod paths;
/// Short deterministic identifiers.
pub mod shorthash;
/// Heading slug generation.
pub mod slug;

pub use error::{
    FrontmatterError, FrontmatterErrorKind, LoadWarning, Position, SourceLocation,
};
pub use frontmatter::{Document, ParsedDocument, split_frontmatter};
pub use paths::{is_local_image_path, is_markdown_file, join_relative};
pub use shorthash::shorthash;
pub use slug::{Slugger, slugify};
