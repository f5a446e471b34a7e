//! HTML transforms applied after markdown rendering.
//!
//! - `smartypants`: smart punctuation transformations (quotes, dashes, ellipsis).
//! - `rewrite`: heading ids and local image placeholders.

/// Heading ids and local image placeholders.
pub mod rewrite;
/// Smart punctuation transformations (quotes, dashes, ellipsis).
pub mod smartypants;
