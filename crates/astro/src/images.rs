//! Resolution of local image references against the host's module graph.

use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexSet;
use mdmod_core::{join_relative, shorthash};

/// A module id returned by the host resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    /// Resolved module id.
    pub id: String,
}

impl ResolvedId {
    /// Wraps a resolved id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The host build tool's module resolution capability.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    /// Resolves `specifier` as imported from `importer`, or `None` when the
    /// host cannot resolve it.
    async fn resolve(&self, specifier: &str, importer: &str) -> Option<ResolvedId>;
}

/// Outcome of resolving one image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The host resolved the reference to this id.
    Resolved(String),
    /// The host had no answer; the path was joined onto the document's
    /// directory instead.
    Fallback(String),
}

impl Resolution {
    /// The id to import, whichever way it was obtained.
    pub fn id(&self) -> &str {
        match self {
            Resolution::Resolved(id) | Resolution::Fallback(id) => id,
        }
    }

    /// Whether this came from the fallback join.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }
}

/// A resolved image together with the identifier it is imported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBinding {
    /// Path exactly as written in the markdown.
    pub raw: String,
    /// Where it resolved to.
    pub resolution: Resolution,
    /// Deterministic identifier derived from `raw`.
    pub safe_name: String,
}

impl ImageBinding {
    /// The resolved (or fallback) module id.
    pub fn resolved(&self) -> &str {
        self.resolution.id()
    }
}

/// Resolves every reference of document `id` concurrently.
///
/// Output order equals the order of `references`. Resolution never fails: a
/// reference the host cannot resolve falls back to a lexical join.
pub async fn resolve_images(
    references: &IndexSet<String>,
    id: &str,
    resolver: &dyn ModuleResolver,
) -> Vec<ImageBinding> {
    join_all(references.iter().map(|raw| resolve_one(raw, id, resolver))).await
}

async fn resolve_one(raw: &str, id: &str, resolver: &dyn ModuleResolver) -> ImageBinding {
    let resolution = match resolver.resolve(raw, id).await {
        Some(resolved) => Resolution::Resolved(resolved.id),
        None => {
            let joined = join_relative(id, raw);
            log::debug!("{}: could not resolve image `{}`, using `{}`", id, raw, joined);
            Resolution::Fallback(joined)
        }
    };
    ImageBinding {
        raw: raw.to_string(),
        resolution,
        safe_name: shorthash(raw),
    }
}
