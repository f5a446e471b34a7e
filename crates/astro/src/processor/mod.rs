//! The markdown processor: one long-lived renderer per build.
//!
//! The processor is created once from the build's [`MarkdownConfig`] and
//! handed to every load as a [`ProcessorHandle`]. The handle is cheap to clone
//! and read-only, so concurrent loads share it freely.
//!
//! # Module Structure
//!
//! - `engine` - the bundled markdown-rs renderer
//! - `collect` - heading and image-reference extraction from the mdast

mod collect;
mod engine;

pub use engine::MarkdownRsRenderer;

use crate::config::MarkdownConfig;
use crate::error::{PluginError, RenderError};
use markdown::mdast::Node;
use async_trait::async_trait;
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Heading metadata extracted while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading depth (1-6).
    pub depth: u8,
    /// Slug used as the heading `id`.
    pub slug: String,
    /// Plain heading text.
    pub text: String,
}

/// Per-document inputs to a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    /// `file://` URL of the document.
    pub file_url: String,
    /// Frontmatter as split from the document.
    pub frontmatter: Map<String, JsonValue>,
}

impl RenderContext {
    /// Builds a context for the file at `file_id`.
    pub fn new(file_id: &str, frontmatter: Map<String, JsonValue>) -> Self {
        Self {
            file_url: format!("file://{}", file_id),
            frontmatter,
        }
    }
}

/// Output of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    /// Rendered HTML; local images carry `__ASTRO_IMAGE_` placeholders.
    pub html: String,
    /// Headings in document order.
    pub headings: Vec<Heading>,
    /// Distinct local image references, in first-seen order.
    pub image_references: IndexSet<String>,
    /// Frontmatter after render plugins ran.
    pub frontmatter: Map<String, JsonValue>,
}

/// Mutable state render plugins may read and update.
#[derive(Debug)]
pub struct RenderData<'a> {
    /// `file://` URL of the document being rendered.
    pub file_url: &'a str,
    /// Frontmatter seen by the rest of the pipeline. Must stay an object.
    pub frontmatter: JsonValue,
}

/// Hook run over the parsed tree before HTML is produced.
///
/// Plugins inspect the tree and may inject frontmatter (reading time,
/// generated titles, ...). They do not change the rendered HTML.
pub trait RenderPlugin: Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Runs the plugin for one document.
    fn run(&self, tree: &Node, data: &mut RenderData<'_>) -> Result<(), PluginError>;
}

/// A markdown engine: turns a body plus frontmatter into a [`RenderResult`].
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders one document body.
    async fn render(
        &self,
        content: &str,
        context: RenderContext,
    ) -> Result<RenderResult, RenderError>;
}

/// Shared, read-only handle to the build's processor.
#[derive(Clone)]
pub struct ProcessorHandle {
    renderer: Arc<dyn Renderer>,
}

impl std::fmt::Debug for ProcessorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorHandle").finish_non_exhaustive()
    }
}

impl ProcessorHandle {
    /// Wraps an arbitrary renderer.
    pub fn from_renderer(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }

    /// Renders a document body.
    pub async fn render(
        &self,
        content: &str,
        context: RenderContext,
    ) -> Result<RenderResult, RenderError> {
        self.renderer.render(content, context).await
    }

    /// Releases this handle. Clones held by in-flight loads stay valid until
    /// they finish.
    pub fn dispose(self) {
        log::debug!(
            "disposing markdown processor ({} other handle(s) alive)",
            Arc::strong_count(&self.renderer) - 1
        );
    }
}

/// Entry point for creating processors.
pub struct MarkdownProcessor;

impl MarkdownProcessor {
    /// Creates a processor with no render plugins.
    pub fn create(config: &MarkdownConfig) -> ProcessorHandle {
        Self::builder(config.clone()).build()
    }

    /// Starts a builder for a processor with render plugins.
    pub fn builder(config: MarkdownConfig) -> MarkdownProcessorBuilder {
        MarkdownProcessorBuilder {
            config,
            plugins: Vec::new(),
        }
    }
}

/// Collects render plugins before the processor is frozen.
pub struct MarkdownProcessorBuilder {
    config: MarkdownConfig,
    plugins: Vec<Box<dyn RenderPlugin>>,
}

impl MarkdownProcessorBuilder {
    /// Adds a render plugin; plugins run in insertion order.
    pub fn plugin<P: RenderPlugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Freezes the configuration into a shareable handle.
    pub fn build(self) -> ProcessorHandle {
        log::debug!(
            "creating markdown processor (gfm: {}, smartypants: {}, plugins: {})",
            self.config.gfm,
            self.config.smartypants,
            self.plugins.len()
        );
        ProcessorHandle::from_renderer(Arc::new(MarkdownRsRenderer::new(
            self.config,
            self.plugins,
        )))
    }
}
