//! markdown-rs backed renderer.

use super::collect::collect;
use super::{RenderContext, RenderData, RenderPlugin, RenderResult, Renderer};
use crate::config::MarkdownConfig;
use crate::error::RenderError;
use crate::transform::rewrite::{RewritePlan, rewrite_html};
use crate::transform::smartypants::apply_smartypants;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Renders markdown with markdown-rs, then post-processes the HTML with
/// smart punctuation, heading ids and image placeholders.
pub struct MarkdownRsRenderer {
    config: MarkdownConfig,
    plugins: Vec<Box<dyn RenderPlugin>>,
}

impl MarkdownRsRenderer {
    /// Creates a renderer; `plugins` run in order on every document.
    pub fn new(config: MarkdownConfig, plugins: Vec<Box<dyn RenderPlugin>>) -> Self {
        Self { config, plugins }
    }

    fn options(&self) -> markdown::Options {
        let (parse, mut compile) = if self.config.gfm {
            (markdown::ParseOptions::gfm(), markdown::CompileOptions::gfm())
        } else {
            (
                markdown::ParseOptions::default(),
                markdown::CompileOptions::default(),
            )
        };
        compile.allow_dangerous_html = self.config.allow_raw_html;
        if self.config.allow_raw_html {
            // The GFM tag filter would escape `<script>` and friends again.
            compile.gfm_tagfilter = false;
        }
        markdown::Options { parse, compile }
    }

    /// Synchronous body of [`Renderer::render`].
    pub fn render_blocking(
        &self,
        content: &str,
        context: RenderContext,
    ) -> Result<RenderResult, RenderError> {
        let options = self.options();
        let tree = markdown::to_mdast(content, &options.parse).map_err(RenderError::Markdown)?;

        let mut data = RenderData {
            file_url: &context.file_url,
            frontmatter: JsonValue::Object(context.frontmatter.clone()),
        };
        for plugin in &self.plugins {
            plugin
                .run(&tree, &mut data)
                .map_err(|source| RenderError::Plugin {
                    name: plugin.name().to_string(),
                    source,
                })?;
        }
        let JsonValue::Object(frontmatter) = data.frontmatter else {
            return Err(RenderError::InvalidFrontmatterInjection);
        };

        let collected = collect(&tree);

        let mut html =
            markdown::to_html_with_options(content, &options).map_err(RenderError::Markdown)?;
        if self.config.smartypants {
            html = apply_smartypants(&html);
        }
        let html = rewrite_html(
            &html,
            &RewritePlan {
                headings: self
                    .config
                    .heading_ids
                    .then_some(collected.headings.as_slice()),
                images: &collected.images,
            },
        )?;

        Ok(RenderResult {
            html,
            headings: collected.headings,
            image_references: collected.images,
            frontmatter,
        })
    }
}

#[async_trait]
impl Renderer for MarkdownRsRenderer {
    async fn render(
        &self,
        content: &str,
        context: RenderContext,
    ) -> Result<RenderResult, RenderError> {
        self.render_blocking(content, context)
    }
}
