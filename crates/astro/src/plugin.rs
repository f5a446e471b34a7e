//! The loader: build lifecycle plus the per-document load pipeline.
//!
//! Each load runs frontmatter splitting, rendering, image resolution and
//! code generation in that order. Splitter and processor failures are mapped
//! onto [`LoadError`]; nothing partial is ever returned.

use crate::codegen::{ModuleInput, ModuleMeta, generate_module};
use crate::config::PluginConfig;
use crate::error::LoadError;
use crate::images::{ModuleResolver, resolve_images};
use crate::processor::{MarkdownProcessor, ProcessorHandle, RenderContext};
use mdmod_core::{LoadWarning, is_markdown_file, split_frontmatter};
use serde_json::Value as JsonValue;

/// A compiled markdown module.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedModule {
    /// JavaScript source of the component module.
    pub code: String,
    /// Side-channel metadata for the host.
    pub meta: ModuleMeta,
    /// Non-fatal diagnostics raised during the load.
    pub warnings: Vec<LoadWarning>,
}

/// Markdown loader plugin.
#[derive(Debug)]
pub struct MarkdownPlugin {
    config: PluginConfig,
    processor: Option<ProcessorHandle>,
}

impl MarkdownPlugin {
    /// Creates a plugin; the processor is created by [`Self::build_start`].
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            processor: None,
        }
    }

    /// Creates a plugin that uses `processor` instead of building its own.
    /// The handle is kept until [`Self::build_end`].
    pub fn with_processor(config: PluginConfig, processor: ProcessorHandle) -> Self {
        Self {
            config,
            processor: Some(processor),
        }
    }

    /// Loader configuration.
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Creates the shared processor. Must run before any load.
    pub fn build_start(&mut self) {
        if self.processor.is_some() {
            log::debug!("markdown processor already present, reusing it");
            return;
        }
        self.processor = Some(MarkdownProcessor::create(&self.config.markdown));
    }

    /// Releases the processor. Loads after this fail until the next
    /// [`Self::build_start`].
    pub fn build_end(&mut self) {
        if let Some(processor) = self.processor.take() {
            processor.dispose();
        }
    }

    /// Loads the markdown module `id` from disk.
    ///
    /// Returns `Ok(None)` for ids that are not markdown files.
    pub async fn load(
        &self,
        id: &str,
        resolver: &dyn ModuleResolver,
    ) -> Result<Option<GeneratedModule>, LoadError> {
        if !is_markdown_file(id) {
            return Ok(None);
        }
        self.processor()?;

        let file_id = self.config.file_info(id).file_id;
        let raw = tokio::fs::read_to_string(&file_id)
            .await
            .map_err(|source| LoadError::Io {
                file: file_id.clone(),
                source,
            })?;
        self.load_source(id, &raw, resolver).await.map(Some)
    }

    /// Runs the load pipeline over already-read text.
    pub async fn load_source(
        &self,
        id: &str,
        raw: &str,
        resolver: &dyn ModuleResolver,
    ) -> Result<GeneratedModule, LoadError> {
        let processor = self.processor()?;
        let info = self.config.file_info(id);

        let parsed = split_frontmatter(raw, id)?;
        let result = processor
            .render(
                &parsed.content,
                RenderContext::new(&info.file_id, parsed.metadata),
            )
            .await
            .map_err(|err| LoadError::from_render(id, err))?;

        let images = resolve_images(&result.image_references, id, resolver).await;

        let mut warnings = Vec::new();
        if result.frontmatter.get("setup").is_some_and(is_truthy) {
            let warning = LoadWarning::DeprecatedSetup {
                file: id.to_string(),
            };
            log::warn!("{}", warning);
            warnings.push(warning);
        }

        let code = generate_module(&ModuleInput {
            file_id: &info.file_id,
            file_url: info.file_url.as_deref(),
            raw_content: &parsed.content,
            html: &result.html,
            frontmatter: &result.frontmatter,
            headings: &result.headings,
            images: &images,
            runtime_module: &self.config.runtime_module,
            error_module: &self.config.error_module,
        });
        log::debug!(
            "{}: generated module ({} heading(s), {} image(s))",
            id,
            result.headings.len(),
            images.len()
        );

        Ok(GeneratedModule {
            code,
            meta: ModuleMeta::default(),
            warnings,
        })
    }

    fn processor(&self) -> Result<&ProcessorHandle, LoadError> {
        self.processor.as_ref().ok_or(LoadError::ProcessorNotStarted)
    }
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ResolvedId;
    use async_trait::async_trait;
    use serde_json::json;

    struct NoResolve;

    #[async_trait]
    impl ModuleResolver for NoResolve {
        async fn resolve(&self, _specifier: &str, _importer: &str) -> Option<ResolvedId> {
            None
        }
    }

    fn started() -> MarkdownPlugin {
        let mut plugin = MarkdownPlugin::new(PluginConfig::default());
        plugin.build_start();
        plugin
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("import X from './X.astro'")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(1)));
    }

    #[tokio::test]
    async fn load_before_build_start_fails() {
        let plugin = MarkdownPlugin::new(PluginConfig::default());
        let err = plugin
            .load_source("/p/a.md", "# Hi", &NoResolve)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::ProcessorNotStarted));
    }

    #[tokio::test]
    async fn load_after_build_end_fails() {
        let mut plugin = started();
        plugin.build_end();
        let err = plugin
            .load_source("/p/a.md", "# Hi", &NoResolve)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::ProcessorNotStarted));
    }

    #[tokio::test]
    async fn non_markdown_ids_are_skipped() {
        let plugin = started();
        assert!(plugin.load("/p/a.astro", &NoResolve).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_files_report_io_errors() {
        let plugin = started();
        let err = plugin
            .load("/definitely/not/here.md?raw", &NoResolve)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { ref file, .. } if file == "/definitely/not/here.md"));
    }

    #[tokio::test]
    async fn meta_is_the_markdown_default() {
        let plugin = started();
        let module = plugin.load_source("/p/a.md", "text", &NoResolve).await.unwrap();
        assert_eq!(module.meta, ModuleMeta::default());
        assert!(module.warnings.is_empty());
    }
}
