#![deny(missing_docs)]
//! mdmod Astro loader: markdown processing, image wiring and component codegen.

/// Component module generation.
pub mod codegen;
/// Loader and markdown configuration.
pub mod config;
/// Processor and load errors.
pub mod error;
/// Image reference resolution.
pub mod images;
/// Build lifecycle and load pipeline.
pub mod plugin;
/// The markdown processor.
pub mod processor;
/// HTML transforms (smart punctuation, heading ids, image placeholders).
pub mod transform;

pub use codegen::{ModuleInput, ModuleMeta, generate_module};
pub use config::{BuildFormat, FileInfo, MarkdownConfig, PluginConfig, TrailingSlash};
pub use error::{ConfigError, LoadError, PluginError, RenderError};
pub use images::{ImageBinding, ModuleResolver, Resolution, ResolvedId, resolve_images};
pub use plugin::{GeneratedModule, MarkdownPlugin};
pub use processor::{
    Heading, MarkdownProcessor, MarkdownRsRenderer, ProcessorHandle, RenderContext, RenderData,
    RenderPlugin, RenderResult, Renderer,
};

pub use mdmod_core::{FrontmatterError, LoadWarning, is_markdown_file};
