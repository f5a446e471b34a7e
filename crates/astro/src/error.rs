//! Errors surfaced by the processor and the loader.

use mdmod_core::FrontmatterError;
use thiserror::Error;

/// Boxed error returned by render plugins.
pub type PluginError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of the markdown processor.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A render plugin left the injected frontmatter in a non-object state.
    #[error("render plugins injected invalid frontmatter (expected an object)")]
    InvalidFrontmatterInjection,
    /// markdown-rs rejected the document.
    #[error("markdown error: {0}")]
    Markdown(markdown::message::Message),
    /// A render plugin failed.
    #[error("render plugin `{name}` failed")]
    Plugin {
        /// Plugin name.
        name: String,
        /// Underlying failure.
        #[source]
        source: PluginError,
    },
    /// The HTML post-processing pass failed.
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Invalid loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON settings did not match the expected shape.
    #[error("invalid loader configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a single document load fails.
///
/// Every variant names the offending file, either directly or through its
/// wrapped error.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Malformed frontmatter block.
    #[error("{0}")]
    Frontmatter(#[from] FrontmatterError),
    /// Render plugins produced frontmatter that cannot be exported.
    #[error(
        "{file}: A remark or rehype plugin attempted to inject invalid frontmatter. \
         Ensure \"astro.frontmatter\" is set to a valid JSON object that is not `null` or `undefined`."
    )]
    InvalidFrontmatterInjection {
        /// Document identity.
        file: String,
    },
    /// Any other processor failure, passed through unchanged.
    #[error("{file}: {source}")]
    Renderer {
        /// Document identity.
        file: String,
        /// The processor's own error.
        #[source]
        source: RenderError,
    },
    /// Reading the source file failed.
    #[error("{file}: failed to read markdown source")]
    Io {
        /// Document identity.
        file: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// `load` was called before `build_start`.
    #[error("markdown processor not initialised; build_start must run before load")]
    ProcessorNotStarted,
}

impl LoadError {
    /// Maps a processor failure for `file` onto the load taxonomy.
    pub fn from_render(file: &str, err: RenderError) -> Self {
        match err {
            RenderError::InvalidFrontmatterInjection => LoadError::InvalidFrontmatterInjection {
                file: file.to_string(),
            },
            other => LoadError::Renderer {
                file: file.to_string(),
                source: other,
            },
        }
    }
}
