//! Build-wide settings for the markdown loader.

use crate::error::ConfigError;
use mdmod_core::paths::{MARKDOWN_EXTENSIONS, strip_query};
use serde::{Deserialize, Serialize};

/// Default module providing the server runtime helpers used by generated code.
pub const DEFAULT_RUNTIME_MODULE: &str = "astro/runtime/server/index.js";
/// Default module providing `AstroError` / `AstroErrorData`.
pub const DEFAULT_ERROR_MODULE: &str = "astro/core/errors/index.js";

/// Markdown rendering options shared by every document of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownConfig {
    /// GitHub Flavored Markdown (tables, strikethrough, autolinks, task lists, footnotes).
    pub gfm: bool,
    /// Smart quotes, dashes and ellipses in text.
    pub smartypants: bool,
    /// Pass raw HTML in markdown through instead of escaping it.
    pub allow_raw_html: bool,
    /// Add slug `id`s to rendered headings.
    pub heading_ids: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            smartypants: true,
            allow_raw_html: true,
            heading_ids: true,
        }
    }
}

/// Trailing slash policy for page URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// Always end page URLs with `/`.
    Always,
    /// Never end page URLs with `/`.
    Never,
    /// Leave URLs as derived from the file path.
    #[default]
    Ignore,
}

/// Output layout for built pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildFormat {
    /// `page.html`
    File,
    /// `page/index.html`
    #[default]
    Directory,
    /// Mirror the source layout.
    Preserve,
}

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Base path the site is served from.
    pub base: String,
    /// Full site URL, when deployed under one.
    pub site: Option<String>,
    /// Trailing slash policy for page URLs.
    pub trailing_slash: TrailingSlash,
    /// Output layout for built pages.
    pub build_format: BuildFormat,
    /// Module specifier of the server runtime helpers.
    pub runtime_module: String,
    /// Module specifier of the framework error types.
    pub error_module: String,
    /// Markdown rendering options.
    pub markdown: MarkdownConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            base: "/".to_string(),
            site: None,
            trailing_slash: TrailingSlash::default(),
            build_format: BuildFormat::default(),
            runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
            error_module: DEFAULT_ERROR_MODULE.to_string(),
            markdown: MarkdownConfig::default(),
        }
    }
}

/// The on-disk path and public URL of a loaded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Module id without its query string.
    pub file_id: String,
    /// Public URL when the file is a page, `None` otherwise.
    pub file_url: Option<String>,
}

impl PluginConfig {
    /// Parses host-supplied JSON settings; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pathname the site is served under, always ending in `/`.
    pub fn site_pathname(&self) -> String {
        let pathname = match &self.site {
            Some(site) if !self.base.starts_with('/') => {
                let site_path = url_pathname(site);
                let dir = &site_path[..site_path.rfind('/').map_or(0, |idx| idx + 1)];
                format!("{}{}", dir, self.base)
            }
            _ => self.base.clone(),
        };
        append_forward_slash(pathname)
    }

    /// Derives the file path and page URL for a module id.
    ///
    /// Only files under a `pages/` directory get a URL: the part after
    /// `/pages/` is rebased onto the site pathname, the markdown extension
    /// and a trailing `/index` are dropped, then the trailing-slash and build
    /// format policies apply.
    pub fn file_info(&self, id: &str) -> FileInfo {
        let file_id = strip_query(id).to_string();
        let file_url = file_id
            .find("/pages/")
            .map(|idx| {
                let mut url = self.site_pathname();
                url.push_str(&file_id[idx + "/pages/".len()..]);
                strip_page_suffix(&url).to_string()
            })
            .map(|url| {
                if url.is_empty() {
                    return url;
                }
                let url = match self.trailing_slash {
                    TrailingSlash::Always => append_forward_slash(url),
                    _ => url,
                };
                match self.build_format {
                    BuildFormat::File => format!("{}.html", url),
                    _ => url,
                }
            });

        FileInfo { file_id, file_url }
    }
}

fn strip_page_suffix(url: &str) -> &str {
    let Some((stem, ext)) = url.rsplit_once('.') else {
        return url;
    };
    if ext != "astro" && !MARKDOWN_EXTENSIONS.contains(&ext) {
        return url;
    }
    stem.strip_suffix("/index").unwrap_or(stem)
}

fn url_pathname(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .find('/')
        .map_or("/", |idx| &without_scheme[idx..]);
    path.split(['?', '#']).next().unwrap_or("/")
}

fn append_forward_slash(mut path: String) -> String {
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}
