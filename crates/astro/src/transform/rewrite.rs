//! HTML post-processing with lol_html: heading ids and image placeholders.

use crate::error::RenderError;
use crate::processor::Heading;
use indexmap::IndexSet;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashMap;

/// Attribute that marks a local image for the generated module to fill in.
pub const IMAGE_PLACEHOLDER_ATTR: &str = "__ASTRO_IMAGE_";

/// The placeholder as lol_html writes it: attribute names are lowercased on
/// output, so the pass sets this form and [`restore_placeholder_case`] puts
/// the generated module's spelling back.
const LOWERCASE_PLACEHOLDER_ATTR: &str = "__astro_image_";

/// Characters the renderer leaves unencoded in URLs.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'%')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

/// What the rewrite pass should do.
#[derive(Debug, Clone, Copy)]
pub struct RewritePlan<'a> {
    /// Headings in document order whose slugs become `id`s; `None` leaves
    /// headings untouched.
    pub headings: Option<&'a [Heading]>,
    /// Raw local image paths to swap for placeholders.
    pub images: &'a IndexSet<String>,
}

impl RewritePlan<'_> {
    fn is_noop(&self) -> bool {
        self.headings.is_none_or(|h| h.is_empty()) && self.images.is_empty()
    }
}

/// Applies `plan` to `html`.
///
/// Headings are matched to the plan in order by depth, so raw HTML headings
/// that already carry an `id` are skipped. Every `<img>` whose `src` is one
/// of the planned images loses its `src` and gains
/// `__ASTRO_IMAGE_="<raw path>"` instead.
pub fn rewrite_html(html: &str, plan: &RewritePlan<'_>) -> Result<String, RenderError> {
    if plan.is_noop() {
        return Ok(html.to_string());
    }

    let sources = image_sources(plan.images);
    let mut headings = plan.headings.unwrap_or_default().iter().peekable();

    let mut handlers = Vec::new();
    if plan.headings.is_some() {
        handlers.push(element!("h1, h2, h3, h4, h5, h6", |el| {
            if el.has_attribute("id") {
                return Ok(());
            }
            let depth = el
                .tag_name()
                .trim_start_matches(['h', 'H'])
                .parse::<u8>()
                .unwrap_or_default();
            if let Some(heading) = headings.next_if(|h| h.depth == depth) {
                el.set_attribute("id", &heading.slug)?;
            }
            Ok(())
        }));
    }
    if !sources.is_empty() {
        handlers.push(element!("img[src]", |el| {
            let Some(src) = el.get_attribute("src") else {
                return Ok(());
            };
            if let Some(raw) = sources.get(src.as_str()) {
                el.remove_attribute("src");
                el.set_attribute(LOWERCASE_PLACEHOLDER_ATTR, raw)?;
            }
            Ok(())
        }));
    }

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| RenderError::Rewrite(err.to_string()))?;

    Ok(if plan.images.is_empty() {
        rewritten
    } else {
        restore_placeholder_case(&rewritten)
    })
}

/// Rewrites ` __astro_image_="` back to ` __ASTRO_IMAGE_="`.
///
/// Only the attribute form (leading space, `="`) is touched; a literal `"`
/// never appears in rendered text, which the renderer writes as `&quot;`.
fn restore_placeholder_case(html: &str) -> String {
    html.replace(
        &format!(" {}=\"", LOWERCASE_PLACEHOLDER_ATTR),
        &format!(" {}=\"", IMAGE_PLACEHOLDER_ATTR),
    )
}

/// Maps every form a raw path can take in a rendered `src` back to the raw
/// path: as written, percent-encoded, and percent-encoded then escaped.
fn image_sources(images: &IndexSet<String>) -> HashMap<String, &str> {
    let mut sources = HashMap::new();
    for raw in images {
        let encoded = utf8_percent_encode(raw, URL_SAFE).to_string();
        let escaped = html_escape::encode_double_quoted_attribute(&encoded).into_owned();
        for form in [escaped, encoded, raw.clone()] {
            sources.entry(form).or_insert(raw.as_str());
        }
    }
    sources
}
