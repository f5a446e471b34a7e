//! Astro component module generation.
//!
//! A module is first described as a [`ModuleIr`] by [`module_ir`], then
//! serialized by [`emit`]. Document-derived text only ever enters the IR as
//! string or JSON literals; the emitter's final pass neutralizes environment
//! references in one place.

mod emit;
mod ir;

pub use emit::{emit, js_string_literal, neutralize_env_references};
pub use ir::{Expr, Import, Item, ModuleIr, Stmt};

use crate::images::ImageBinding;
use crate::processor::Heading;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Runtime helpers imported by every generated module.
const RUNTIME_IMPORTS: &[&str] = &[
    "unescapeHTML",
    "spreadAttributes",
    "createComponent",
    "render",
    "renderComponent",
    "maybeRenderHead",
];

const UPDATE_IMAGE_REFERENCES: &str = r#"return images().then((images) => {
  return html.replaceAll(/__ASTRO_IMAGE_="([^"]+)"/gm, (full, imagePath) =>
    spreadAttributes({
      src: images[imagePath].src,
      ...images[imagePath].attributes,
    })
  );
});"#;

const CONTENT_WITH_LAYOUT: &str = r#"createComponent((result, _props, slots) => {
  const { layout, ...content } = frontmatter;
  content.file = file;
  content.url = url;

  return render`${renderComponent(result, 'Layout', Layout, {
    file,
    url,
    content,
    frontmatter: content,
    headings: getHeadings(),
    rawContent,
    compiledContent,
    'server:root': true,
  }, {
    'default': () => render`${unescapeHTML(html)}`
  })}`;
})"#;

const CONTENT_WITHOUT_LAYOUT: &str = r#"createComponent((result, _props, slots) => {
  const { layout, ...content } = frontmatter;
  content.file = file;
  content.url = url;

  return render`${maybeRenderHead(result)}${unescapeHTML(html)}`;
})"#;

/// Everything one generated module is built from.
#[derive(Debug, Clone, Copy)]
pub struct ModuleInput<'a> {
    /// Module id without query; exported as `file`.
    pub file_id: &'a str,
    /// Public page URL; exported as `url` (`undefined` when `None`).
    pub file_url: Option<&'a str>,
    /// Markdown body; returned by `rawContent()`.
    pub raw_content: &'a str,
    /// Rendered HTML with image placeholders.
    pub html: &'a str,
    /// Final frontmatter; exported as `frontmatter`.
    pub frontmatter: &'a Map<String, JsonValue>,
    /// Returned by `getHeadings()`.
    pub headings: &'a [Heading],
    /// Images to import and substitute.
    pub images: &'a [ImageBinding],
    /// Specifier of the server runtime helpers.
    pub runtime_module: &'a str,
    /// Specifier of the framework error types.
    pub error_module: &'a str,
}

impl ModuleInput<'_> {
    /// The layout specifier, when `frontmatter.layout` is a non-empty string.
    pub fn layout(&self) -> Option<&str> {
        self.frontmatter
            .get("layout")
            .and_then(JsonValue::as_str)
            .filter(|layout| !layout.is_empty())
    }
}

/// Generates the module source for `input`. Deterministic.
pub fn generate_module(input: &ModuleInput<'_>) -> String {
    emit(&module_ir(input))
}

/// Builds the IR of the module for `input`.
pub fn module_ir(input: &ModuleInput<'_>) -> ModuleIr {
    let mut module = ModuleIr::default();
    let layout = input.layout();

    module
        .import(Import::named(RUNTIME_IMPORTS.iter().copied(), input.runtime_module))
        .import(Import::named(
            ["AstroError", "AstroErrorData"],
            input.error_module,
        ));
    if let Some(layout) = layout {
        module.import(Import::default_from("Layout", layout));
    }
    module.import(Import::named(["getImage"], "astro:assets"));
    for image in input.images {
        module.import(Import::default_from(
            image_binding(image),
            image.resolved(),
        ));
    }

    let table = input
        .images
        .iter()
        .map(|image| {
            (
                image.raw.clone(),
                Expr::Raw(format!("await getImage({{src: {}}})", image_binding(image))),
            )
        })
        .collect();

    module
        .item(function(false, true, "images", &[], vec![Stmt::Return(Expr::Object(table))]))
        .item(function(
            false,
            true,
            "updateImageReferences",
            &["html"],
            vec![Stmt::Raw(UPDATE_IMAGE_REFERENCES.to_string())],
        ))
        .item(constant(
            false,
            "html",
            Expr::Call {
                callee: "updateImageReferences".into(),
                args: vec![Expr::Str(input.html.to_string())],
                awaited: true,
            },
        ))
        .item(constant(
            true,
            "frontmatter",
            Expr::Json(JsonValue::Object(input.frontmatter.clone())),
        ))
        .item(constant(true, "file", Expr::Str(input.file_id.to_string())))
        .item(constant(true, "url", Expr::optional_str(input.file_url)))
        .item(function(
            true,
            false,
            "rawContent",
            &[],
            vec![Stmt::Return(Expr::Str(input.raw_content.to_string()))],
        ))
        .item(function(
            true,
            false,
            "compiledContent",
            &[],
            vec![Stmt::Return(Expr::Raw("html".into()))],
        ))
        .item(function(
            true,
            false,
            "getHeadings",
            &[],
            vec![Stmt::Return(Expr::Json(
                serde_json::to_value(input.headings).unwrap_or_default(),
            ))],
        ))
        .item(constant(
            true,
            "Content",
            Expr::Raw(
                if layout.is_some() {
                    CONTENT_WITH_LAYOUT
                } else {
                    CONTENT_WITHOUT_LAYOUT
                }
                .to_string(),
            ),
        ))
        .item(Item::ExportDefault("Content".into()));

    module
}

fn image_binding(image: &ImageBinding) -> String {
    format!("Astro__{}", image.safe_name)
}

fn constant(export: bool, name: &str, value: Expr) -> Item {
    Item::Const {
        export,
        name: name.to_string(),
        value,
    }
}

fn function(export: bool, is_async: bool, name: &str, params: &[&str], body: Vec<Stmt>) -> Item {
    Item::Function {
        export,
        is_async,
        name: name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
        body,
    }
}

/// Side-channel metadata returned alongside the generated code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleMeta {
    /// Framework metadata.
    pub astro: AstroMeta,
    /// Bundler metadata.
    pub vite: ViteMeta,
}

/// Framework metadata of a markdown module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstroMeta {
    /// Always empty for markdown.
    pub hydrated_components: Vec<String>,
    /// Always empty for markdown.
    pub client_only_components: Vec<String>,
    /// Always empty for markdown.
    pub scripts: Vec<String>,
    /// Head propagation mode.
    pub propagation: Propagation,
    /// Whether the module renders its own `<head>`.
    pub contains_head: bool,
    /// Per-page route options.
    pub page_options: Map<String, JsonValue>,
}

/// How a component propagates head content. Markdown modules never do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Propagation {
    /// No head propagation.
    #[default]
    None,
}

/// Bundler metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViteMeta {
    /// Language the generated code is parsed as.
    pub lang: String,
}

impl Default for ViteMeta {
    fn default() -> Self {
        Self {
            lang: "ts".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::Resolution;
    use crate::transform::rewrite::IMAGE_PLACEHOLDER_ATTR;
    use serde_json::json;

    fn frontmatter(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("frontmatter must be an object"),
        }
    }

    fn input<'a>(
        frontmatter: &'a Map<String, JsonValue>,
        images: &'a [ImageBinding],
        headings: &'a [Heading],
    ) -> ModuleInput<'a> {
        ModuleInput {
            file_id: "/site/src/pages/post.md",
            file_url: Some("/post"),
            raw_content: "# Hello\n",
            html: "<h1 id=\"hello\">Hello</h1>",
            frontmatter,
            headings,
            images,
            runtime_module: "astro/runtime/server/index.js",
            error_module: "astro/core/errors/index.js",
        }
    }

    #[test]
    fn module_without_layout() {
        let fm = Map::new();
        let code = generate_module(&input(&fm, &[], &[]));

        assert!(code.contains(
            "import { unescapeHTML, spreadAttributes, createComponent, render, renderComponent, maybeRenderHead } from \"astro/runtime/server/index.js\";"
        ));
        assert!(code.contains("import { AstroError, AstroErrorData } from \"astro/core/errors/index.js\";"));
        assert!(code.contains("import { getImage } from \"astro:assets\";"));
        assert!(code.contains("async function images() {\n  return {};\n}"));
        assert!(code.contains("export const frontmatter = {};"));
        assert!(code.contains("export const file = \"/site/src/pages/post.md\";"));
        assert!(code.contains("export const url = \"/post\";"));
        assert!(code.contains("export function rawContent() {\n  return \"# Hello\\n\";\n}"));
        assert!(code.contains("export function compiledContent() {\n  return html;\n}"));
        assert!(code.contains("${maybeRenderHead(result)}${unescapeHTML(html)}"));
        assert!(!code.contains("import Layout"));
        assert!(!code.contains("renderComponent(result, 'Layout'"));
        assert!(code.ends_with("export default Content;\n"));
    }

    #[test]
    fn module_with_layout() {
        let fm = frontmatter(json!({"layout": "../layouts/Post.astro", "title": "Hi"}));
        let code = generate_module(&input(&fm, &[], &[]));

        assert!(code.contains("import Layout from \"../layouts/Post.astro\";"));
        assert!(code.contains("renderComponent(result, 'Layout', Layout, {"));
        assert!(code.contains("headings: getHeadings(),"));
        assert!(code.contains("'server:root': true,"));
        assert!(!code.contains("maybeRenderHead(result)}"));
    }

    #[test]
    fn empty_or_non_string_layout_is_ignored() {
        for value in [json!(""), json!(3), json!(null)] {
            let fm = frontmatter(json!({ "layout": value }));
            assert_eq!(input(&fm, &[], &[]).layout(), None);
        }
    }

    #[test]
    fn image_bindings_are_imported_and_tabled() {
        let images = [ImageBinding {
            raw: "./hero.png".into(),
            resolution: Resolution::Resolved("/site/src/pages/hero.png".into()),
            safe_name: "abc".into(),
        }];
        let fm = Map::new();
        let code = generate_module(&input(&fm, &images, &[]));

        assert!(code.contains("import Astro__abc from \"/site/src/pages/hero.png\";"));
        assert!(code.contains("\"./hero.png\": await getImage({src: Astro__abc})"));
        assert!(code.contains(r#"html.replaceAll(/__ASTRO_IMAGE_="([^"]+)"/gm"#));
    }

    #[test]
    fn substitution_pattern_matches_the_rewrite_attribute() {
        let pattern = format!("/{}=\"([^\"]+)\"/gm", IMAGE_PLACEHOLDER_ATTR);
        assert!(UPDATE_IMAGE_REFERENCES.contains(&pattern));
    }

    #[test]
    fn headings_are_exported_as_json() {
        let headings = [Heading {
            depth: 2,
            slug: "intro".into(),
            text: "Intro".into(),
        }];
        let fm = Map::new();
        let code = generate_module(&input(&fm, &[], &headings));
        assert!(code.contains(r#"return [{"depth":2,"slug":"intro","text":"Intro"}];"#));
    }

    #[test]
    fn html_is_embedded_as_a_string_literal() {
        let fm = Map::new();
        let code = generate_module(&input(&fm, &[], &[]));
        assert!(code.contains(
            r#"const html = await updateImageReferences("<h1 id=\"hello\">Hello</h1>");"#
        ));
    }

    #[test]
    fn meta_serializes_with_framework_names() {
        let meta = serde_json::to_value(ModuleMeta::default()).unwrap();
        assert_eq!(
            meta,
            json!({
                "astro": {
                    "hydratedComponents": [],
                    "clientOnlyComponents": [],
                    "scripts": [],
                    "propagation": "none",
                    "containsHead": false,
                    "pageOptions": {}
                },
                "vite": {"lang": "ts"}
            })
        );
    }
}
