//! Heading and image-reference extraction from a parsed tree.

use super::Heading;
use indexmap::IndexSet;
use markdown::mdast::Node;
use mdmod_core::{Slugger, is_local_image_path};
use std::collections::HashMap;

/// Everything the renderer needs from the tree besides the HTML itself.
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub(crate) headings: Vec<Heading>,
    pub(crate) images: IndexSet<String>,
}

/// Walks `tree` in document order.
pub(crate) fn collect(tree: &Node) -> Collected {
    let mut definitions = HashMap::new();
    collect_definitions(tree, &mut definitions);

    let mut collector = Collector {
        definitions,
        slugger: Slugger::new(),
        out: Collected::default(),
    };
    collector.visit(tree);
    collector.out
}

struct Collector<'a> {
    definitions: HashMap<&'a str, &'a str>,
    slugger: Slugger,
    out: Collected,
}

impl<'a> Collector<'a> {
    fn visit(&mut self, node: &'a Node) {
        match node {
            Node::Heading(heading) => {
                let text = plain_text(&heading.children);
                let slug = self.slugger.slug(&text);
                self.out.headings.push(Heading {
                    depth: heading.depth,
                    slug,
                    text,
                });
            }
            Node::Image(image) => self.add_image(&image.url),
            Node::ImageReference(reference) => {
                if let Some(url) = self.definitions.get(reference.identifier.as_str()) {
                    self.add_image(url);
                }
            }
            _ => {}
        }

        if let Some(children) = node.children() {
            for child in children {
                self.visit(child);
            }
        }
    }

    fn add_image(&mut self, url: &str) {
        if is_local_image_path(url) {
            self.out.images.insert(url.to_string());
        }
    }
}

fn collect_definitions<'a>(node: &'a Node, out: &mut HashMap<&'a str, &'a str>) {
    if let Node::Definition(definition) = node {
        // First definition wins, as in CommonMark.
        out.entry(definition.identifier.as_str())
            .or_insert(definition.url.as_str());
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, out);
        }
    }
}

/// Plain text of inline content (used for heading text and slugs).
fn plain_text(nodes: &[Node]) -> String {
    fn walk(node: &Node, buffer: &mut String) {
        match node {
            Node::Text(text) => buffer.push_str(&text.value),
            Node::InlineCode(code) => buffer.push_str(&code.value),
            Node::Image(image) => buffer.push_str(&image.alt),
            other => {
                if let Some(children) = other.children() {
                    for child in children {
                        walk(child, buffer);
                    }
                }
            }
        }
    }

    let mut text = String::new();
    for node in nodes {
        walk(node, &mut text);
    }
    text.trim().to_string()
}
