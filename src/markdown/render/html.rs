//! HTML renderer
//!
//! Walks the tree bottom-up: every attribute of a node is rendered first
//! (lists concatenate their children, nested nodes use their own template),
//! then the node's template is evaluated over the rendered values.
//!
//! With `include_lines`, each node gets a `source_line` field holding its
//! 1-indexed start line. Closing raw tags never get one.

use super::escape::escape;
use super::math::{MathCache, MathEngine};
use super::template::Fields;
use super::templates::template_for;
use crate::markdown::ast::{Attribute, Node, NodeKind, NodeList};
use crate::markdown::{toc, Document, Options};
use rand::Rng;
use std::sync::Arc;

const CONTAINER_ID: &str = "markdown-container";

#[derive(Clone)]
struct MathHook {
    engine: Arc<dyn MathEngine>,
    cache: Arc<MathCache>,
}

#[derive(Clone)]
pub struct Renderer {
    options: Options,
    math: Option<MathHook>,
}

impl Renderer {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            math: None,
        }
    }

    /// Fill math placeholders with `engine` output, memoized in `cache`.
    pub fn with_math(mut self, engine: Arc<dyn MathEngine>, cache: Arc<MathCache>) -> Self {
        self.math = Some(MathHook { engine, cache });
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Render a whole document, applying TOC expansion and wrapping as configured.
    pub fn render(&self, document: &Document) -> String {
        let mut html = self.render_blocks(&document.blocks);
        if self.options.expand_toc {
            html = match toc::expand_toc(&html) {
                Ok(expanded) => expanded,
                Err(err) => {
                    tracing::warn!(error = %err, "table of contents not rendered");
                    html
                }
            };
        }
        if self.options.wrap_in_html {
            html = wrap_document(&html);
        }
        html
    }

    /// Render a node list to an HTML fragment.
    pub fn render_blocks(&self, blocks: &NodeList) -> String {
        let mut rng = rand::thread_rng();
        self.render_list(blocks, &mut rng)
    }

    fn render_list<R: Rng>(&self, list: &NodeList, rng: &mut R) -> String {
        list.iter().map(|node| self.render_node(node, rng)).collect()
    }

    fn render_node<R: Rng>(&self, node: &Node, rng: &mut R) -> String {
        let mut fields = Fields::new();
        for (key, value) in &node.attributes {
            let rendered = match value {
                Attribute::Text(text) => text.clone(),
                Attribute::Node(child) => self.render_node(child, rng),
                Attribute::List(list) => self.render_list(list, rng),
                Attribute::Deferred(field) => {
                    tracing::warn!(kind = %node.kind, field = *key, "rendering unparsed field");
                    escape(&field.text, false)
                }
                Attribute::Missing => continue,
            };
            fields.insert(*key, rendered);
        }

        let closing_tag = node.kind == NodeKind::Tag && node.flag("is_closing");
        if self.options.include_lines && !closing_tag {
            fields.insert("source_line", node.start_line.to_string());
        }
        if let Some(rendered) = self.math(node) {
            fields.insert("rendered", rendered);
        }

        template_for(node.kind).render(&fields, rng)
    }

    fn math(&self, node: &Node) -> Option<String> {
        let display = match node.kind {
            NodeKind::InlineMath => false,
            NodeKind::BlockMath => true,
            _ => return None,
        };
        let hook = self.math.as_ref()?;
        let latex = node.text("latex")?;
        let html = match hook.cache.get_or_render(hook.engine.as_ref(), latex, display) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!(latex, error = %err, "math rendering failed");
                format!(r#"<span class="math-error">{}</span>"#, escape(&err.message, false))
            }
        };
        Some(html)
    }
}

/// Wrap an HTML fragment in a minimal standalone page.
pub fn wrap_document(html: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head></head>\n<body>\n<div id=\"{}\">{}</div>\n</body>\n</html>\n",
        CONTAINER_ID, html
    )
}
