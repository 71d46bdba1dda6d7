//! Second pass: parse every deferred inline field.
//!
//! Runs after block tokenization, when every link definition of the document
//! is known, so a reference may appear before its definition.
//!
//! Heading ids are assigned here as well: they are slugged from the rendered
//! heading text, which only exists once the inline fields are parsed.

use super::block::slug;
use super::inline::{InlineLexer, InlineState};
use super::links::LinkTable;
use crate::markdown::ast::{Attribute, GrammarError, Node, NodeKind, NodeList};
use crate::markdown::render::Renderer;
use crate::markdown::rules::markdown_rules;
use crate::markdown::Options;

pub fn resolve_inlines(blocks: &mut NodeList, links: &LinkTable) -> Result<(), GrammarError> {
    resolve_list(blocks, links)?;
    assign_heading_ids(blocks, &Renderer::new(Options::default()));
    Ok(())
}

fn resolve_list(blocks: &mut NodeList, links: &LinkTable) -> Result<(), GrammarError> {
    for node in &mut blocks.nodes {
        resolve_node(node, links)?;
    }
    Ok(())
}

fn resolve_node(node: &mut Node, links: &LinkTable) -> Result<(), GrammarError> {
    for value in node.attributes.values_mut() {
        match value {
            Attribute::Deferred(field) => {
                let mut lexer = InlineLexer::new(links, InlineState::default());
                let parsed = markdown_rules().expand(field.rule, &field.text, field.line, &mut lexer)?;
                *value = parsed;
            }
            Attribute::Node(child) => resolve_node(child, links)?,
            Attribute::List(list) => resolve_list(list, links)?,
            Attribute::Text(_) | Attribute::Missing => {}
        }
    }
    Ok(())
}

/// Set `id` on every heading, nested ones included: the rendered inline text,
/// tags stripped, slugged.
fn assign_heading_ids(blocks: &mut NodeList, renderer: &Renderer) {
    for node in &mut blocks.nodes {
        assign_heading_id(node, renderer);
    }
}

fn assign_heading_id(node: &mut Node, renderer: &Renderer) {
    if matches!(node.kind, NodeKind::Heading | NodeKind::LineHeading) {
        let rendered = match node.attribute("text") {
            Some(Attribute::List(inline)) => renderer.render_blocks(inline),
            other => other
                .and_then(Attribute::source_text)
                .unwrap_or_default()
                .to_string(),
        };
        node.set_text("id", slug(&rendered));
        return;
    }
    for value in node.attributes.values_mut() {
        match value {
            Attribute::List(list) => assign_heading_ids(list, renderer),
            Attribute::Node(child) => assign_heading_id(child, renderer),
            _ => {}
        }
    }
}

/// Whether any deferred field is left anywhere under `blocks`.
pub fn has_deferred(blocks: &NodeList) -> bool {
    blocks.iter().any(node_has_deferred)
}

fn node_has_deferred(node: &Node) -> bool {
    node.attributes.values().any(|value| match value {
        Attribute::Deferred(_) => true,
        Attribute::Node(child) => node_has_deferred(child),
        Attribute::List(list) => has_deferred(list),
        Attribute::Text(_) | Attribute::Missing => false,
    })
}
