//! Markdown to HTML conversion
//!
//! The pipeline runs in four steps:
//!
//!     normalize   line endings, tabs, special spaces, blank lines
//!     block       block nodes in one of three modes; link definitions collected
//!     resolve     deferred inline fields parsed against the complete link table
//!     render      one compiled template per node kind, evaluated bottom-up
//!
//! All grammar, rule and template tables are built once per process and shared
//! read-only. The link table belongs to a single [`parse`] call, so any number
//! of documents can be converted concurrently.

pub mod ast;
pub mod config;
pub mod grammar;
pub mod lexing;
pub mod render;
pub mod rules;
pub mod testing;
pub mod toc;

use ast::{GrammarError, NodeList, SnapshotError};
use lexing::{normalize, resolve_inlines, tokenize_blocks, LinkTable};
use render::Renderer;
use serde::Serialize;
use thiserror::Error;

/// Conversion options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Stamp `data-source-line` on rendered tags.
    pub include_lines: bool,
    /// Wrap the fragment in a standalone HTML page.
    pub wrap_in_html: bool,
    /// Replace a `[TOC]` paragraph with the table of contents.
    pub expand_toc: bool,
}

/// A parsed document: its block nodes and the link definitions they refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub blocks: NodeList,
    pub links: LinkTable,
}

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Parse `source` into a fully resolved node tree.
pub fn parse(source: &str) -> Result<Document, MarkdownError> {
    let text = normalize(source);
    let mut links = LinkTable::new();
    let mut blocks = tokenize_blocks(&text, &mut links)?;
    resolve_inlines(&mut blocks, &links)?;
    tracing::debug!(
        blocks = blocks.len(),
        links = links.len(),
        "document parsed"
    );
    Ok(Document { blocks, links })
}

/// Render a parsed document.
pub fn render(document: &Document, options: &Options) -> String {
    Renderer::new(*options).render(document)
}

/// Convert Markdown `source` to HTML.
///
/// Fails as a whole when any part of the document cannot be tokenized; no
/// partial output is returned.
pub fn to_html(source: &str, options: &Options) -> Result<String, MarkdownError> {
    let document = parse(source)?;
    Ok(render(&document, options))
}
