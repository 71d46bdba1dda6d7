//! Block tokenizer
//!
//! Turns normalized text into block nodes. The tokenizer is a small state
//! machine with three mutually exclusive modes, each selecting its own rule
//! subset:
//!
//!     Default      top-level document
//!     List         body of a list item (plain text lines instead of paragraphs)
//!     BlockQuote   body of a quote (no link definitions)
//!
//! Nesting is handled by re-invoking the tokenizer on the stripped body of a
//! list item or quote with the child mode, never by combining modes.
//!
//! Every matched node passes through [`RuleHooks::accept`], which runs the
//! post-processing for its kind before tokenization resumes. Inline fields
//! are not parsed here: they are recorded as deferred fields and parsed once
//! the whole link table is known (see [`resolve`](super::resolve)).

mod list;
mod table;

use super::links::LinkTable;
use crate::markdown::ast::{Attribute, DeferredField, GrammarError, Node, NodeKind, NodeList};
use crate::markdown::rules::{markdown_rules, RuleHooks, RuleSet, BLOCK, LIST_BLOCK, QUOTE_BLOCK};
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_INDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ {4}").unwrap());
static QUOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ *> ?").unwrap());
static SLUG_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").unwrap());
static SLUG_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]+").unwrap());

/// Raw HTML blocks whose content is never parsed as Markdown.
const VERBATIM_TAGS: &[&str] = &["pre", "script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    Default,
    List,
    BlockQuote,
}

impl BlockMode {
    fn entry(self) -> &'static str {
        match self {
            BlockMode::Default => BLOCK,
            BlockMode::List => LIST_BLOCK,
            BlockMode::BlockQuote => QUOTE_BLOCK,
        }
    }
}

pub struct BlockLexer<'l> {
    mode: BlockMode,
    links: &'l mut LinkTable,
}

impl<'l> BlockLexer<'l> {
    pub fn new(mode: BlockMode, links: &'l mut LinkTable) -> Self {
        Self { mode, links }
    }

    /// Tokenize `text`, whose first line is source line `line`.
    pub fn tokenize(&mut self, text: &str, line: usize) -> Result<NodeList, GrammarError> {
        markdown_rules().repeat_named(self.mode.entry(), text, line, self)
    }

    fn nested(&mut self, mode: BlockMode, text: &str, line: usize) -> Result<NodeList, GrammarError> {
        tracing::trace!(?mode, line, "entering nested block");
        BlockLexer::new(mode, self.links).tokenize(text, line)
    }

    fn quote(&mut self, node: &mut Node) -> Result<(), GrammarError> {
        let body = QUOTE_MARKER.replace_all(&node.span, "");
        let mode = if self.mode == BlockMode::List {
            BlockMode::List
        } else {
            BlockMode::BlockQuote
        };
        let children = self.nested(mode, &body, node.start_line)?;
        node.attributes.insert("text", Attribute::List(children));
        Ok(())
    }

    fn define(&mut self, node: &Node) {
        if let (Some(label), Some(href)) = (node.text("link"), node.text("href")) {
            self.links.define(label, href, node.text("title"));
        }
    }
}

/// Tokenize a whole normalized document, filling `links` with its definitions.
pub fn tokenize_blocks(text: &str, links: &mut LinkTable) -> Result<NodeList, GrammarError> {
    BlockLexer::new(BlockMode::Default, links).tokenize(text, 1)
}

impl RuleHooks for BlockLexer<'_> {
    fn expand(
        &mut self,
        _rules: &RuleSet<'_>,
        sub_rule: &'static str,
        text: &str,
        line: usize,
    ) -> Result<Attribute, GrammarError> {
        Ok(Attribute::Deferred(DeferredField {
            rule: sub_rule,
            text: text.to_string(),
            line,
        }))
    }

    fn accept(&mut self, mut node: Node, out: &mut NodeList) -> Result<usize, GrammarError> {
        let consumed = node.span.len();
        match node.kind {
            NodeKind::Space => {
                // A lone newline only separates blocks.
                if consumed > 1 {
                    out.push(node);
                }
            }
            NodeKind::BlockCode => {
                let code = CODE_INDENT.replace_all(&node.span, "");
                let code = code.trim_end_matches('\n').to_string();
                node.set_text("code", code);
                out.push(node);
            }
            NodeKind::Fences => {
                if !matches!(node.attribute("code"), Some(Attribute::Text(_))) {
                    node.set_text("code", "");
                }
                out.push(node);
            }
            NodeKind::Heading => {
                let level = node.text("depth").map_or(1, str::len);
                heading(&mut node, level);
                out.push(node);
            }
            NodeKind::LineHeading => {
                let level = if node.text("depth") == Some("=") { 1 } else { 2 };
                heading(&mut node, level);
                out.push(node);
            }
            NodeKind::NoPipeTable | NodeKind::Table => {
                table::build_table(&mut node);
                out.push(node);
            }
            NodeKind::BlockQuote => {
                self.quote(&mut node)?;
                out.push(node);
            }
            NodeKind::List => {
                list::build_list(self, &mut node)?;
                out.push(node);
            }
            NodeKind::Html => {
                html(&mut node);
                out.push(node);
            }
            NodeKind::Definition => self.define(&node),
            NodeKind::Paragraph => {
                if let Some(Attribute::Deferred(field)) = node.attributes.get_mut("text") {
                    if field.text.ends_with('\n') {
                        field.text.pop();
                    }
                }
                out.push(node);
            }
            NodeKind::BlockText => merge_text(node, out),
            _ => out.push(node),
        }
        Ok(consumed)
    }
}

/// The anchor id needs the rendered text and is set by [`resolve`](super::resolve).
fn heading(node: &mut Node, level: usize) {
    node.set_text("level", level.to_string());
}

/// Heading anchor id: lower-cased, tags removed, non-word runs collapsed to `-`.
pub fn slug(text: &str) -> String {
    let lower = text.to_lowercase();
    let untagged = SLUG_TAGS.replace_all(&lower, "");
    SLUG_NON_WORD.replace_all(&untagged, "-").into_owned()
}

fn html(node: &mut Node) {
    let verbatim = node
        .text("pre")
        .map_or(false, |tag| VERBATIM_TAGS.iter().any(|v| tag.eq_ignore_ascii_case(v)));
    let value = if verbatim {
        Attribute::Text(node.span.clone())
    } else {
        Attribute::Deferred(DeferredField {
            rule: crate::markdown::rules::INLINE,
            text: node.span.clone(),
            line: node.start_line,
        })
    };
    node.attributes.insert("text", value);
}

/// Plain lines directly after a plain line join it, so they are inline-parsed as one run.
fn merge_text(node: Node, out: &mut NodeList) {
    if let Some(previous) = out.last_mut().filter(|n| n.kind == NodeKind::BlockText) {
        if let (Some(Attribute::Deferred(field)), Some(text)) = (
            previous.attributes.get_mut("text"),
            node.attribute("text").and_then(Attribute::source_text),
        ) {
            field.text.push('\n');
            field.text.push_str(text);
        }
        let mut span = std::mem::take(&mut previous.span);
        span.push('\n');
        span.push_str(&node.span);
        previous.set_span(span);
        return;
    }
    out.push(node);
}
