//! The Markdown rule set
//!
//! Four entry points share one registry:
//!
//!     Block        top-level document blocks
//!     ListBlock    the body of a list item
//!     QuoteBlock   the body of a block quote
//!     Inline       inline content of paragraphs, headings, cells, ...
//!
//! Each entry point repeats a dispatch rule whose alternative order is the
//! precedence of the grammar. `Space` is the first alternative of every block
//! dispatch so that blank lines are consumed before anything else is tried.

use super::engine::{Rule, RuleSet};
use crate::markdown::ast::NodeKind;
use crate::markdown::grammar::{grammar, Grammar};
use once_cell::sync::Lazy;

pub const BLOCK: &str = "Block";
pub const LIST_BLOCK: &str = "ListBlock";
pub const QUOTE_BLOCK: &str = "QuoteBlock";
pub const INLINE: &str = "Inline";

const BLOCK_ELEMENT: &[&str] = &[
    "Space",
    "BlockCode",
    "Fences",
    "Heading",
    "NoPipeTable",
    "LineHeading",
    "HorizontalRule",
    "BlockQuote",
    "List",
    "Html",
    "Definition",
    "Table",
    "Paragraph",
    "PlainParagraph",
];

/// Inside list items: no tables, no definitions, and plain lines instead of paragraphs.
const LIST_BLOCK_ELEMENT: &[&str] = &[
    "Space",
    "BlockCode",
    "Fences",
    "Heading",
    "LineHeading",
    "HorizontalRule",
    "BlockQuote",
    "List",
    "Html",
    "BlockText",
];

/// Inside block quotes: definitions are not recognized.
const QUOTE_BLOCK_ELEMENT: &[&str] = &[
    "Space",
    "BlockCode",
    "Fences",
    "Heading",
    "NoPipeTable",
    "LineHeading",
    "HorizontalRule",
    "BlockQuote",
    "List",
    "Html",
    "Table",
    "Paragraph",
    "PlainParagraph",
];

/// Math comes before escapes, otherwise `\\(` would be read as an escaped backslash.
const INLINE_ELEMENT: &[&str] = &[
    "InlineMath",
    "BlockMath",
    "Escape",
    "AutoLink",
    "Url",
    "Tag",
    "Link",
    "ReferenceLink",
    "NoTextRefLink",
    "StrongUs",
    "StrongAs",
    "EmUs",
    "EmAs",
    "InlineCode",
    "Break",
    "Del",
    "InlineText",
];

/// Build the Markdown rule set over a compiled grammar.
pub fn build_rules(grammar: &Grammar) -> RuleSet<'_> {
    let block = &grammar.block;
    let inline = &grammar.inline;

    RuleSet::new(BLOCK)
        .repeat(BLOCK, "BlockElement")
        .repeat(LIST_BLOCK, "ListBlockElement")
        .repeat(QUOTE_BLOCK, "QuoteBlockElement")
        .repeat(INLINE, "InlineElement")
        .dispatch("BlockElement", BLOCK_ELEMENT)
        .dispatch("ListBlockElement", LIST_BLOCK_ELEMENT)
        .dispatch("QuoteBlockElement", QUOTE_BLOCK_ELEMENT)
        .dispatch("InlineElement", INLINE_ELEMENT)
        // Block rules
        .rule(Rule::new("Space", NodeKind::Space, &block.newline))
        .rule(Rule::new("BlockCode", NodeKind::BlockCode, &block.code))
        .rule(Rule::new("Fences", NodeKind::Fences, &block.fences))
        .rule(Rule::new("Heading", NodeKind::Heading, &block.heading).with_sub_rule("text", INLINE))
        .rule(Rule::new("NoPipeTable", NodeKind::NoPipeTable, &block.nptable))
        .rule(
            Rule::new("LineHeading", NodeKind::LineHeading, &block.lheading)
                .with_sub_rule("text", INLINE),
        )
        .rule(Rule::new("HorizontalRule", NodeKind::HorizontalRule, &block.hr))
        .rule(Rule::new("BlockQuote", NodeKind::BlockQuote, &block.blockquote))
        .rule(Rule::new("List", NodeKind::List, &block.list))
        .rule(Rule::new("Html", NodeKind::Html, &block.html))
        .rule(Rule::new("Definition", NodeKind::Definition, &block.def))
        .rule(Rule::new("Table", NodeKind::Table, &block.table))
        .rule(
            Rule::new("Paragraph", NodeKind::Paragraph, &block.paragraph)
                .with_sub_rule("text", INLINE),
        )
        .rule(
            Rule::new("PlainParagraph", NodeKind::Paragraph, &block.plain_paragraph)
                .with_sub_rule("text", INLINE),
        )
        .rule(Rule::new("BlockText", NodeKind::BlockText, &block.text).with_sub_rule("text", INLINE))
        // Inline rules
        .rule(Rule::new("InlineMath", NodeKind::InlineMath, &inline.inline_math))
        .rule(Rule::new("BlockMath", NodeKind::BlockMath, &inline.block_math))
        .rule(Rule::new("Escape", NodeKind::Escape, &inline.escape))
        .rule(Rule::new("AutoLink", NodeKind::AutoLink, &inline.autolink))
        .rule(Rule::new("Url", NodeKind::Url, &inline.url))
        .rule(Rule::new("Tag", NodeKind::Tag, &inline.tag))
        .rule(Rule::new("Link", NodeKind::Link, &inline.link))
        .rule(Rule::new("ReferenceLink", NodeKind::ReferenceLink, &inline.reflink))
        .rule(Rule::new("NoTextRefLink", NodeKind::NoTextRefLink, &inline.nolink))
        .rule(Rule::new("StrongUs", NodeKind::StrongUs, &inline.strong_us).with_sub_rule("text", INLINE))
        .rule(Rule::new("StrongAs", NodeKind::StrongAs, &inline.strong_as).with_sub_rule("text", INLINE))
        .rule(Rule::new("EmUs", NodeKind::EmUs, &inline.em_us).with_sub_rule("text", INLINE))
        .rule(Rule::new("EmAs", NodeKind::EmAs, &inline.em_as).with_sub_rule("text", INLINE))
        .rule(Rule::new("InlineCode", NodeKind::InlineCode, &inline.code))
        .rule(Rule::new("Break", NodeKind::Break, &inline.br))
        .rule(Rule::new("Del", NodeKind::Del, &inline.del).with_sub_rule("text", INLINE))
        .rule(Rule::new("InlineText", NodeKind::InlineText, &inline.text))
}

static MARKDOWN_RULES: Lazy<RuleSet<'static>> = Lazy::new(|| {
    let rules = build_rules(grammar());
    tracing::debug!("markdown rule set registered");
    rules
});

/// The process-wide Markdown rule set.
pub fn markdown_rules() -> &'static RuleSet<'static> {
    &MARKDOWN_RULES
}
