//! List post-processing
//!
//! A matched list span is split into items with the line-anchored item
//! pattern. Each item loses its bullet and the matching indentation of its
//! continuation lines, then its body is tokenized in list mode.
//!
//! Looseness is decided per item with one item of look-ahead: an item is
//! loose when it has an inner blank line, or when the previous item ended with
//! a blank line; a non-final item that ends with a blank line is loose too.
//! If any item of a list is loose, every item renders loose.

use super::{BlockLexer, BlockMode};
use crate::markdown::ast::{Attribute, GrammarError, Node, NodeKind, NodeList};
use crate::markdown::grammar::grammar;
use once_cell::sync::Lazy;
use regex::Regex;

static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *(?:[*+-]|\d+\.) +").unwrap());
static INNER_BLANK_LINE: Lazy<fancy_regex::Regex> =
    Lazy::new(|| fancy_regex::Regex::new(r"\n\n(?!\s*$)").unwrap());

pub(super) fn build_list(lexer: &mut BlockLexer<'_>, node: &mut Node) -> Result<(), GrammarError> {
    let ordered = node.text("bullet").map_or(false, |bullet| bullet.len() > 1);
    node.set_flag("ordered", ordered);
    node.set_text("list_type", if ordered { "ol" } else { "ul" });

    let items = merge_open_math(split_items(&node.span)?);
    let last = items.len().saturating_sub(1);
    let mut line = node.start_line;
    let mut previous_newline = false;
    let mut built = NodeList::new("ListItems");

    for (index, item) in items.into_iter().enumerate() {
        let body = strip_bullet(&item);
        let mut loose = previous_newline || has_inner_blank_line(&body)?;
        if index != last {
            previous_newline = body.ends_with('\n');
            loose = loose || previous_newline;
        }

        let children = lexer.nested(BlockMode::List, &body, line)?;
        let item_line = line;
        line += item.split('\n').count();

        let mut item_node = Node::new(NodeKind::ListItem, item, item_line)
            .with_attribute("text", Attribute::List(children));
        item_node.set_flag("loose", loose);
        built.push(item_node);
    }

    let loose = built.iter().any(|item| item.flag("loose"));
    for item in &mut built.nodes {
        item.set_flag("loose", loose);
        if !loose {
            mark_tight(item);
        }
    }

    node.attributes.insert("items", Attribute::List(built));
    Ok(())
}

fn split_items(span: &str) -> Result<Vec<String>, GrammarError> {
    let pattern = &grammar().block.item;
    pattern
        .regex()
        .find_iter(span)
        .map(|found| {
            found
                .map(|m| m.as_str().to_string())
                .map_err(|err| GrammarError::Backtrack {
                    rule: pattern.name().to_string(),
                    message: err.to_string(),
                })
        })
        .collect()
}

/// Join items whose math is still open with the items that follow, so a
/// formula spanning several bullets stays in one item. The bullet of each
/// joined item is dropped, so it continues the text instead of nesting a list.
fn merge_open_math(items: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(items.len());
    let mut items = items.into_iter();
    while let Some(mut item) = items.next() {
        while has_open_math(&item) {
            match items.next() {
                Some(next) => {
                    item.push('\n');
                    item.push_str(&BULLET_PREFIX.replace(&next, ""));
                }
                None => break,
            }
        }
        merged.push(item);
    }
    merged
}

fn has_open_math(item: &str) -> bool {
    item.matches("$$").count() % 2 == 1
        || item.matches(r"\\(").count() > item.matches(r"\\)").count()
}

fn strip_bullet(item: &str) -> String {
    let body = BULLET_PREFIX.replace(item, "").into_owned();
    if !body.contains("\n ") {
        return body;
    }
    let indent = item.len() - body.len();
    body.split('\n')
        .map(|line| {
            let spaces = line.bytes().take(indent).take_while(|b| *b == b' ').count();
            &line[spaces..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn has_inner_blank_line(body: &str) -> Result<bool, GrammarError> {
    INNER_BLANK_LINE
        .is_match(body)
        .map_err(|err| GrammarError::Backtrack {
            rule: "ListItem".to_string(),
            message: err.to_string(),
        })
}

/// Tight items render their text without paragraph wrapping.
fn mark_tight(item: &mut Node) {
    if let Some(Attribute::List(children)) = item.attributes.get_mut("text") {
        for child in &mut children.nodes {
            if child.kind == NodeKind::BlockText {
                child.set_flag("tight", true);
            }
        }
    }
}
