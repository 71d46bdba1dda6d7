//! Table post-processing: header, alignment and body rows.
//!
//! The header row sits on the table's first line and body rows start two lines
//! below it, one line each.

use crate::markdown::ast::{Attribute, DeferredField, Node, NodeKind, NodeList};
use crate::markdown::rules::INLINE;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_EDGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *| *\| *$").unwrap());
static ALIGN_EDGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *|\| *$").unwrap());
static ROW_EDGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *\| *| *\| *$").unwrap());
static CELLS_TRAILER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?: *\| *)?\n$").unwrap());
static CELL_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r" *\| *").unwrap());

static ALIGN_RIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *-+: *$").unwrap());
static ALIGN_CENTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *:-+: *$").unwrap());
static ALIGN_LEFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ *:-+ *$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    None,
}

impl Alignment {
    pub fn classify(cell: &str) -> Self {
        if ALIGN_RIGHT.is_match(cell) {
            Alignment::Right
        } else if ALIGN_CENTER.is_match(cell) {
            Alignment::Center
        } else if ALIGN_LEFT.is_match(cell) {
            Alignment::Left
        } else {
            Alignment::None
        }
    }

    fn as_style(self) -> Option<&'static str> {
        match self {
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
            Alignment::None => None,
        }
    }
}

/// Replace the raw `header`/`align`/`cells` captures with row and cell nodes.
pub(super) fn build_table(node: &mut Node) {
    let header = node.text("header").unwrap_or_default().to_string();
    let align = node.text("align").unwrap_or_default().to_string();
    let cells = node.text("cells").unwrap_or_default().to_string();

    let alignment: Vec<Alignment> = split_cells(&ALIGN_EDGES.replace_all(&align, ""))
        .iter()
        .map(|cell| Alignment::classify(cell))
        .collect();

    let header_cells = split_cells(&HEADER_EDGES.replace_all(&header, ""));
    let header_row = row(&header, &header_cells, &alignment, node.start_line, true);

    let mut body = NodeList::new("TableBody");
    let cells = CELLS_TRAILER.replace(&cells, "");
    if !cells.is_empty() {
        for (index, line) in cells.split('\n').enumerate() {
            let row_cells = split_cells(&ROW_EDGES.replace_all(line, ""));
            body.push(row(
                line,
                &row_cells,
                &alignment,
                node.start_line + 2 + index,
                false,
            ));
        }
    }

    node.attributes.remove("align");
    node.attributes.remove("cells");
    node.attributes
        .insert("header", Attribute::Node(Box::new(header_row)));
    node.attributes.insert("body", Attribute::List(body));
}

fn split_cells(text: &str) -> Vec<String> {
    CELL_SEPARATOR.split(text).map(str::to_string).collect()
}

fn row(span: &str, cells: &[String], alignment: &[Alignment], line: usize, header: bool) -> Node {
    let mut content = NodeList::new("TableCells");
    for (index, text) in cells.iter().enumerate() {
        let mut cell = Node::new(NodeKind::TableCell, text.clone(), line).with_attribute(
            "text",
            Attribute::Deferred(DeferredField {
                rule: INLINE,
                text: text.clone(),
                line,
            }),
        );
        cell.set_flag("header", header);
        if let Some(style) = alignment.get(index).and_then(|a| a.as_style()) {
            cell.set_text("align", style);
        }
        content.push(cell);
    }
    Node::new(NodeKind::TableRow, span, line).with_attribute("content", Attribute::List(content))
}
