//! AST nodes
//!
//! A [`Node`] is one matched grammar rule: its kind, the matched span, where
//! it starts in the source and how many lines it covers, plus named
//! attributes. A [`NodeList`] is an ordered run of sibling nodes produced by a
//! repeating rule.
//!
//! Attributes hold either raw captured text, or nested nodes for fields that
//! were parsed by a sub-rule. Flags (loose, ordered, image, ...) are stored as
//! the text `"true"` and are simply absent when false.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Every node kind the Markdown grammar can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // Block level
    Space,
    BlockCode,
    Fences,
    Heading,
    NoPipeTable,
    LineHeading,
    HorizontalRule,
    BlockQuote,
    List,
    ListItem,
    Html,
    Definition,
    Table,
    TableRow,
    TableCell,
    Paragraph,
    BlockText,
    // Inline level
    InlineMath,
    BlockMath,
    Escape,
    AutoLink,
    Url,
    Tag,
    Link,
    ReferenceLink,
    NoTextRefLink,
    StrongUs,
    StrongAs,
    EmUs,
    EmAs,
    InlineCode,
    Break,
    Del,
    InlineText,
}

impl NodeKind {
    pub const ALL: [NodeKind; 34] = [
        NodeKind::Space,
        NodeKind::BlockCode,
        NodeKind::Fences,
        NodeKind::Heading,
        NodeKind::NoPipeTable,
        NodeKind::LineHeading,
        NodeKind::HorizontalRule,
        NodeKind::BlockQuote,
        NodeKind::List,
        NodeKind::ListItem,
        NodeKind::Html,
        NodeKind::Definition,
        NodeKind::Table,
        NodeKind::TableRow,
        NodeKind::TableCell,
        NodeKind::Paragraph,
        NodeKind::BlockText,
        NodeKind::InlineMath,
        NodeKind::BlockMath,
        NodeKind::Escape,
        NodeKind::AutoLink,
        NodeKind::Url,
        NodeKind::Tag,
        NodeKind::Link,
        NodeKind::ReferenceLink,
        NodeKind::NoTextRefLink,
        NodeKind::StrongUs,
        NodeKind::StrongAs,
        NodeKind::EmUs,
        NodeKind::EmAs,
        NodeKind::InlineCode,
        NodeKind::Break,
        NodeKind::Del,
        NodeKind::InlineText,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Space => "Space",
            NodeKind::BlockCode => "BlockCode",
            NodeKind::Fences => "Fences",
            NodeKind::Heading => "Heading",
            NodeKind::NoPipeTable => "NoPipeTable",
            NodeKind::LineHeading => "LineHeading",
            NodeKind::HorizontalRule => "HorizontalRule",
            NodeKind::BlockQuote => "BlockQuote",
            NodeKind::List => "List",
            NodeKind::ListItem => "ListItem",
            NodeKind::Html => "Html",
            NodeKind::Definition => "Definition",
            NodeKind::Table => "Table",
            NodeKind::TableRow => "TableRow",
            NodeKind::TableCell => "TableCell",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::BlockText => "BlockText",
            NodeKind::InlineMath => "InlineMath",
            NodeKind::BlockMath => "BlockMath",
            NodeKind::Escape => "Escape",
            NodeKind::AutoLink => "AutoLink",
            NodeKind::Url => "Url",
            NodeKind::Tag => "Tag",
            NodeKind::Link => "Link",
            NodeKind::ReferenceLink => "ReferenceLink",
            NodeKind::NoTextRefLink => "NoTextRefLink",
            NodeKind::StrongUs => "StrongUs",
            NodeKind::StrongAs => "StrongAs",
            NodeKind::EmUs => "EmUs",
            NodeKind::EmAs => "EmAs",
            NodeKind::InlineCode => "InlineCode",
            NodeKind::Break => "Break",
            NodeKind::Del => "Del",
            NodeKind::InlineText => "InlineText",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field whose sub-rule parse is postponed until the whole document is tokenized.
///
/// Inline fields are captured while block tokenization is still discovering
/// link definitions, so they are parsed in a second pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeferredField {
    pub rule: &'static str,
    pub text: String,
    pub line: usize,
}

/// Value of a named node attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Attribute {
    Text(String),
    Node(Box<Node>),
    List(NodeList),
    Deferred(DeferredField),
    /// The capturing group did not participate in the match.
    Missing,
}

impl Attribute {
    /// The source text this attribute came from, for raw or deferred values.
    pub fn source_text(&self) -> Option<&str> {
        match self {
            Attribute::Text(text) => Some(text),
            Attribute::Deferred(field) => Some(&field.text),
            _ => None,
        }
    }
}

/// One AST node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: String,
    /// 1-indexed source line of the first character of `span`.
    pub start_line: usize,
    /// Number of `\n` characters in `span`.
    pub line_count: usize,
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Node {
    pub fn new(kind: NodeKind, span: impl Into<String>, start_line: usize) -> Self {
        let span = span.into();
        let line_count = span.matches('\n').count();
        Self {
            kind,
            span,
            start_line,
            line_count,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &'static str, value: Attribute) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(key)
    }

    /// Raw text of an attribute, if it holds text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(Attribute::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&NodeList> {
        match self.attributes.get(key) {
            Some(Attribute::List(list)) => Some(list),
            _ => None,
        }
    }

    pub fn set_text(&mut self, key: &'static str, value: impl Into<String>) {
        self.attributes.insert(key, Attribute::Text(value.into()));
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.attributes.get(key), Some(Attribute::Text(value)) if value == "true")
    }

    pub fn set_flag(&mut self, key: &'static str, value: bool) {
        if value {
            self.set_text(key, "true");
        } else {
            self.attributes.remove(key);
        }
    }

    /// Replace the span, keeping `line_count` in step with it.
    pub fn set_span(&mut self, span: String) {
        self.line_count = span.matches('\n').count();
        self.span = span;
    }
}

/// An ordered run of sibling nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeList {
    /// Name of the rule that produced the run.
    pub rule: &'static str,
    pub nodes: Vec<Node>,
}

impl NodeList {
    pub fn new(rule: &'static str) -> Self {
        Self {
            rule,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn last_mut(&mut self) -> Option<&mut Node> {
        self.nodes.last_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
