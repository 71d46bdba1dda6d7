//! Fluent assertion API for node trees
//!
//! ```text
//! assert_nodes(&document.blocks)
//!     .count(1)
//!     .node(0, |node| {
//!         node.kind(NodeKind::List)
//!             .flag("ordered")
//!             .list("items", |items| {
//!                 items.count(2);
//!             });
//!     });
//! ```
//!
//! Failure messages carry a path such as `nodes[0]:items[1]` so a failing
//! assertion points at the exact node.

use super::ast::{Attribute, Node, NodeKind, NodeList};

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for a node list
pub fn assert_nodes(list: &NodeList) -> NodeListAssertion<'_> {
    NodeListAssertion {
        list,
        context: "nodes".to_string(),
    }
}

// ============================================================================
// Text Matching
// ============================================================================

/// Text matching strategies for assertions
#[derive(Debug, Clone)]
pub enum TextMatch {
    Exact(String),
    StartsWith(String),
    Contains(String),
}

impl TextMatch {
    pub fn assert(&self, actual: &str, context: &str) {
        match self {
            TextMatch::Exact(expected) => {
                assert_eq!(
                    actual, expected,
                    "{}: Expected text to be '{}', but got '{}'",
                    context, expected, actual
                );
            }
            TextMatch::StartsWith(prefix) => {
                assert!(
                    actual.starts_with(prefix),
                    "{}: Expected text to start with '{}', but got '{}'",
                    context,
                    prefix,
                    actual
                );
            }
            TextMatch::Contains(substring) => {
                assert!(
                    actual.contains(substring),
                    "{}: Expected text to contain '{}', but got '{}'",
                    context,
                    substring,
                    actual
                );
            }
        }
    }
}

// ============================================================================
// NodeList Assertions
// ============================================================================

pub struct NodeListAssertion<'a> {
    list: &'a NodeList,
    context: String,
}

impl<'a> NodeListAssertion<'a> {
    /// Assert the number of nodes
    pub fn count(self, expected: usize) -> Self {
        let actual = self.list.len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} nodes, found {} nodes: [{}]",
            self.context,
            expected,
            actual,
            summarize(self.list)
        );
        self
    }

    /// Assert the kinds of all nodes, in order
    pub fn kinds(self, expected: &[NodeKind]) -> Self {
        let actual: Vec<NodeKind> = self.list.iter().map(|node| node.kind).collect();
        assert_eq!(
            actual,
            expected,
            "{}: Expected kinds {:?}, found [{}]",
            self.context,
            expected,
            summarize(self.list)
        );
        self
    }

    /// Assert on a specific node by index
    pub fn node<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        assert!(
            index < self.list.len(),
            "{}: Node index {} out of bounds (list has {} nodes)",
            self.context,
            index,
            self.list.len()
        );
        assertion(NodeAssertion {
            node: &self.list.nodes[index],
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    /// Assert every node is of `kind`
    pub fn all(self, kind: NodeKind) -> Self {
        for (index, node) in self.list.iter().enumerate() {
            assert_eq!(
                node.kind, kind,
                "{}[{}]: Expected {}, found {}",
                self.context, index, kind, node.kind
            );
        }
        self
    }
}

// ============================================================================
// Node Assertions
// ============================================================================

pub struct NodeAssertion<'a> {
    node: &'a Node,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    pub fn kind(self, expected: NodeKind) -> Self {
        assert_eq!(
            self.node.kind, expected,
            "{}: Expected {}, found {} spanning '{}'",
            self.context,
            expected,
            self.node.kind,
            preview(&self.node.span)
        );
        self
    }

    pub fn start_line(self, expected: usize) -> Self {
        assert_eq!(
            self.node.start_line, expected,
            "{}: Expected start line {}, found {}",
            self.context, expected, self.node.start_line
        );
        self
    }

    pub fn line_count(self, expected: usize) -> Self {
        assert_eq!(
            self.node.line_count, expected,
            "{}: Expected {} lines, found {}",
            self.context, expected, self.node.line_count
        );
        self
    }

    /// Assert the raw text of attribute `key`
    pub fn text(self, key: &str, expected: &str) -> Self {
        TextMatch::Exact(expected.to_string()).assert(self.raw(key), &self.attr_context(key));
        self
    }

    pub fn text_contains(self, key: &str, substring: &str) -> Self {
        TextMatch::Contains(substring.to_string()).assert(self.raw(key), &self.attr_context(key));
        self
    }

    pub fn flag(self, key: &str) -> Self {
        assert!(
            self.node.flag(key),
            "{}: Expected flag '{}' to be set",
            self.context,
            key
        );
        self
    }

    pub fn no_flag(self, key: &str) -> Self {
        assert!(
            !self.node.flag(key),
            "{}: Expected flag '{}' to be unset",
            self.context,
            key
        );
        self
    }

    /// Assert on the node list stored under `key`
    pub fn list<F>(self, key: &str, assertion: F) -> Self
    where
        F: FnOnce(NodeListAssertion<'a>),
    {
        match self.node.attribute(key) {
            Some(Attribute::List(list)) => assertion(NodeListAssertion {
                list,
                context: self.attr_context(key),
            }),
            other => panic!(
                "{}: Expected a node list, found {}",
                self.attr_context(key),
                describe(other)
            ),
        }
        self
    }

    /// Assert on the single node stored under `key`
    pub fn child<F>(self, key: &str, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        match self.node.attribute(key) {
            Some(Attribute::Node(node)) => assertion(NodeAssertion {
                node,
                context: self.attr_context(key),
            }),
            other => panic!(
                "{}: Expected a node, found {}",
                self.attr_context(key),
                describe(other)
            ),
        }
        self
    }

    fn raw(&self, key: &str) -> &'a str {
        match self.node.attribute(key) {
            Some(Attribute::Text(text)) => text,
            other => panic!(
                "{}: Expected text, found {}",
                self.attr_context(key),
                describe(other)
            ),
        }
    }

    fn attr_context(&self, key: &str) -> String {
        format!("{}:{}", self.context, key)
    }
}

fn summarize(list: &NodeList) -> String {
    list.iter()
        .map(|node| node.kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn preview(span: &str) -> String {
    if span.chars().count() > 50 {
        format!("{}...", span.chars().take(50).collect::<String>())
    } else {
        span.to_string()
    }
}

fn describe(attribute: Option<&Attribute>) -> String {
    match attribute {
        None => "nothing".to_string(),
        Some(Attribute::Text(text)) => format!("text '{}'", preview(text)),
        Some(Attribute::Node(node)) => format!("a {} node", node.kind),
        Some(Attribute::List(list)) => format!("a list of [{}]", summarize(list)),
        Some(Attribute::Deferred(field)) => format!("unparsed {} text", field.rule),
        Some(Attribute::Missing) => "a missing capture".to_string(),
    }
}
