//! AST Snapshot - a normalized, serializable view of the node tree
//!
//! Snapshots flatten the attribute map into node type, label, text attributes and
//! children, which is the shape golden files and the `ast` command want. Nested
//! fields become children tagged with a `field` attribute naming where they came from.

use super::node::{Attribute, Node, NodeList};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum label length before truncation.
const LABEL_CHARS: usize = 48;

/// A snapshot of an AST node in a normalized, serializable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstSnapshot {
    /// The kind of node (e.g., "Paragraph", "ListItem")
    pub node_type: String,

    /// First line of the node's span
    pub label: String,

    /// Text attributes plus line information
    pub attributes: BTreeMap<String, String>,

    /// Nested nodes, in attribute order
    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    pub fn new(node_type: String, label: String) -> Self {
        Self {
            node_type,
            label,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: String, value: String) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn with_child(mut self, child: AstSnapshot) -> Self {
        self.children.push(child);
        self
    }
}

/// Output formats for snapshot dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AstFormat {
    Yaml,
    Json,
}

impl std::str::FromStr for AstFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" => Ok(AstFormat::Yaml),
            "json" => Ok(AstFormat::Json),
            other => Err(format!("unknown ast format '{}'", other)),
        }
    }
}

/// Errors from serializing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to write YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot a single node and everything nested under it.
pub fn snapshot_node(node: &Node) -> AstSnapshot {
    let mut snapshot = AstSnapshot::new(node.kind.name().to_string(), label_for(&node.span))
        .with_attribute("start_line".to_string(), node.start_line.to_string())
        .with_attribute("line_count".to_string(), node.line_count.to_string());

    for (key, value) in &node.attributes {
        match value {
            Attribute::Text(text) => {
                snapshot = snapshot.with_attribute(key.to_string(), text.clone());
            }
            Attribute::Deferred(field) => {
                snapshot = snapshot.with_attribute(key.to_string(), field.text.clone());
            }
            Attribute::Missing => {}
            Attribute::Node(child) => {
                snapshot = snapshot.with_child(
                    snapshot_node(child).with_attribute("field".to_string(), key.to_string()),
                );
            }
            Attribute::List(list) => {
                for child in list {
                    snapshot = snapshot.with_child(
                        snapshot_node(child).with_attribute("field".to_string(), key.to_string()),
                    );
                }
            }
        }
    }
    snapshot
}

/// Snapshot every node of a list.
pub fn snapshot_list(list: &NodeList) -> Vec<AstSnapshot> {
    list.iter().map(snapshot_node).collect()
}

/// Serialize the snapshots of `list` in the requested format.
pub fn dump(list: &NodeList, format: AstFormat) -> Result<String, SnapshotError> {
    let snapshots = snapshot_list(list);
    Ok(match format {
        AstFormat::Yaml => serde_yaml::to_string(&snapshots)?,
        AstFormat::Json => serde_json::to_string_pretty(&snapshots)?,
    })
}

fn label_for(span: &str) -> String {
    let first_line = span.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > LABEL_CHARS {
        let truncated: String = first_line.chars().take(LABEL_CHARS).collect();
        format!("{}...", truncated)
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::ast::node::NodeKind;

    fn sample() -> NodeList {
        let text = Node::new(NodeKind::InlineText, "hi", 1)
            .with_attribute("text", Attribute::Text("hi".to_string()));
        let mut inline = NodeList::new("Inline");
        inline.push(text);
        let paragraph = Node::new(NodeKind::Paragraph, "hi\n", 1)
            .with_attribute("text", Attribute::List(inline));
        let mut blocks = NodeList::new("Block");
        blocks.push(paragraph);
        blocks
    }

    #[test]
    fn test_nested_fields_become_children() {
        let snapshots = snapshot_list(&sample());
        assert_eq!(snapshots.len(), 1);
        let paragraph = &snapshots[0];
        assert_eq!(paragraph.node_type, "Paragraph");
        assert_eq!(paragraph.attributes["line_count"], "1");
        assert_eq!(paragraph.children.len(), 1);
        assert_eq!(paragraph.children[0].node_type, "InlineText");
        assert_eq!(paragraph.children[0].attributes["field"], "text");
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let label = label_for(&"word ".repeat(20));
        assert!(label.ends_with("..."));
        assert_eq!(label.chars().count(), LABEL_CHARS + 3);
    }

    #[test]
    fn test_json_dump_parses_back() {
        let json = dump(&sample(), AstFormat::Json).unwrap();
        let parsed: Vec<AstSnapshot> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot_list(&sample()));
    }

    #[test]
    fn test_format_names() {
        assert_eq!("YAML".parse::<AstFormat>(), Ok(AstFormat::Yaml));
        assert!("xml".parse::<AstFormat>().is_err());
    }
}
