//! Abstract syntax tree
//!
//! Parsing produces a tree of [`Node`]s grouped in [`NodeList`]s. The tree is
//! complete on its own: it can be rendered to HTML, or snapshotted and dumped
//! as YAML or JSON without rendering.

pub mod error;
pub mod node;
pub mod snapshot;

pub use error::{format_source_context, GrammarError};
pub use node::{Attribute, DeferredField, Node, NodeKind, NodeList};
pub use snapshot::{dump, snapshot_list, snapshot_node, AstFormat, AstSnapshot, SnapshotError};
