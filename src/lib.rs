//! # markgrammar
//!
//! A Markdown to HTML converter driven by a composable regex grammar.
//!
//! Block and inline syntax are described as named rules over regex patterns;
//! a small rule engine applies them to produce a node tree, and every node
//! kind renders through a compiled HTML template. Rendered tags can carry the
//! source line they came from, for editor preview synchronization.
//!
//! ```text
//! use markgrammar::markdown::{to_html, Options};
//!
//! let html = to_html("# Hello\n", &Options::default())?;
//! assert_eq!(html, "<h1 id=\"hello\">Hello</h1>\n");
//! ```
//!
//! ## Testing
//!
//! Node trees are checked with the fluent assertions in
//! [`markdown::testing`]; rendered output with plain string comparisons or
//! inline snapshots.

pub mod markdown;
