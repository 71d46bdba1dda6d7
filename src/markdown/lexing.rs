//! Lexing
//!
//! Source text goes through three stages:
//!
//!     normalize   line endings, tabs and special spaces
//!     block       block nodes; link definitions collected, inline fields deferred
//!     resolve     deferred inline fields parsed against the full link table

pub mod block;
pub mod inline;
pub mod links;
pub mod normalize;
pub mod resolve;

pub use block::{slug, tokenize_blocks, BlockLexer, BlockMode};
pub use inline::{tokenize_inline, InlineLexer, InlineState};
pub use links::{normalize_label, LinkDefinition, LinkTable};
pub use normalize::normalize;
pub use resolve::{has_deferred, resolve_inlines};
