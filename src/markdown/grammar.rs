//! Markdown grammar
//!
//! The complete set of compiled block and inline patterns. The grammar is built
//! once per process on first use and shared read-only by every parse call.
//!
//! Patterns are assembled with [`GrammarPattern::builder`], which concatenates
//! regex fragments and substitutes named placeholders with other patterns. A
//! malformed built-in grammar is a programming error and panics at first use.

pub mod block_patterns;
pub mod inline_patterns;
pub mod pattern;

pub use block_patterns::BlockPatterns;
pub use inline_patterns::InlinePatterns;
pub use pattern::{Fragment, GrammarBuildError, GrammarPattern, PatternBuilder};

use once_cell::sync::Lazy;

/// All compiled patterns of the Markdown grammar.
#[derive(Debug)]
pub struct Grammar {
    pub block: BlockPatterns,
    pub inline: InlinePatterns,
}

impl Grammar {
    pub fn build() -> Result<Self, GrammarBuildError> {
        let grammar = Grammar {
            block: BlockPatterns::build()?,
            inline: InlinePatterns::build()?,
        };
        tracing::debug!("markdown grammar compiled");
        Ok(grammar)
    }
}

static GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::build().expect("built-in markdown grammar must compile"));

/// The process-wide Markdown grammar.
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}
