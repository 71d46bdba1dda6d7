//! Grammar rules: the generic engine and the Markdown rule set built on it.

pub mod engine;
pub mod markdown_rules;

pub use engine::{DispatchRule, PlainHooks, RepeatingRule, Rule, RuleEntry, RuleHooks, RuleSet};
pub use markdown_rules::{build_rules, markdown_rules, BLOCK, INLINE, LIST_BLOCK, QUOTE_BLOCK};
