//! Rule engine
//!
//! Binds compiled grammar patterns to named productions and applies them to text.
//!
//! ## Rule kinds
//!
//!     - [`Rule`]: one pattern. A successful match becomes a [`Node`] whose
//!       attributes are the pattern's named capture groups. A field can be
//!       declared recursive, in which case the captured text is handed to
//!       another rule instead of being stored raw.
//!     - [`DispatchRule`]: ordered alternation. Alternatives are tried in
//!       declaration order and the first match wins, so the order of the list is
//!       the precedence of the grammar.
//!     - [`RepeatingRule`]: applies one rule from the end of each match until the
//!       input is exhausted, collecting a [`NodeList`]. A match that consumes
//!       nothing is an error, since the loop could never finish.
//!
//! Rules refer to each other by name through a [`RuleSet`]. Names are resolved
//! when a parse reaches them, so rules may be registered in any order and may
//! refer to themselves.
//!
//! ## Hooks
//!
//! Everything that depends on the caller goes through [`RuleHooks`]: whether an
//! alternative may be tried in the current state, how a recursive field is
//! expanded, and what happens to a node once it has been matched (keep, merge,
//! discard, or replace with something that consumes less text).

use crate::markdown::ast::error::context_at;
use crate::markdown::ast::{Attribute, GrammarError, Node, NodeKind, NodeList};
use crate::markdown::grammar::GrammarPattern;
use std::collections::HashMap;

/// Caller-provided behavior plugged into the engine.
pub trait RuleHooks {
    /// Whether the named alternative may be tried right now.
    fn admits(&self, _rule: &str) -> bool {
        true
    }

    /// Parse the text captured for a recursive field with `sub_rule`.
    fn expand(
        &mut self,
        rules: &RuleSet<'_>,
        sub_rule: &'static str,
        text: &str,
        line: usize,
    ) -> Result<Attribute, GrammarError>;

    /// Take ownership of a matched node, appending it to `out` (or not), and
    /// return how many bytes of input it consumes.
    fn accept(&mut self, node: Node, out: &mut NodeList) -> Result<usize, GrammarError>;
}

/// Hooks that expand every field through the rule set and keep every node.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHooks;

impl RuleHooks for PlainHooks {
    fn expand(
        &mut self,
        rules: &RuleSet<'_>,
        sub_rule: &'static str,
        text: &str,
        line: usize,
    ) -> Result<Attribute, GrammarError> {
        rules.expand(sub_rule, text, line, self)
    }

    fn accept(&mut self, node: Node, out: &mut NodeList) -> Result<usize, GrammarError> {
        let consumed = node.span.len();
        out.push(node);
        Ok(consumed)
    }
}

/// A named production backed by one grammar pattern.
#[derive(Debug, Clone)]
pub struct Rule<'g> {
    pub name: &'static str,
    pub kind: NodeKind,
    pub pattern: &'g GrammarPattern,
    sub_rules: Vec<(&'static str, &'static str)>,
}

impl<'g> Rule<'g> {
    pub fn new(name: &'static str, kind: NodeKind, pattern: &'g GrammarPattern) -> Self {
        Self {
            name,
            kind,
            pattern,
            sub_rules: Vec::new(),
        }
    }

    /// Parse the captured `field` with `rule` instead of storing it as text.
    pub fn with_sub_rule(mut self, field: &'static str, rule: &'static str) -> Self {
        self.sub_rules.push((field, rule));
        self
    }

    fn sub_rule(&self, field: &str) -> Option<&'static str> {
        self.sub_rules
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rule)| *rule)
    }

    /// Match the pattern so that it begins exactly at `pos`.
    ///
    /// With `fail_ok`, a failed match and an exceeded regex limit both yield
    /// `Ok(None)`.
    pub fn parse(
        &self,
        rules: &RuleSet<'_>,
        text: &str,
        pos: usize,
        line: usize,
        fail_ok: bool,
        hooks: &mut dyn RuleHooks,
    ) -> Result<Option<Node>, GrammarError> {
        let captures = match self.pattern.captures_at_start(&text[pos..]) {
            Ok(captures) => captures,
            // A regex that hits its backtracking limits is treated as not
            // matching, so the next alternative gets its turn.
            Err(err) if fail_ok => {
                tracing::debug!(rule = self.name, pos, line, %err, "alternative gave up");
                return Ok(None);
            }
            Err(err) => {
                return Err(GrammarError::Backtrack {
                    rule: self.name.to_string(),
                    message: err.to_string(),
                })
            }
        };
        let captures = match captures {
            Some(captures) => captures,
            None if fail_ok => return Ok(None),
            None => return Err(exhausted(self.name, text, pos, line)),
        };

        let span = captures.get(0).map_or("", |m| m.as_str());
        let mut node = Node::new(self.kind, span, line);
        for (index, token) in self.pattern.tokens().iter().enumerate() {
            if token.is_empty() {
                continue;
            }
            let value = match captures.get(index + 1) {
                None => Attribute::Missing,
                Some(group) => match self.sub_rule(token) {
                    Some(sub_rule) => {
                        let field_line = line + span[..group.start()].matches('\n').count();
                        hooks.expand(rules, sub_rule, group.as_str(), field_line)?
                    }
                    None => Attribute::Text(group.as_str().to_string()),
                },
            };
            node.attributes.insert(*token, value);
        }
        Ok(Some(node))
    }
}

/// Ordered alternation over named rules.
#[derive(Debug, Clone)]
pub struct DispatchRule {
    pub name: &'static str,
    pub alternatives: Vec<&'static str>,
}

impl DispatchRule {
    pub fn parse(
        &self,
        rules: &RuleSet<'_>,
        text: &str,
        pos: usize,
        line: usize,
        fail_ok: bool,
        hooks: &mut dyn RuleHooks,
    ) -> Result<Option<Node>, GrammarError> {
        for alternative in &self.alternatives {
            if !hooks.admits(alternative) {
                continue;
            }
            if let Some(node) = rules.parse_at(alternative, text, pos, line, true, hooks)? {
                return Ok(Some(node));
            }
        }
        if fail_ok {
            Ok(None)
        } else {
            Err(exhausted(self.name, text, pos, line))
        }
    }
}

/// Repeats one rule until the input is consumed.
#[derive(Debug, Clone)]
pub struct RepeatingRule {
    pub name: &'static str,
    pub element: &'static str,
}

impl RepeatingRule {
    pub fn parse(
        &self,
        rules: &RuleSet<'_>,
        text: &str,
        line: usize,
        hooks: &mut dyn RuleHooks,
    ) -> Result<NodeList, GrammarError> {
        let mut out = NodeList::new(self.name);
        let mut pos = 0;
        let mut line = line;
        while pos < text.len() {
            let node = rules
                .parse_at(self.element, text, pos, line, false, hooks)?
                .ok_or_else(|| exhausted(self.element, text, pos, line))?;
            if node.span.is_empty() {
                return Err(GrammarError::EmptyMatch {
                    rule: node.kind.name().to_string(),
                    position: pos,
                    line,
                });
            }
            let kind = node.kind;
            let consumed = hooks.accept(node, &mut out)?;
            if consumed == 0 {
                return Err(GrammarError::EmptyMatch {
                    rule: kind.name().to_string(),
                    position: pos,
                    line,
                });
            }
            let end = pos + consumed;
            line += text[pos..end].matches('\n').count();
            pos = end;
        }
        Ok(out)
    }
}

/// Any entry of a [`RuleSet`].
#[derive(Debug, Clone)]
pub enum RuleEntry<'g> {
    Pattern(Rule<'g>),
    Dispatch(DispatchRule),
    Repeat(RepeatingRule),
}

/// Named registry of rules, resolved lazily by name.
#[derive(Debug, Clone)]
pub struct RuleSet<'g> {
    entry: &'static str,
    rules: HashMap<&'static str, RuleEntry<'g>>,
}

impl<'g> RuleSet<'g> {
    /// Create an empty set whose entry point is the rule called `entry`.
    pub fn new(entry: &'static str) -> Self {
        Self {
            entry,
            rules: HashMap::new(),
        }
    }

    pub fn rule(mut self, rule: Rule<'g>) -> Self {
        self.rules.insert(rule.name, RuleEntry::Pattern(rule));
        self
    }

    pub fn dispatch(mut self, name: &'static str, alternatives: &[&'static str]) -> Self {
        self.rules.insert(
            name,
            RuleEntry::Dispatch(DispatchRule {
                name,
                alternatives: alternatives.to_vec(),
            }),
        );
        self
    }

    pub fn repeat(mut self, name: &'static str, element: &'static str) -> Self {
        self.rules
            .insert(name, RuleEntry::Repeat(RepeatingRule { name, element }));
        self
    }

    pub fn entry(&self) -> &'static str {
        self.entry
    }

    pub fn get(&self, name: &str) -> Result<&RuleEntry<'g>, GrammarError> {
        self.rules
            .get(name)
            .ok_or_else(|| GrammarError::UnknownRule {
                name: name.to_string(),
            })
    }

    /// Parse the whole text with the entry rule, starting at line 1.
    pub fn parse(&self, text: &str, hooks: &mut dyn RuleHooks) -> Result<NodeList, GrammarError> {
        self.repeat_named(self.entry, text, 1, hooks)
    }

    /// Apply a single-node rule (pattern or dispatch) at `pos`.
    pub fn parse_at(
        &self,
        name: &str,
        text: &str,
        pos: usize,
        line: usize,
        fail_ok: bool,
        hooks: &mut dyn RuleHooks,
    ) -> Result<Option<Node>, GrammarError> {
        match self.get(name)? {
            RuleEntry::Pattern(rule) => rule.parse(self, text, pos, line, fail_ok, hooks),
            RuleEntry::Dispatch(rule) => rule.parse(self, text, pos, line, fail_ok, hooks),
            RuleEntry::Repeat(_) => Err(GrammarError::WrongRuleKind {
                name: name.to_string(),
                expected: "a single node",
            }),
        }
    }

    /// Apply a repeating rule to all of `text`.
    pub fn repeat_named(
        &self,
        name: &str,
        text: &str,
        line: usize,
        hooks: &mut dyn RuleHooks,
    ) -> Result<NodeList, GrammarError> {
        match self.get(name)? {
            RuleEntry::Repeat(rule) => rule.parse(self, text, line, hooks),
            _ => Err(GrammarError::WrongRuleKind {
                name: name.to_string(),
                expected: "a sequence",
            }),
        }
    }

    /// Parse `text` as a whole with any kind of rule.
    ///
    /// Repeating rules yield [`Attribute::List`]; other rules must match at the
    /// start of `text` and yield [`Attribute::Node`].
    pub fn expand(
        &self,
        name: &str,
        text: &str,
        line: usize,
        hooks: &mut dyn RuleHooks,
    ) -> Result<Attribute, GrammarError> {
        match self.get(name)? {
            RuleEntry::Repeat(rule) => Ok(Attribute::List(rule.parse(self, text, line, hooks)?)),
            _ => {
                let node = self
                    .parse_at(name, text, 0, line, false, hooks)?
                    .ok_or_else(|| exhausted(name, text, 0, line))?;
                Ok(Attribute::Node(Box::new(node)))
            }
        }
    }
}

fn exhausted(rule: &str, text: &str, pos: usize, line: usize) -> GrammarError {
    let char_code = text
        .get(pos..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, u32::from);
    tracing::debug!(rule, char_code, pos, line, "grammar exhausted");
    GrammarError::Exhausted {
        rule: rule.to_string(),
        char_code,
        position: pos,
        line,
        context: context_at(text, pos),
    }
}
