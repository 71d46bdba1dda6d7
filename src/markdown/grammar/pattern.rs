//! Composable grammar patterns
//!
//! A [`GrammarPattern`] is a compiled regular expression together with the
//! ordered list of token names its capturing groups are stored under. Patterns
//! are assembled from fragments: fragment sources are concatenated, then every
//! placeholder (an upper-case word such as `BULLET` or `DEF`) is replaced by the
//! source of another pattern.
//!
//! ## Anchors
//!
//! Block and inline patterns are anchored with a leading `^` so that a match
//! always begins at the offset being tried. When a pattern is embedded inside
//! another one that anchor is stripped, unless the embedded source ends up at
//! the very start of the combined pattern.
//!
//! ## Backreferences
//!
//!     Embedding a pattern that uses `\1` inside a pattern that already owns
//!     capturing groups changes which group `\1` refers to. A substitution can
//!     be declared with a group offset, which renumbers every backreference in
//!     the embedded source.
//!
//! ## Matching at an offset
//!
//! Rules match against the remaining input and must begin at its first byte.
//! Each pattern is compiled a second time wrapped in `\A(?:...)`. A
//! backtracking regex still walks every later offset before it reports no
//! match, so patterns that need backtracking also carry a prefilter: the
//! leading part of the pattern that the linear engine can run. Lookarounds
//! and word boundaries match no text and are left out of it, and it ends at
//! the first backreference. Input the prefilter rejects is never handed to
//! the backtracking engine.
//!
//! Malformed placeholders are reported as [`GrammarBuildError`] while the
//! grammar is being assembled, never while text is being parsed.

use fancy_regex::{Assertion, Expr};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Placeholders are upper-case words, optionally with digits and underscores.
static PLACEHOLDER_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// Backtracking budget for a single match attempt.
const BACKTRACK_LIMIT: usize = 10_000_000;

/// Errors raised while assembling a grammar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarBuildError {
    #[error("pattern '{pattern}': invalid placeholder name '{placeholder}'")]
    InvalidPlaceholder {
        pattern: String,
        placeholder: String,
    },

    #[error("pattern '{pattern}': placeholder '{placeholder}' does not occur in the source")]
    UnusedPlaceholder {
        pattern: String,
        placeholder: String,
    },

    #[error("pattern '{pattern}' has no fragments")]
    Empty { pattern: String },

    #[error("pattern '{pattern}' failed to compile: {message}")]
    Compile { pattern: String, message: String },
}

/// A compiled grammar regex with named capture tokens.
#[derive(Clone)]
pub struct GrammarPattern {
    name: &'static str,
    source: String,
    regex: fancy_regex::Regex,
    anchored: fancy_regex::Regex,
    prefilter: Option<Regex>,
    tokens: Vec<&'static str>,
}

impl GrammarPattern {
    /// Start assembling a pattern with the given name.
    pub fn builder<'a>(name: &'static str) -> PatternBuilder<'a> {
        PatternBuilder {
            name,
            fragments: Vec::new(),
            substitutions: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Compile a single source with no placeholders.
    pub fn new(
        name: &'static str,
        source: &str,
        tokens: &[&'static str],
    ) -> Result<Self, GrammarBuildError> {
        GrammarPattern::builder(name)
            .fragment(source)
            .tokens(tokens)
            .build()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The regex source this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Token names, one per capturing group. An empty name discards the group.
    pub fn tokens(&self) -> &[&'static str] {
        &self.tokens
    }

    pub fn regex(&self) -> &fancy_regex::Regex {
        &self.regex
    }

    /// Linear-time check every match at offset zero must pass, if the
    /// pattern needs one.
    pub fn prefilter(&self) -> Option<&Regex> {
        self.prefilter.as_ref()
    }

    /// Match the pattern at the very start of `text`.
    ///
    /// Errors are runtime limits of the backtracking engine (stack depth or
    /// backtrack count), never syntax errors.
    pub fn captures_at_start<'t>(
        &self,
        text: &'t str,
    ) -> Result<Option<fancy_regex::Captures<'t>>, fancy_regex::Error> {
        if let Some(prefilter) = &self.prefilter {
            if !prefilter.is_match(text) {
                return Ok(None);
            }
        }
        self.anchored.captures(text)
    }
}

impl fmt::Debug for GrammarPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarPattern")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("tokens", &self.tokens)
            .finish()
    }
}

/// One piece of a combined pattern: either a raw regex source or an existing pattern.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    Source(&'a str),
    Pattern(&'a GrammarPattern),
}

impl<'a> Fragment<'a> {
    fn source(&self) -> &'a str {
        match self {
            Fragment::Source(source) => source,
            Fragment::Pattern(pattern) => pattern.source(),
        }
    }
}

impl<'a> From<&'a str> for Fragment<'a> {
    fn from(source: &'a str) -> Self {
        Fragment::Source(source)
    }
}

impl<'a> From<&'a GrammarPattern> for Fragment<'a> {
    fn from(pattern: &'a GrammarPattern) -> Self {
        Fragment::Pattern(pattern)
    }
}

#[derive(Debug, Clone)]
struct Substitution<'a> {
    placeholder: &'a str,
    replacement: Fragment<'a>,
    group_offset: usize,
}

/// Builder returned by [`GrammarPattern::builder`].
#[derive(Debug, Clone)]
pub struct PatternBuilder<'a> {
    name: &'static str,
    fragments: Vec<Fragment<'a>>,
    substitutions: Vec<Substitution<'a>>,
    tokens: Vec<&'static str>,
}

impl<'a> PatternBuilder<'a> {
    pub fn fragment(mut self, fragment: impl Into<Fragment<'a>>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Replace every occurrence of `placeholder` with `replacement`.
    pub fn substitute(self, placeholder: &'a str, replacement: impl Into<Fragment<'a>>) -> Self {
        self.substitute_shifted(placeholder, replacement, 0)
    }

    /// Like [`substitute`](Self::substitute), renumbering the replacement's
    /// backreferences by `group_offset`.
    pub fn substitute_shifted(
        mut self,
        placeholder: &'a str,
        replacement: impl Into<Fragment<'a>>,
        group_offset: usize,
    ) -> Self {
        self.substitutions.push(Substitution {
            placeholder,
            replacement: replacement.into(),
            group_offset,
        });
        self
    }

    pub fn tokens(mut self, tokens: &[&'static str]) -> Self {
        self.tokens = tokens.to_vec();
        self
    }

    /// The combined regex source, before compilation.
    pub fn combined_source(&self) -> Result<String, GrammarBuildError> {
        if self.fragments.is_empty() {
            return Err(GrammarBuildError::Empty {
                pattern: self.name.to_string(),
            });
        }

        let mut source = String::new();
        for (index, fragment) in self.fragments.iter().enumerate() {
            if index == 0 {
                source.push_str(fragment.source());
            } else {
                source.push_str(trim_anchor(fragment.source()));
            }
        }

        for substitution in &self.substitutions {
            if !PLACEHOLDER_NAME.is_match(substitution.placeholder) {
                return Err(GrammarBuildError::InvalidPlaceholder {
                    pattern: self.name.to_string(),
                    placeholder: substitution.placeholder.to_string(),
                });
            }
        }

        // Longest placeholders first so that e.g. LHEAD never shadows LHEADING.
        let mut ordered: Vec<&Substitution> = self.substitutions.iter().collect();
        ordered.sort_by(|a, b| b.placeholder.len().cmp(&a.placeholder.len()));

        let mut used = vec![false; ordered.len()];
        let mut combined = String::with_capacity(source.len());
        let mut rest = source.as_str();
        let mut at_start = true;
        'scan: while !rest.is_empty() {
            for (index, substitution) in ordered.iter().enumerate() {
                if let Some(after) = rest.strip_prefix(substitution.placeholder) {
                    let replacement = substitution.replacement.source();
                    let replacement = if at_start {
                        replacement
                    } else {
                        trim_anchor(replacement)
                    };
                    combined.push_str(&shift_backreferences(
                        replacement,
                        substitution.group_offset,
                    ));
                    used[index] = true;
                    rest = after;
                    at_start = false;
                    continue 'scan;
                }
            }
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                combined.push(ch);
                // Escapes are copied as a unit so `\D` never reads as a placeholder.
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        combined.push(escaped);
                    }
                }
            }
            rest = chars.as_str();
            at_start = false;
        }

        if let Some(index) = used.iter().position(|used| !used) {
            return Err(GrammarBuildError::UnusedPlaceholder {
                pattern: self.name.to_string(),
                placeholder: ordered[index].placeholder.to_string(),
            });
        }

        Ok(combined)
    }

    /// Combine the fragments and compile the result.
    pub fn build(self) -> Result<GrammarPattern, GrammarBuildError> {
        let source = self.combined_source()?;
        let regex = compile(self.name, &source)?;
        let anchored_source = format!(r"\A(?:{})", source);
        let anchored = compile(self.name, &anchored_source)?;
        let prefilter = prefilter(&anchored_source);
        tracing::trace!(
            pattern = self.name,
            %source,
            prefilter = prefilter.is_some(),
            "compiled grammar pattern"
        );
        Ok(GrammarPattern {
            name: self.name,
            source,
            regex,
            anchored,
            prefilter,
            tokens: self.tokens,
        })
    }
}

fn compile(name: &str, source: &str) -> Result<fancy_regex::Regex, GrammarBuildError> {
    fancy_regex::RegexBuilder::new(source)
        .backtrack_limit(BACKTRACK_LIMIT)
        .build()
        .map_err(|err| GrammarBuildError::Compile {
            pattern: name.to_string(),
            message: err.to_string(),
        })
}

/// Build the linear-engine prefilter for a pattern that needs backtracking.
///
/// `None` when the whole pattern already runs on the linear engine, or when
/// nothing but the start anchor could be extracted.
fn prefilter(source: &str) -> Option<Regex> {
    let tree = Expr::parse_tree(source).ok()?;
    if is_linear(&tree.expr) {
        return None;
    }
    let mut prefix = String::new();
    push_prefix(&tree.expr, &mut prefix);
    if prefix.trim_start_matches('^').is_empty() {
        return None;
    }
    match Regex::new(&format!(r"\A(?:{})", prefix)) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::debug!(%prefix, %err, "prefilter does not compile, matching without it");
            None
        }
    }
}

/// Whether `expr` contains nothing that needs the backtracking engine.
fn is_linear(expr: &Expr) -> bool {
    match expr {
        Expr::Empty | Expr::Any { .. } | Expr::Literal { .. } | Expr::Delegate { .. } => true,
        Expr::Assertion(assertion) => matches!(
            assertion,
            Assertion::StartText
                | Assertion::EndText
                | Assertion::StartLine { .. }
                | Assertion::EndLine { .. }
        ),
        Expr::Concat(children) | Expr::Alt(children) => children.iter().all(is_linear),
        Expr::Group(child) => is_linear(child),
        Expr::Repeat { child, .. } => is_linear(child),
        _ => false,
    }
}

/// Append the linear prefix of `expr` to `out`.
///
/// Returns whether `expr` was covered to its end, in which case whatever
/// follows it may be appended as well.
fn push_prefix(expr: &Expr, out: &mut String) -> bool {
    match expr {
        _ if is_linear(expr) => {
            expr.to_str(out, 2);
            true
        }
        Expr::Concat(children) => children.iter().all(|child| push_prefix(child, out)),
        Expr::Group(child) => push_prefix(child, out),
        // Zero-width: dropping them only widens what the prefix accepts.
        Expr::LookAround(..) | Expr::Assertion(_) => true,
        Expr::Repeat { child, lo, .. } if *lo > 0 => {
            push_prefix(child, out);
            false
        }
        Expr::Alt(children) => {
            let mut branches = Vec::with_capacity(children.len());
            let mut covered = true;
            for child in children {
                let mut branch = String::new();
                covered &= push_prefix(child, &mut branch);
                if branch.is_empty() {
                    return false;
                }
                branches.push(branch);
            }
            out.push_str("(?:");
            out.push_str(&branches.join("|"));
            out.push(')');
            covered
        }
        _ => false,
    }
}

/// Strip one leading start-of-input anchor.
pub fn trim_anchor(source: &str) -> &str {
    source.strip_prefix('^').unwrap_or(source)
}

/// Add `offset` to every numeric backreference (`\1`..`\9`) in `source`.
///
/// Escaped backslashes are skipped, so `\\1` (a literal backslash followed by `1`)
/// is left alone.
pub fn shift_backreferences(source: &str, offset: usize) -> String {
    if offset == 0 {
        return source.to_string();
    }
    let mut shifted = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            shifted.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some(digit @ '1'..='9') => {
                chars.next();
                let group = digit.to_digit(10).unwrap_or(0) as usize + offset;
                shifted.push('\\');
                shifted.push_str(&group.to_string());
            }
            Some(other) => {
                chars.next();
                shifted.push('\\');
                shifted.push(other);
            }
            None => shifted.push('\\'),
        }
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_concatenate_and_lose_inner_anchors() {
        let first = GrammarPattern::new("first", r"^a", &[]).unwrap();
        let combined = GrammarPattern::builder("combined")
            .fragment(&first)
            .fragment(r"^b+")
            .build()
            .unwrap();
        assert_eq!(combined.source(), "^ab+");
    }

    #[test]
    fn test_substitution_replaces_every_occurrence() {
        let bullet = GrammarPattern::new("bullet", r"^(?:[*+-]|\d+\.)", &[]).unwrap();
        let combined = GrammarPattern::builder("item")
            .fragment(r"^BULLET x BULLET")
            .substitute("BULLET", &bullet)
            .build()
            .unwrap();
        assert_eq!(combined.source(), r"^(?:[*+-]|\d+\.) x (?:[*+-]|\d+\.)");
    }

    #[test]
    fn test_substitution_at_start_keeps_anchor() {
        let combined = GrammarPattern::builder("start")
            .fragment("HEAD tail")
            .substitute("HEAD", "^head")
            .build()
            .unwrap();
        assert_eq!(combined.source(), "^head tail");
    }

    #[test]
    fn test_longer_placeholder_wins() {
        let combined = GrammarPattern::builder("heads")
            .fragment("^(?:LHEADING|HEADING)")
            .substitute("HEADING", "h")
            .substitute("LHEADING", "l")
            .build()
            .unwrap();
        assert_eq!(combined.source(), "^(?:l|h)");
    }

    #[test]
    fn test_escaped_letters_are_not_placeholders() {
        let combined = GrammarPattern::builder("digits")
            .fragment(r"^\D+D")
            .substitute("D", "x")
            .build()
            .unwrap();
        assert_eq!(combined.source(), r"^\D+x");
    }

    #[test]
    fn test_shifted_backreferences() {
        assert_eq!(shift_backreferences(r"(a)\1", 2), r"(a)\3");
        assert_eq!(shift_backreferences(r"\\1", 2), r"\\1");
        assert_eq!(shift_backreferences(r"\d\1", 0), r"\d\1");
    }

    #[test]
    fn test_shifted_substitution_matches_renumbered_group() {
        let fence = GrammarPattern::new("fence", r"^(`{3,})\n[\s\S]*?\1", &[]).unwrap();
        let combined = GrammarPattern::builder("wrapped")
            .fragment(r"^(x)FENCE")
            .substitute_shifted("FENCE", &fence, 1)
            .build()
            .unwrap();
        assert_eq!(combined.source(), r"^(x)(`{3,})\n[\s\S]*?\2");
        assert!(combined.regex().is_match("x```\ncode```").unwrap());
    }

    #[test]
    fn test_invalid_placeholder_is_rejected() {
        let err = GrammarPattern::builder("bad")
            .fragment("^a")
            .substitute("lower", "b")
            .build()
            .unwrap_err();
        assert!(matches!(err, GrammarBuildError::InvalidPlaceholder { .. }));
    }

    #[test]
    fn test_unused_placeholder_is_rejected() {
        let err = GrammarPattern::builder("unused")
            .fragment("^a")
            .substitute("MISSING", "b")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GrammarBuildError::UnusedPlaceholder {
                pattern: "unused".to_string(),
                placeholder: "MISSING".to_string(),
            }
        );
    }

    #[test]
    fn test_compile_errors_name_the_pattern() {
        let err = GrammarPattern::new("broken", "^(unclosed", &[]).unwrap_err();
        match err {
            GrammarBuildError::Compile { pattern, .. } => assert_eq!(pattern, "broken"),
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_matches_only_at_start() {
        let late = GrammarPattern::new("late", "b", &[]).unwrap();
        assert!(late.captures_at_start("ab").unwrap().is_none());
        let found = late.captures_at_start("ba").unwrap().unwrap();
        assert_eq!(found.get(0).map(|m| m.as_str()), Some("b"));
    }

    #[test]
    fn test_linear_patterns_have_no_prefilter() {
        let word = GrammarPattern::new("word", r"^([a-z]+) *(?:\n|$)", &["text"]).unwrap();
        assert!(word.prefilter().is_none());
    }

    #[test]
    fn test_prefilter_skips_lookarounds() {
        let strong = GrammarPattern::new("strong", r"^\*\*([\s\S]+?)\*\*(?!\*)", &["text"]).unwrap();
        let prefilter = strong.prefilter().unwrap();
        assert!(prefilter.is_match("**a***"));
        assert!(!prefilter.is_match("*a*"));
        assert!(!prefilter.is_match("x**a**"));
        // The lookahead itself is still enforced by the full pattern.
        let found = strong.captures_at_start("**a***").unwrap().unwrap();
        assert_eq!(found.get(1).map(|m| m.as_str()), Some("a*"));
    }

    #[test]
    fn test_prefilter_stops_at_backreference() {
        let code = GrammarPattern::new("code", r"^(`+)([^`]+)\1(?!`)", &[]).unwrap();
        let prefilter = code.prefilter().unwrap();
        assert!(prefilter.is_match("``a`"));
        assert!(!prefilter.is_match("a``"));
        assert!(code.captures_at_start("``a`").unwrap().is_none());
        assert!(code.captures_at_start("``a``").unwrap().is_some());
    }

    #[test]
    fn test_prefilter_covers_each_alternative() {
        let block = GrammarPattern::new("block", r"^ *(?:<!--(?=x)|<(\w+)[\s\S]*?</\1>)", &[]).unwrap();
        let prefilter = block.prefilter().unwrap();
        assert!(prefilter.is_match("  <!--x"));
        assert!(prefilter.is_match("<div>a</div>"));
        assert!(!prefilter.is_match("text <div>"));
    }

    #[test]
    fn test_stack_limit_is_an_error_not_a_panic() {
        let deep = GrammarPattern::new("deep", r"^x+(?=y)", &[]).unwrap();
        let text = format!("{}y", "x".repeat(1_100_000));
        assert!(deep.captures_at_start(&text).is_err());
        assert!(deep.captures_at_start("xxy").unwrap().is_some());
    }
}
