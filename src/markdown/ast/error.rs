//! Error types for grammar parsing

/// Errors raised while applying the grammar to a document.
///
/// Any of these aborts the whole conversion; no partial output is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    /// No alternative of a dispatch rule matched at the current position.
    #[error(
        "no {rule} rule matches character {char_code} (line {line}, offset {position}) near {context:?}"
    )]
    Exhausted {
        rule: String,
        char_code: u32,
        position: usize,
        line: usize,
        context: String,
    },

    /// A repeating rule matched nothing, which would never terminate.
    #[error("rule {rule} matched an empty span at offset {position} (line {line})")]
    EmptyMatch {
        rule: String,
        position: usize,
        line: usize,
    },

    #[error("unknown grammar rule '{name}'")]
    UnknownRule { name: String },

    /// A repeating rule was used where a single node is expected, or the reverse.
    #[error("grammar rule '{name}' cannot be used as {expected}")]
    WrongRuleKind { name: String, expected: &'static str },

    /// The regex engine gave up, usually on its backtracking limit.
    #[error("rule {rule} could not be matched: {message}")]
    Backtrack { rule: String, message: String },
}

impl GrammarError {
    /// Source line the error points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            GrammarError::Exhausted { line, .. } | GrammarError::EmptyMatch { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

/// Length of the remaining-text excerpt stored in [`GrammarError::Exhausted`].
pub const CONTEXT_CHARS: usize = 40;

/// Excerpt of `text` starting at `position`, for error messages.
pub fn context_at(text: &str, position: usize) -> String {
    text.get(position..)
        .unwrap_or_default()
        .chars()
        .take(CONTEXT_CHARS)
        .collect()
}

/// Format source code context around an error line (1-indexed).
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
pub fn format_source_context(source: &str, line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = line.saturating_sub(1);

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();
    for line_num in start_line..end_line {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!(
            "{} {:3} | {}\n",
            marker,
            line_num + 1,
            lines[line_num]
        ));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_source_context() {
        let source = "line 1\nline 2\nline 3\nerror line\nline 5\nline 6\nline 7";
        let context = format_source_context(source, 4);

        assert!(context.contains("line 2"));
        assert!(context.contains(">>   4 | error line"));
        assert!(context.contains("line 6"));
        assert!(!context.contains("line 1"));
        assert!(!context.contains("line 7"));
    }

    #[test]
    fn test_format_source_context_at_start() {
        let context = format_source_context("only\nlines", 1);
        assert!(context.starts_with(">>   1 | only"));
    }

    #[test]
    fn test_exhausted_message_names_character() {
        let err = GrammarError::Exhausted {
            rule: "BlockElement".to_string(),
            char_code: 0x40,
            position: 3,
            line: 2,
            context: "@x".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no BlockElement rule matches character 64 (line 2, offset 3) near \"@x\""
        );
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_context_is_bounded() {
        let text = "x".repeat(100);
        assert_eq!(context_at(&text, 10).len(), CONTEXT_CHARS);
        assert_eq!(context_at("abc", 9), "");
    }
}
