//! Source normalization applied before any grammar matching.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_ENDINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r").unwrap());
static SPACE_ONLY_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ +$").unwrap());

/// Normalize line endings and whitespace.
///
/// - `\r\n` and `\r` become `\n`
/// - tabs become four spaces
/// - non-breaking spaces become spaces
/// - line separators (U+2028, and the newline symbol U+2424) become `\n`
/// - lines holding only spaces become empty
pub fn normalize(source: &str) -> String {
    let text = LINE_ENDINGS.replace_all(source, "\n");
    let text = text
        .replace('\t', "    ")
        .replace('\u{00a0}', " ")
        .replace(['\u{2028}', '\u{2424}'], "\n");
    SPACE_ONLY_LINES.replace_all(&text, "").into_owned()
}
