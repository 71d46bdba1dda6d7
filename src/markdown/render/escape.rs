//! HTML escaping and address mangling.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::fmt::Write;

static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#?\w+;").unwrap());

/// Escape `&`, `<`, `>`, `"` and `'`.
///
/// In the default mode an `&` that already starts an entity (`&amp;`, `&#39;`)
/// is left alone. `strict` encodes every `&`, which is what code bodies need.
pub fn escape(text: &str, strict: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.char_indices() {
        match c {
            '&' if strict || !ENTITY.is_match(&text[index + 1..]) => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encode every character as a decimal or hexadecimal character reference,
/// picked at random per character, so addresses are not plain text in the page.
pub fn mangle<R: Rng>(text: &str, rng: &mut R) -> String {
    let mut out = String::with_capacity(text.len() * 6);
    for c in text.chars() {
        let code = c as u32;
        // Writing to a String cannot fail.
        let _ = if rng.gen_bool(0.5) {
            write!(out, "&#x{:x};", code)
        } else {
            write!(out, "&#{};", code)
        };
    }
    out
}
