//! Block-level grammar patterns
//!
//! Sources are listed leaves first. Several patterns are assembled from the
//! others: the list pattern embeds the definition pattern so a list stops
//! right before a link definition, and the paragraph pattern embeds nearly
//! every other block start as a negative lookahead so a paragraph ends where
//! any other block begins.

use super::pattern::{GrammarBuildError, GrammarPattern};

/// List bullet: `*`, `+`, `-` or an ordinal such as `12.`
pub const BULLET: &str = r"(?:[*+-]|\d+\.)";

const NEWLINE: &str = r"^\n+";
const CODE: &str = r"^( {4}[^\n]+\n*)+";
const FENCES: &str = r"^ *(`{3,}|~{3,})[ \.]*(\S+)? *\n([\s\S]*?)\s*\1 *(?:\n+|$)";
const HR: &str = r"^( *[-*_]){3,} *(?:\n+|$)";
const HEADING: &str = r"^ *(#{1,6}) +([^\n]+?) *#* *(?:\n+|$)";
const LHEADING: &str = r"^([^\n]+)\n *(=|-){2,} *(?:\n+|$)";
const NPTABLE: &str = r"^ *(\S.*\|.*)\n *([-:]+ *\|[-| :]*)\n((?:.*\|.*(?:\n|$))*)\n*";
const TABLE: &str = r"^ *\|(.+)\n *\|( *[-:]+[-| :]*)\n((?: *\|.*(?:\n|$))*)\n*";
const DEF: &str = r#"^ *\[([^\]]+)\]: *<?([^\s>]+)>?(?: +["(]([^\n]+)[")])? *(?:\n+|$)"#;
const BLOCKQUOTE: &str = r"^( *>[^\n]+(\n(?!DEF)[^\n]+)*\n*)+";
const TEXT: &str = r"^([^\n]+)";

/// A list runs until a rule, a definition, or a blank line not followed by
/// an indented line or another bullet at the list's own indentation.
const LIST: &str =
    r"^( *)(BULLET) [\s\S]+?(?:\n+(?=HR)|\n+(?=DEF)|\n{2,}(?! )(?!\1BULLET )\n*|\s*$)";
/// Horizontal rule as seen from inside a list; `\1` is the list indentation.
const LIST_HR: &str = r"\1?(?:[-*_] *){3,}(?:\n+|$)";
/// One list item: the bullet line plus every line not starting a sibling bullet.
const ITEM: &str = r"(?m)^( *)(BULLET) [^\n]*(?:\n(?!\1BULLET )[^\n]*)*";
/// Start of a list as seen by the paragraph lookahead.
const LIST_START: &str = r" *BULLET [\s\S]";
/// Heading as seen by the paragraph lookahead; the space after `#` is optional.
const PARAGRAPH_HEADING: &str = r"^ *(#{1,6}) *([^\n]+?) *#* *(?:\n+|$)";

/// Tag names that never open a block of raw HTML.
pub const BLOCK_TAG: &str = r"(?!(?:a|em|strong|small|s|cite|q|dfn|abbr|data|time|code|var|samp|kbd|sub|sup|i|b|u|mark|ruby|rt|rp|bdi|bdo|span|br|wbr|ins|del|img)\b)\w+(?!:/|[^\w\s@]*@)\b";

const HTML: &str =
    r"^ *(?:COMMENT *(?:\n|\s*$)|CLOSED *(?:\n{2,}|\s*$)|CLOSING *(?:\n{2,}|\s*$))";
const HTML_COMMENT: &str = r"<!--[\s\S]*?-->";
const HTML_CLOSED: &str = r"<(TAG)[\s\S]+?</\1>";
const HTML_CLOSING: &str = r#"<TAG(?:"[^"]*"|'[^']*'|[^'">])*?>"#;

const PARAGRAPH: &str =
    r"^((?:[^\n]+\n?(?!FENCE|LIST|HR|HEADING|LHEAD|BLOCKQUOTE|TAG|DEF))+)\n*";

/// Consecutive non-blank lines with no lookahead at all. Only reached when the
/// paragraph pattern exceeds the regex limits on very long input.
const PLAIN_PARAGRAPH: &str = r"^([^\n]+(?:\n[^\n]+)*)\n*";

/// Every compiled block pattern.
#[derive(Debug)]
pub struct BlockPatterns {
    pub newline: GrammarPattern,
    pub code: GrammarPattern,
    pub fences: GrammarPattern,
    pub heading: GrammarPattern,
    pub nptable: GrammarPattern,
    pub lheading: GrammarPattern,
    pub hr: GrammarPattern,
    pub blockquote: GrammarPattern,
    pub list: GrammarPattern,
    pub item: GrammarPattern,
    pub html: GrammarPattern,
    pub def: GrammarPattern,
    pub table: GrammarPattern,
    pub paragraph: GrammarPattern,
    pub plain_paragraph: GrammarPattern,
    pub text: GrammarPattern,
}

impl BlockPatterns {
    pub fn build() -> Result<Self, GrammarBuildError> {
        let newline = GrammarPattern::new("newline", NEWLINE, &[])?;
        let code = GrammarPattern::new("code", CODE, &[""])?;
        let fences = GrammarPattern::new("fences", FENCES, &["", "lang", "code"])?;
        let heading = GrammarPattern::new("heading", HEADING, &["depth", "text"])?;
        let nptable = GrammarPattern::new("nptable", NPTABLE, &["header", "align", "cells"])?;
        let lheading = GrammarPattern::new("lheading", LHEADING, &["text", "depth"])?;
        let hr = GrammarPattern::new("hr", HR, &[])?;
        let def = GrammarPattern::new("def", DEF, &["link", "href", "title"])?;
        let table = GrammarPattern::new("table", TABLE, &["header", "align", "cells"])?;
        let text = GrammarPattern::new("text", TEXT, &["text"])?;
        let plain_paragraph = GrammarPattern::new("plain_paragraph", PLAIN_PARAGRAPH, &["text"])?;

        let blockquote = GrammarPattern::builder("blockquote")
            .fragment(BLOCKQUOTE)
            .substitute("DEF", &def)
            .build()?;

        let list = GrammarPattern::builder("list")
            .fragment(LIST)
            .substitute("BULLET", BULLET)
            .substitute("HR", LIST_HR)
            .substitute("DEF", &def)
            .tokens(&["indent", "bullet"])
            .build()?;

        let item = GrammarPattern::builder("item")
            .fragment(ITEM)
            .substitute("BULLET", BULLET)
            .tokens(&["indent", "bullet"])
            .build()?;

        let closed = GrammarPattern::builder("html_closed")
            .fragment(HTML_CLOSED)
            .substitute("TAG", BLOCK_TAG)
            .build()?;
        let closing = GrammarPattern::builder("html_closing")
            .fragment(HTML_CLOSING)
            .substitute("TAG", BLOCK_TAG)
            .build()?;
        let html = GrammarPattern::builder("html")
            .fragment(HTML)
            .substitute("COMMENT", HTML_COMMENT)
            .substitute("CLOSED", &closed)
            .substitute("CLOSING", &closing)
            .tokens(&["pre"])
            .build()?;

        let list_start = GrammarPattern::builder("list_start")
            .fragment(LIST_START)
            .substitute("BULLET", BULLET)
            .build()?;
        let paragraph_heading = GrammarPattern::new("paragraph_heading", PARAGRAPH_HEADING, &[])?;
        let block_tag_open = format!("<{}", BLOCK_TAG);
        // The fence is embedded after the paragraph's own group, so its `\1` becomes `\2`.
        let paragraph = GrammarPattern::builder("paragraph")
            .fragment(PARAGRAPH)
            .substitute_shifted("FENCE", &fences, 1)
            .substitute("LIST", &list_start)
            .substitute("HR", &hr)
            .substitute("HEADING", &paragraph_heading)
            .substitute("LHEAD", &lheading)
            .substitute("BLOCKQUOTE", &blockquote)
            .substitute("TAG", block_tag_open.as_str())
            .substitute("DEF", &def)
            .tokens(&["text"])
            .build()?;

        Ok(Self {
            newline,
            code,
            fences,
            heading,
            nptable,
            lheading,
            hr,
            blockquote,
            list,
            item,
            html,
            def,
            table,
            paragraph,
            plain_paragraph,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> BlockPatterns {
        BlockPatterns::build().unwrap()
    }

    fn matched<'t>(pattern: &GrammarPattern, text: &'t str) -> Option<&'t str> {
        pattern
            .regex()
            .find(text)
            .unwrap()
            .filter(|m| m.start() == 0)
            .map(|m| m.as_str())
    }

    #[test]
    fn test_list_stops_before_definition() {
        let p = patterns();
        let text = "* a\n* b\n[x]: http://x\n";
        assert_eq!(matched(&p.list, text), Some("* a\n* b\n"));
    }

    #[test]
    fn test_list_continues_across_blank_line_before_bullet() {
        let p = patterns();
        let text = "* a\n* b\n\n* c";
        assert_eq!(matched(&p.list, text), Some(text));
    }

    #[test]
    fn test_list_stops_at_blank_line_before_paragraph() {
        let p = patterns();
        let text = "* a\n\nafter";
        assert_eq!(matched(&p.list, text), Some("* a\n\n"));
    }

    #[test]
    fn test_paragraph_stops_before_fence() {
        let p = patterns();
        let text = "text\n```\ncode\n```\n";
        assert_eq!(matched(&p.paragraph, text), Some("text\n"));
    }

    #[test]
    fn test_paragraph_stops_before_heading_and_list() {
        let p = patterns();
        assert_eq!(matched(&p.paragraph, "one\n#two\n"), Some("one\n"));
        assert_eq!(matched(&p.paragraph, "one\n- two\n"), Some("one\n"));
    }

    #[test]
    fn test_paragraph_absorbs_inline_tags() {
        let p = patterns();
        let text = "one\n<em>two</em>\n";
        assert_eq!(matched(&p.paragraph, text), Some(text));
    }

    #[test]
    fn test_paragraph_stops_before_block_tag() {
        let p = patterns();
        assert_eq!(matched(&p.paragraph, "one\n<div>\nx\n</div>\n"), Some("one\n"));
    }

    #[test]
    fn test_plain_paragraph_stops_at_blank_line() {
        let p = patterns();
        assert_eq!(matched(&p.plain_paragraph, "a\n# b\n\nc"), Some("a\n# b\n\n"));
        assert!(p.plain_paragraph.prefilter().is_none());
    }

    #[test]
    fn test_html_block_requires_block_tag() {
        let p = patterns();
        assert!(matched(&p.html, "<div>\nhi\n</div>\n").is_some());
        assert!(matched(&p.html, "<em>hi</em>\n").is_none());
    }

    #[test]
    fn test_items_split_on_sibling_bullets() {
        let p = patterns();
        let items: Vec<&str> = p
            .item
            .regex()
            .find_iter("* a\n  * nested\n* b\n\n* c")
            .map(|m| m.unwrap().as_str())
            .collect();
        assert_eq!(items, vec!["* a\n  * nested", "* b\n", "* c"]);
    }
}
