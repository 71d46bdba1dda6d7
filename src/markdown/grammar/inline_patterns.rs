//! Inline-level grammar patterns

use super::pattern::{GrammarBuildError, GrammarPattern};

/// Bracketed link text, allowing one level of nested brackets.
const INSIDE: &str = r"((?:\[[^\]]*\]|[^\[\]]|\](?=[^\[]*\]))*)";
/// Link text for the no-label reference form; a stray `]` ends it.
const INSIDE_NOLINK: &str = r"((?:\[[^\]]*\]|[^\[\]])*)";

const ESCAPE: &str = r"^\\([\\`*{}\[\]()#+\-.!_>~|])";
const AUTOLINK: &str = r"^<([^ >]+(@|:/)[^ >]+)>";
const URL: &str = r#"^(https?://[^\s<]+[^<.,:;"')\]\s])"#;
const TAG: &str = r#"^(<!--[\s\S]*?-->|</?\w+(?:"[^"]*"|'[^']*'|[^'">])*?>)"#;
const LINK: &str = r#"^!?\[INSIDE\]\(\s*<?([\s\S]*?)>?(?:\s+['"]([\s\S]*?)['"])?\s*\)"#;
const REFLINK: &str = r"^!?\[INSIDE\]\s*\[([^\]]*)\]";
const NOLINK: &str = r"^!?\[INSIDE\]";
const STRONG_US: &str = r"^__([\s\S]+?)__(?!_)";
const STRONG_AS: &str = r"^\*\*([\s\S]+?)\*\*(?!\*)";
const EM_US: &str = r"^\b_((?:[^_]|__)+?)_\b";
const EM_AS: &str = r"^\*((?:\*\*|[\s\S])+?)\*(?!\*)";
const CODE: &str = r"^(`+)\s*([\s\S]*?[^`])\s*\1(?!`)";
const BR: &str = r"^ {2,}\n(?!\s*$)";
const DEL: &str = r"^~~(?=\S)([\s\S]*?\S)~~";
/// `\\(` ... `\\)`: the doubled backslash survives one round of Markdown escaping.
const INLINE_MATH: &str = r"^\\\\\(\s*([\s\S]+?)\s*\\\\\)";
const BLOCK_MATH: &str = r"^ *\$\$\s*([\s\S]+?)\s*\$\$";
/// Plain text up to the next character that could start another construct.
const TEXT: &str = r"^([\s\S]+?)(?=[\\<!\[_*`~]|https?://| {2,}\n|$|\$\$)";

/// Every compiled inline pattern.
#[derive(Debug)]
pub struct InlinePatterns {
    pub escape: GrammarPattern,
    pub autolink: GrammarPattern,
    pub url: GrammarPattern,
    pub tag: GrammarPattern,
    pub link: GrammarPattern,
    pub reflink: GrammarPattern,
    pub nolink: GrammarPattern,
    pub strong_us: GrammarPattern,
    pub strong_as: GrammarPattern,
    pub em_us: GrammarPattern,
    pub em_as: GrammarPattern,
    pub code: GrammarPattern,
    pub br: GrammarPattern,
    pub del: GrammarPattern,
    pub inline_math: GrammarPattern,
    pub block_math: GrammarPattern,
    pub text: GrammarPattern,
}

impl InlinePatterns {
    pub fn build() -> Result<Self, GrammarBuildError> {
        Ok(Self {
            escape: GrammarPattern::new("escape", ESCAPE, &["text"])?,
            autolink: GrammarPattern::new("autolink", AUTOLINK, &["link", "symbol"])?,
            url: GrammarPattern::new("url", URL, &["href"])?,
            tag: GrammarPattern::new("tag", TAG, &[""])?,
            link: GrammarPattern::builder("link")
                .fragment(LINK)
                .substitute("INSIDE", INSIDE)
                .tokens(&["text", "href", "title"])
                .build()?,
            reflink: GrammarPattern::builder("reflink")
                .fragment(REFLINK)
                .substitute("INSIDE", INSIDE)
                .tokens(&["text", "label"])
                .build()?,
            nolink: GrammarPattern::builder("nolink")
                .fragment(NOLINK)
                .substitute("INSIDE", INSIDE_NOLINK)
                .tokens(&["text"])
                .build()?,
            strong_us: GrammarPattern::new("strong_us", STRONG_US, &["text"])?,
            strong_as: GrammarPattern::new("strong_as", STRONG_AS, &["text"])?,
            em_us: GrammarPattern::new("em_us", EM_US, &["text"])?,
            em_as: GrammarPattern::new("em_as", EM_AS, &["text"])?,
            code: GrammarPattern::new("code", CODE, &["ticks", "text"])?,
            br: GrammarPattern::new("br", BR, &[])?,
            del: GrammarPattern::new("del", DEL, &["text"])?,
            inline_math: GrammarPattern::new("inline_math", INLINE_MATH, &["latex"])?,
            block_math: GrammarPattern::new("block_math", BLOCK_MATH, &["latex"])?,
            text: GrammarPattern::new("text", TEXT, &["text"])?,
        })
    }
}
