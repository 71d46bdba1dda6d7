//! Inline tokenizer
//!
//! Splits the text of a paragraph, heading, cell or list line into inline
//! nodes. The only state is [`InlineState::in_link`]: while it is set, bare
//! URLs are not autolinked. It is set for the text of `[...](...)` links and
//! between raw `<a ...>` and `</a>` tags. Child tokenizers get a copy of the
//! state, so nothing a nested run does leaks back out.
//!
//! Reference links whose label is not defined fall back to plain text: the
//! node is dropped, the opening character is emitted as text, and tokenizing
//! resumes right after it.

use super::links::LinkTable;
use crate::markdown::ast::{Attribute, GrammarError, Node, NodeKind, NodeList};
use crate::markdown::rules::{markdown_rules, RuleHooks, RuleSet, INLINE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineState {
    pub in_link: bool,
}

pub struct InlineLexer<'l> {
    links: &'l LinkTable,
    state: InlineState,
}

impl<'l> InlineLexer<'l> {
    pub fn new(links: &'l LinkTable, state: InlineState) -> Self {
        Self { links, state }
    }

    pub fn tokenize(&mut self, text: &str, line: usize) -> Result<NodeList, GrammarError> {
        markdown_rules().repeat_named(INLINE, text, line, self)
    }

    /// Tokenize link text with a child state that has `in_link` set.
    fn link_text(&self, node: &mut Node) -> Result<(), GrammarError> {
        let Some(text) = node.text("text").map(str::to_string) else {
            return Ok(());
        };
        let mut child = InlineLexer::new(
            self.links,
            InlineState {
                in_link: true,
                ..self.state
            },
        );
        let children = child.tokenize(&text, node.start_line)?;
        node.attributes.insert("text", Attribute::List(children));
        Ok(())
    }

    fn link(&self, node: &mut Node) -> Result<(), GrammarError> {
        let image = node.span.starts_with('!');
        node.set_flag("image", image);
        if image {
            Ok(())
        } else {
            self.link_text(node)
        }
    }

    /// Resolve a reference link, or return `None` if its label is undefined.
    fn reference(&self, mut node: Node) -> Result<Option<Node>, GrammarError> {
        let label = node.text("label").filter(|label| !label.is_empty());
        let key = label.or_else(|| node.text("text")).unwrap_or_default();
        let Some(definition) = self.links.get(key) else {
            tracing::debug!(label = key, "undefined reference link, keeping text");
            return Ok(None);
        };
        node.set_text("href", definition.href.clone());
        match &definition.title {
            Some(title) => node.set_text("title", title.clone()),
            None => {
                node.attributes.insert("title", Attribute::Missing);
            }
        }
        self.link(&mut node)?;
        Ok(Some(node))
    }

    fn autolink(node: &mut Node) {
        let link = node.text("link").unwrap_or_default().to_string();
        if node.text("symbol") == Some("@") {
            let email = link
                .strip_prefix("mailto:")
                .unwrap_or(&link)
                .to_string();
            node.set_text("href", format!("mailto:{}", email));
            node.set_text("text", email);
            node.set_flag("mailto", true);
        } else {
            node.set_text("href", link.clone());
            node.set_text("text", link);
        }
    }

    fn tag(&mut self, node: &mut Node) {
        if node.span.starts_with("<!--") {
            node.set_flag("comment", true);
            node.set_text("text", node.span.clone());
            return;
        }
        let closing = node.span.starts_with("</");
        let self_close = node.span.ends_with("/>");
        let inner = node.span.trim_start_matches('<').trim_end_matches('>');
        let inner = inner.strip_prefix('/').unwrap_or(inner);
        let inner = if self_close {
            inner.strip_suffix('/').unwrap_or(inner)
        } else {
            inner
        };
        let inner = inner.trim_end().to_string();

        let name: String = inner
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if name.eq_ignore_ascii_case("a") {
            self.state.in_link = !closing;
        }

        node.set_flag("is_closing", closing);
        node.set_flag("self_close", self_close);
        node.set_text("text", inner);
    }
}

/// Tokenize inline `text` starting at source line `line`.
pub fn tokenize_inline(
    text: &str,
    line: usize,
    links: &LinkTable,
) -> Result<NodeList, GrammarError> {
    InlineLexer::new(links, InlineState::default()).tokenize(text, line)
}

impl RuleHooks for InlineLexer<'_> {
    fn admits(&self, rule: &str) -> bool {
        !(self.state.in_link && rule == "Url")
    }

    fn expand(
        &mut self,
        rules: &RuleSet<'_>,
        sub_rule: &'static str,
        text: &str,
        line: usize,
    ) -> Result<Attribute, GrammarError> {
        let mut child = InlineLexer::new(self.links, self.state);
        rules.expand(sub_rule, text, line, &mut child)
    }

    fn accept(&mut self, mut node: Node, out: &mut NodeList) -> Result<usize, GrammarError> {
        let consumed = node.span.len();
        match node.kind {
            NodeKind::Link => {
                self.link(&mut node)?;
                out.push(node);
            }
            NodeKind::ReferenceLink | NodeKind::NoTextRefLink => {
                let first = node.span.chars().next().unwrap_or('[');
                let line = node.start_line;
                match self.reference(node)? {
                    Some(resolved) => out.push(resolved),
                    None => {
                        let literal = first.to_string();
                        out.push(
                            Node::new(NodeKind::InlineText, literal.clone(), line)
                                .with_attribute("text", Attribute::Text(literal)),
                        );
                        return Ok(first.len_utf8());
                    }
                }
            }
            NodeKind::AutoLink => {
                Self::autolink(&mut node);
                out.push(node);
            }
            NodeKind::Url => {
                let href = node.text("href").unwrap_or_default().to_string();
                node.set_text("text", href);
                out.push(node);
            }
            NodeKind::Tag => {
                self.tag(&mut node);
                out.push(node);
            }
            _ => out.push(node),
        }
        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(list: &NodeList) -> Vec<NodeKind> {
        list.iter().map(|n| n.kind).collect()
    }

    fn inline(text: &str) -> NodeList {
        tokenize_inline(text, 1, &LinkTable::new()).unwrap()
    }

    #[test]
    fn test_emphasis_and_strong() {
        let nodes = inline("**bold** and _em_");
        assert_eq!(
            kinds(&nodes),
            vec![NodeKind::StrongAs, NodeKind::InlineText, NodeKind::EmUs]
        );
    }

    #[test]
    fn test_snake_case_is_not_emphasis() {
        let nodes = inline("snake_case_word");
        assert!(nodes.iter().all(|n| n.kind == NodeKind::InlineText));
    }

    #[test]
    fn test_link_text_is_inline_parsed_without_autolinks() {
        let nodes = inline("[see http://x *now*](http://y)");
        let link = &nodes.nodes[0];
        assert_eq!(link.kind, NodeKind::Link);
        assert!(!link.flag("image"));
        let text = link.list("text").unwrap();
        assert!(!kinds(text).contains(&NodeKind::Url));
        assert!(kinds(text).contains(&NodeKind::EmAs));
    }

    #[test]
    fn test_image_text_stays_raw() {
        let nodes = inline("![alt *x*](pic.png \"T\")");
        let image = &nodes.nodes[0];
        assert!(image.flag("image"));
        assert_eq!(image.text("text"), Some("alt *x*"));
        assert_eq!(image.text("title"), Some("T"));
    }

    #[test]
    fn test_bare_urls_link_outside_anchors_only() {
        let nodes = inline("go http://x.com now");
        assert_eq!(nodes.nodes[1].kind, NodeKind::Url);

        let nodes = inline("<a href=\"#\">http://x.com</a> http://y.com");
        let found: Vec<NodeKind> = kinds(&nodes);
        assert_eq!(found.iter().filter(|k| **k == NodeKind::Url).count(), 1);
        assert_eq!(nodes.nodes.last().unwrap().kind, NodeKind::Url);
    }

    #[test]
    fn test_tags() {
        let nodes = inline("<br/><!-- c --></span>");
        assert!(nodes.nodes[0].flag("self_close"));
        assert_eq!(nodes.nodes[0].text("text"), Some("br"));
        assert!(nodes.nodes[1].flag("comment"));
        assert!(nodes.nodes[2].flag("is_closing"));
        assert_eq!(nodes.nodes[2].text("text"), Some("span"));
    }

    #[test]
    fn test_autolinks() {
        let nodes = inline("<me@x.org> <http://x.org>");
        assert!(nodes.nodes[0].flag("mailto"));
        assert_eq!(nodes.nodes[0].text("href"), Some("mailto:me@x.org"));
        assert_eq!(nodes.nodes[0].text("text"), Some("me@x.org"));
        assert!(!nodes.nodes[2].flag("mailto"));
        assert_eq!(nodes.nodes[2].text("href"), Some("http://x.org"));
    }

    #[test]
    fn test_defined_reference_resolves() {
        let mut links = LinkTable::new();
        links.define("foo", "http://x", Some("T"));
        let nodes = tokenize_inline("[Foo][] and [foo]", 1, &links).unwrap();
        let first = &nodes.nodes[0];
        assert_eq!(first.kind, NodeKind::ReferenceLink);
        assert_eq!(first.text("href"), Some("http://x"));
        assert_eq!(nodes.nodes.last().unwrap().kind, NodeKind::NoTextRefLink);
    }

    #[test]
    fn test_undefined_reference_degrades_to_text() {
        let nodes = inline("[undefined][nope]");
        assert!(nodes.iter().all(|n| n.kind == NodeKind::InlineText));
        let text: String = nodes.iter().filter_map(|n| n.text("text")).collect();
        assert_eq!(text, "[undefined][nope]");
    }

    #[test]
    fn test_math_before_escape() {
        let nodes = inline(r"a \\(x\\) $$y$$ \*");
        // Block math absorbs the spaces in front of it.
        assert_eq!(
            kinds(&nodes),
            vec![
                NodeKind::InlineText,
                NodeKind::InlineMath,
                NodeKind::BlockMath,
                NodeKind::InlineText,
                NodeKind::Escape,
            ]
        );
        assert_eq!(nodes.nodes[1].text("latex"), Some("x"));
        assert_eq!(nodes.nodes[2].text("latex"), Some("y"));
        assert_eq!(nodes.nodes[4].text("text"), Some("*"));
    }

    #[test]
    fn test_line_break_and_code() {
        let nodes = inline("a  \nb `c`");
        assert_eq!(
            kinds(&nodes),
            vec![
                NodeKind::InlineText,
                NodeKind::Break,
                NodeKind::InlineText,
                NodeKind::InlineCode
            ]
        );
        assert_eq!(nodes.nodes[1].start_line, 1);
        assert_eq!(nodes.nodes[2].start_line, 2);
    }
}
