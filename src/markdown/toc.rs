//! Table of contents
//!
//! Built from rendered HTML rather than from the tree: every heading below
//! `h1` becomes one Markdown bullet linking to the heading id, indented two
//! spaces per level below the shallowest such heading. The bullet list is
//! then rendered with the normal pipeline.

use super::{to_html, MarkdownError, Options};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<h([2-6]) id="([^"]*)"[^>]*>(.*?)</h[2-6]>"#).unwrap());
static LINE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#" data-source-line="\d+""#).unwrap());
static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<p(?: data-source-line="\d+")?>\[toc\]</p>\n?"#).unwrap());

/// The Markdown bullet list for the headings of `html`, or `None` without headings.
pub fn extract_toc_markdown(html: &str) -> Option<String> {
    let headings: Vec<(usize, &str, String)> = HEADING
        .captures_iter(html)
        .filter_map(|caps| {
            let level = caps[1].parse::<usize>().ok()?;
            let id = caps.get(2)?.as_str();
            let inner = LINE_ATTR.replace_all(&caps[3], "").into_owned();
            Some((level, id, inner))
        })
        .collect();

    let min_level = headings.iter().map(|(level, _, _)| *level).min()?;
    let lines: Vec<String> = headings
        .iter()
        .map(|(level, id, inner)| {
            let indent = "  ".repeat(level - min_level);
            format!("{}* [{}](#{})", indent, inner, id)
        })
        .collect();
    Some(lines.join("\n"))
}

/// Render the table of contents of `html`, or `None` without headings.
pub fn render_toc(html: &str) -> Result<Option<String>, MarkdownError> {
    match extract_toc_markdown(html) {
        Some(markdown) => Ok(Some(to_html(&markdown, &Options::default())?)),
        None => Ok(None),
    }
}

/// Replace `[TOC]` marker paragraphs with the rendered table of contents.
pub fn expand_toc(html: &str) -> Result<String, MarkdownError> {
    if !MARKER.is_match(html) {
        return Ok(html.to_string());
    }
    let toc = render_toc(html)?.unwrap_or_default();
    let replacement = format!("<toc>{}</toc>\n", toc);
    Ok(MARKER
        .replace_all(html, regex::NoExpand(&replacement))
        .into_owned())
}
