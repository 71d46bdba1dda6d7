//! Inline elements rendered inside a single paragraph

use markgrammar::markdown::{to_html, Options};
use rstest::rstest;

fn paragraph(source: &str) -> String {
    let html = to_html(source, &Options::default()).expect("document to convert");
    html.strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>\n"))
        .unwrap_or_else(|| panic!("expected a single paragraph, got {:?}", html))
        .to_string()
}

#[rstest]
#[case::strong_asterisks("**b**", "<strong>b</strong>")]
#[case::strong_underscores("__b__", "<strong>b</strong>")]
#[case::em_asterisk("*e*", "<em>e</em>")]
#[case::em_underscore("_e_", "<em>e</em>")]
#[case::strong_inside_em("*a **b** c*", "<em>a <strong>b</strong> c</em>")]
#[case::snake_case("snake_case_name", "snake_case_name")]
#[case::del("~~gone~~", "<del>gone</del>")]
#[case::code_span("use `a<b`", "use <code>a&lt;b</code>")]
#[case::double_backtick_code("``a ` b``", "<code>a ` b</code>")]
#[case::line_break("a  \nb", "a<br/>b")]
#[case::escape(r"\*not em\*", "*not em*")]
#[case::text_escaping("a & b < c", "a &amp; b &lt; c")]
#[case::entities_kept("&copy; 2024", "&copy; 2024")]
fn test_inline_markup(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(paragraph(source), expected);
}

#[rstest]
#[case::inline_link("[a *b*](http://x)", "<a href=\"http://x\">a <em>b</em></a>")]
#[case::titled_link(
    "[a](http://x 'T')",
    "<a href=\"http://x\" title=\"T\">a</a>"
)]
#[case::image(
    "![alt](p.png \"T\")",
    "<img src=\"p.png\" alt=\"alt\" title=\"T\"/>"
)]
#[case::image_text_is_raw("![*a*](p.png)", "<img src=\"p.png\" alt=\"*a*\"/>")]
#[case::bare_url("see http://x.com now", "see <a href=\"http://x.com\">http://x.com</a> now")]
#[case::url_drops_trailing_dot("http://x.com.", "<a href=\"http://x.com\">http://x.com</a>.")]
#[case::autolink("<http://x.com>", "<a href=\"http://x.com\">http://x.com</a>")]
#[case::url_in_link_text(
    "[http://x.com](http://x.com)",
    "<a href=\"http://x.com\">http://x.com</a>"
)]
fn test_links(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(paragraph(source), expected);
}

#[test]
fn test_reference_image() {
    let html = to_html("![pic][p]\n\n[p]: /p.png\n", &Options::default()).unwrap();
    assert_eq!(html, "<p><img src=\"/p.png\" alt=\"pic\"/></p>\n");
}

#[test]
fn test_bare_urls_inside_raw_anchor_stay_text() {
    assert_eq!(
        paragraph("<a href=\"x\">http://y.com</a> http://z.com"),
        "<a href=\"x\">http://y.com</a> <a href=\"http://z.com\">http://z.com</a>"
    );
}

#[test]
fn test_inline_tags_pass_through() {
    assert_eq!(paragraph("a <span>b</span><br/>"), "a <span>b</span><br/>");
    assert_eq!(paragraph("x <!-- note --> y"), "x <!-- note --> y");
}

#[test]
fn test_mailto_autolink_is_obfuscated() {
    let html = paragraph("<me@x.com>");
    assert!(html.starts_with("<a href=\"&#"), "{}", html);
    assert!(html.ends_with("</a>"), "{}", html);
    assert!(!html.contains("mailto"), "{}", html);
    assert!(!html.contains("me@x.com"), "{}", html);
}

#[test]
fn test_math_without_engine_shows_escaped_source() {
    assert_eq!(
        paragraph(r"\\(a<b\\)"),
        "<latex class=\"inline\">a&lt;b</latex>"
    );
    assert_eq!(paragraph("$$x^2$$"), "<latex class=\"block\">x^2</latex>");
}
