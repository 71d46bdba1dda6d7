//! End-to-end conversion scenarios
//!
//! Each case converts a complete document with default options and checks the
//! exact HTML, or the part of it the case is about.

use markgrammar::markdown::{to_html, Options};
use rstest::rstest;

fn html(source: &str) -> String {
    to_html(source, &Options::default()).expect("document to convert")
}

#[rstest]
#[case::atx_heading("# Hello World\n", "<h1 id=\"hello-world\">Hello World</h1>\n")]
#[case::emphasis("**bold** and _em_", "<p><strong>bold</strong> and <em>em</em></p>\n")]
#[case::reference_link(
    "[a][1]\n\n[1]: http://x.com \"T\"\n",
    "<p><a href=\"http://x.com\" title=\"T\">a</a></p>\n"
)]
#[case::undefined_reference("[undefined][nope]", "<p>[undefined][nope]</p>\n")]
#[case::horizontal_rule("a\n\n---\n", "<p>a</p>\n<hr/>\n")]
#[case::setext_heading("Title\n=====\n", "<h1 id=\"title\">Title</h1>\n")]
#[case::fenced_code(
    "```rust\nfn main() {}\n```\n",
    "<pre><code class=\"lang-rust\">fn main() {}\n</code></pre>\n"
)]
#[case::indented_code("    a < b\n", "<pre><code>a &lt; b\n</code></pre>")]
#[case::blockquote("> a\n> b\n", "<blockquote>\n<p>a\nb</p>\n</blockquote>\n")]
fn test_scenario(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(html(source), expected);
}

#[test]
fn test_piped_table() {
    let out = html("| a | b |\n|---|---|\n| 1 | 2 |\n");
    insta::assert_snapshot!(out.trim_end(), @r###"
    <table>
    <thead>
    <tr>
    <th>a</th>
    <th>b</th>
    </tr>
    </thead>
    <tbody>
    <tr>
    <td>1</td>
    <td>2</td>
    </tr>
    </tbody>
    </table>
    "###);
}

#[test]
fn test_blank_line_before_last_item_makes_every_item_loose() {
    assert_eq!(
        html("* a\n* b\n\n* c"),
        "<ul>\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n<li><p>c</p>\n</li>\n</ul>\n"
    );
}

#[test]
fn test_tight_list_has_no_paragraphs() {
    assert_eq!(html("- a\n- b\n"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
}

#[rstest]
#[case("[foo][]\n\n[foo]: http://x \"T\"\n")]
#[case("[foo]: http://x \"T\"\n\n[foo][]\n")]
#[case("[Foo]\n\n[foo]: http://x \"T\"\n")]
fn test_definition_order_does_not_matter(#[case] source: &str) {
    let out = html(source);
    assert!(
        out.contains("href=\"http://x\" title=\"T\""),
        "unexpected output: {}",
        out
    );
}

#[test]
fn test_later_definition_wins() {
    let out = html("[a]\n\n[a]: http://one\n[a]: http://two\n");
    assert_eq!(out, "<p><a href=\"http://two\">a</a></p>\n");
}

#[test]
fn test_heading_ids_are_deterministic_and_not_deduplicated() {
    let first = html("## Hello, World!\n## Hello World!\n");
    assert_eq!(
        first,
        "<h2 id=\"hello-world-\">Hello, World!</h2>\n<h2 id=\"hello-world-\">Hello World!</h2>\n"
    );
    assert_eq!(first, html("## Hello, World!\n## Hello World!\n"));
}
