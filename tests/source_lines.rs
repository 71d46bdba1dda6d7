//! `data-source-line` attributes on rendered tags

use markgrammar::markdown::{to_html, Options};

fn with_lines(source: &str) -> String {
    let options = Options {
        include_lines: true,
        ..Options::default()
    };
    to_html(source, &options).expect("document to convert")
}

#[test]
fn test_inline_nodes_follow_newlines_in_paragraph() {
    assert_eq!(
        with_lines("a\n**b**\n"),
        "<p data-source-line=\"1\">a\n<strong data-source-line=\"2\">b</strong></p>\n"
    );
}

#[test]
fn test_blockquote_children_start_on_quote_line() {
    assert_eq!(
        with_lines("x\n\n> a\n> b\n"),
        "<p data-source-line=\"1\">x</p>\n\
         <blockquote data-source-line=\"3\">\n\
         <p data-source-line=\"3\">a\nb</p>\n\
         </blockquote>\n"
    );
}

#[test]
fn test_list_items() {
    assert_eq!(
        with_lines("* a\n* b\n"),
        "<ul data-source-line=\"1\">\n\
         <li data-source-line=\"1\">a</li>\n\
         <li data-source-line=\"2\">b</li>\n\
         </ul>\n"
    );
}

#[test]
fn test_table_rows_and_cells() {
    let html = with_lines("| a |\n|---|\n| 1 |\n| 2 |\n");
    assert!(html.starts_with("<table data-source-line=\"1\">"), "{}", html);
    assert!(html.contains("<th data-source-line=\"1\">a</th>"), "{}", html);
    assert!(html.contains("<td data-source-line=\"3\">1</td>"), "{}", html);
    assert!(html.contains("<td data-source-line=\"4\">2</td>"), "{}", html);
}

#[test]
fn test_fenced_code() {
    assert_eq!(
        with_lines("text\n\n```rust\nlet x;\n```\n"),
        "<p data-source-line=\"1\">text</p>\n\
         <pre data-source-line=\"3\"><code class=\"lang-rust\">let x;\n</code></pre>\n"
    );
}

#[test]
fn test_closing_tags_carry_no_line() {
    assert_eq!(
        with_lines("<span>a</span>"),
        "<p data-source-line=\"1\"><span data-source-line=\"1\">a</span></p>\n"
    );
}

#[test]
fn test_lines_are_off_by_default() {
    let html = to_html("# a\n\n* b\n", &Options::default()).unwrap();
    assert!(!html.contains("data-source-line"), "{}", html);
}
