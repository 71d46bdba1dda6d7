//! Command-line behaviour of the `markgrammar` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn markdown_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn markgrammar() -> Command {
    Command::cargo_bin("markgrammar").unwrap()
}

#[test]
fn test_render_file() {
    let file = markdown_file("# Hello\n\nSome **bold** text.\n");
    markgrammar()
        .arg("render")
        .arg(file.path())
        .assert()
        .success()
        .stdout("<h1 id=\"hello\">Hello</h1>\n<p>Some <strong>bold</strong> text.</p>\n");
}

#[test]
fn test_render_stdin_with_lines() {
    markgrammar()
        .args(["render", "-", "--lines"])
        .write_stdin("para\n")
        .assert()
        .success()
        .stdout("<p data-source-line=\"1\">para</p>\n");
}

#[test]
fn test_render_wrap() {
    markgrammar()
        .args(["render", "-", "--wrap"])
        .write_stdin("x\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(predicate::str::contains(
            "<div id=\"markdown-container\"><p>x</p>\n</div>",
        ));
}

#[test]
fn test_render_expands_toc() {
    markgrammar()
        .args(["render", "-", "--toc"])
        .write_stdin("[TOC]\n\n## One\n\n### Two\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<toc><ul>"))
        .stdout(predicate::str::contains("<a href=\"#one\">One</a>"))
        .stdout(predicate::str::contains("<a href=\"#two\">Two</a>"));
}

#[test]
fn test_config_file_enables_lines() {
    let mut config = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    config
        .write_all(b"[render]\ninclude_lines = true\n")
        .unwrap();

    markgrammar()
        .arg("render")
        .arg("-")
        .arg("--config")
        .arg(config.path())
        .write_stdin("para\n")
        .assert()
        .success()
        .stdout("<p data-source-line=\"1\">para</p>\n");
}

#[test]
fn test_missing_config_file_fails() {
    markgrammar()
        .args(["render", "-", "--config", "/nonexistent/markgrammar.toml"])
        .write_stdin("x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_ast_json() {
    markgrammar()
        .args(["ast", "-", "--format", "json"])
        .write_stdin("# Title\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"node_type\": \"Heading\""));
}

#[test]
fn test_ast_defaults_to_yaml() {
    markgrammar()
        .args(["ast", "-"])
        .write_stdin("# Title\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("node_type: Heading"));
}

#[test]
fn test_ast_rejects_unknown_format() {
    markgrammar()
        .args(["ast", "-", "--format", "xml"])
        .write_stdin("# Title\n")
        .assert()
        .failure();
}

#[test]
fn test_toc_markdown() {
    markgrammar()
        .args(["toc", "-", "--markdown"])
        .write_stdin("# Top\n\n## One\n\n### Two\n")
        .assert()
        .success()
        .stdout("* [One](#one)\n  * [Two](#two)\n");
}

#[test]
fn test_toc_reads_config_file() {
    let mut config = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    config
        .write_all(b"[render]\ninclude_lines = true\nwrap_in_html = true\n")
        .unwrap();

    markgrammar()
        .args(["toc", "-", "--markdown", "--config"])
        .arg(config.path())
        .write_stdin("# Top\n\n## One *a*\n\n### Two\n")
        .assert()
        .success()
        .stdout("* [One <em>a</em>](#one-a)\n  * [Two](#two)\n");
}

#[test]
fn test_toc_with_bad_config_fails() {
    markgrammar()
        .args(["toc", "-", "--config", "/nonexistent/markgrammar.toml"])
        .write_stdin("## One\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_missing_input_file_fails() {
    markgrammar()
        .args(["render", "/nonexistent/input.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading"));
}
