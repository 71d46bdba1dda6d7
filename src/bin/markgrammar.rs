//! Command-line interface for markgrammar
//!
//! Usage:
//!   markgrammar render `<path>` [--lines] [--wrap] [--toc]   - Convert Markdown to HTML
//!   markgrammar ast `<path>` [--format yaml|json]            - Dump the parsed node tree
//!   markgrammar toc `<path>` [--markdown]                    - Print the table of contents
//!
//! `<path>` may be `-` to read standard input. Every command accepts
//! `--config <file>` to layer a TOML file over the built-in defaults, and
//! `-v`/`-vv` for debug/trace logging on stderr.

use clap::{Arg, ArgAction, ArgMatches, Command};
use markgrammar::markdown::ast::{dump, format_source_context};
use markgrammar::markdown::config::{Loader, MarkdownConfig};
use markgrammar::markdown::lexing::normalize;
use markgrammar::markdown::{parse, render, to_html, toc, MarkdownError, Options};
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match matches.subcommand() {
        Some(("render", sub)) => handle_render_command(sub, &config),
        Some(("ast", sub)) => handle_ast_command(sub, &config),
        Some(("toc", sub)) => handle_toc_command(sub, &config),
        _ => unreachable!(),
    }
}

fn cli() -> Command {
    let path = Arg::new("path")
        .help("Markdown file to read, or - for standard input")
        .required(true)
        .index(1);

    Command::new("markgrammar")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert Markdown to HTML with a regex-grammar parser")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log parser activity to stderr (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("render")
                .about("Convert a Markdown file to HTML")
                .arg(path.clone())
                .arg(
                    Arg::new("lines")
                        .long("lines")
                        .action(ArgAction::SetTrue)
                        .help("Add data-source-line attributes"),
                )
                .arg(
                    Arg::new("wrap")
                        .long("wrap")
                        .action(ArgAction::SetTrue)
                        .help("Wrap the output in a standalone HTML page"),
                )
                .arg(
                    Arg::new("toc")
                        .long("toc")
                        .action(ArgAction::SetTrue)
                        .help("Replace [TOC] with the table of contents"),
                ),
        )
        .subcommand(
            Command::new("ast")
                .about("Dump the parsed node tree")
                .arg(path.clone())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["yaml", "json"])
                        .help("Output format (default from config: yaml)"),
                ),
        )
        .subcommand(
            Command::new("toc")
                .about("Print the table of contents of a Markdown file")
                .arg(path)
                .arg(
                    Arg::new("markdown")
                        .long("markdown")
                        .action(ArgAction::SetTrue)
                        .help("Print the Markdown bullet list instead of HTML"),
                ),
        )
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Defaults, then the --config file, then command-line flags.
fn load_config(matches: &ArgMatches) -> Result<MarkdownConfig, MarkdownError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    match matches.subcommand() {
        Some(("render", sub)) => {
            for (flag, key) in [
                ("lines", "render.include_lines"),
                ("wrap", "render.wrap_in_html"),
                ("toc", "render.expand_toc"),
            ] {
                if sub.get_flag(flag) {
                    loader = loader.set_override(key, true)?;
                }
            }
        }
        Some(("ast", sub)) => {
            if let Some(format) = sub.get_one::<String>("format") {
                loader = loader.set_override("ast.format", format.as_str())?;
            }
        }
        _ => {}
    }
    Ok(loader.build()?)
}

fn read_source(path: &str) -> Result<String, MarkdownError> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Print `error` with an excerpt of the offending source, then exit.
fn fail(error: MarkdownError, source: &str) -> ! {
    eprintln!("Error: {}", error);
    if let MarkdownError::Grammar(grammar_error) = &error {
        if let Some(line) = grammar_error.line() {
            eprintln!("{}", format_source_context(&normalize(source), line));
        }
    }
    std::process::exit(1);
}

fn source_or_exit(sub: &ArgMatches) -> String {
    let path = sub.get_one::<String>("path").expect("path is required");
    read_source(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    })
}

fn handle_render_command(sub: &ArgMatches, config: &MarkdownConfig) {
    let source = source_or_exit(sub);
    let options = Options::from(config.render);
    let document = parse(&source).unwrap_or_else(|e| fail(e, &source));
    print!("{}", render(&document, &options));
}

fn handle_ast_command(sub: &ArgMatches, config: &MarkdownConfig) {
    let source = source_or_exit(sub);
    let document = parse(&source).unwrap_or_else(|e| fail(e, &source));
    let output = dump(&document.blocks, config.ast.format)
        .unwrap_or_else(|e| fail(MarkdownError::from(e), &source));
    println!("{}", output);
}

fn handle_toc_command(sub: &ArgMatches, config: &MarkdownConfig) {
    let source = source_or_exit(sub);
    let options = Options::from(config.render);
    let html = to_html(&source, &options).unwrap_or_else(|e| fail(e, &source));
    let output = if sub.get_flag("markdown") {
        toc::extract_toc_markdown(&html)
    } else {
        toc::render_toc(&html).unwrap_or_else(|e| fail(e, &source))
    };
    if let Some(output) = output {
        println!("{}", output.trim_end());
    }
}
