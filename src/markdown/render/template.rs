//! Template compiler
//!
//! Node templates are small strings with `{{...}}` directives:
//!
//!     {{field}}                         field value as is
//!     {{^field}}                        HTML-escaped, existing entities kept
//!     {{^^field}}                       HTML-escaped, every `&` encoded
//!     {{@field}}                        mangled into character references
//!     {{IF field}}A{{ELSE}}B{{ENDIF}}   A if the field is set and non-empty, else B
//!
//! `{{ELSE}}` is optional and conditionals nest. A template is compiled once
//! into a segment tree, which is then evaluated against the fields of every
//! node of its kind. Nothing in a template is ever executed as code.

use super::escape::{escape, mangle};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

static FIELD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

/// Rendered field values of one node, keyed by attribute name.
pub type Fields = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unterminated directive at offset {position} in template {template:?}")]
    Unterminated { template: String, position: usize },

    #[error("empty directive at offset {position} in template {template:?}")]
    EmptyDirective { template: String, position: usize },

    #[error("invalid field name {name:?} in template {template:?}")]
    InvalidField { template: String, name: String },

    #[error("{directive} without a matching IF in template {template:?}")]
    Unbalanced {
        template: String,
        directive: &'static str,
    },

    #[error("IF {field} is never closed in template {template:?}")]
    UnclosedIf { template: String, field: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
    Escaped(String),
    EscapedStrict(String),
    Mangled(String),
    Conditional {
        field: String,
        then: Vec<Segment>,
        otherwise: Vec<Segment>,
    },
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let directives = lex(source)?;
        let mut parser = Parser {
            template: source,
            directives: directives.into_iter(),
        };
        let segments = match parser.sequence()? {
            (segments, Stop::End) => segments,
            (_, Stop::Else) => return Err(parser.unbalanced("ELSE")),
            (_, Stop::EndIf) => return Err(parser.unbalanced("ENDIF")),
        };
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against `fields`. Absent fields render as the empty string.
    pub fn render<R: Rng>(&self, fields: &Fields, rng: &mut R) -> String {
        let mut out = String::new();
        render_segments(&self.segments, fields, rng, &mut out);
        out
    }
}

fn render_segments<R: Rng>(segments: &[Segment], fields: &Fields, rng: &mut R, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Field(name) => out.push_str(value(fields, name)),
            Segment::Escaped(name) => out.push_str(&escape(value(fields, name), false)),
            Segment::EscapedStrict(name) => out.push_str(&escape(value(fields, name), true)),
            Segment::Mangled(name) => out.push_str(&mangle(value(fields, name), rng)),
            Segment::Conditional {
                field,
                then,
                otherwise,
            } => {
                let branch = if value(fields, field).is_empty() {
                    otherwise
                } else {
                    then
                };
                render_segments(branch, fields, rng, out);
            }
        }
    }
}

fn value<'f>(fields: &'f Fields, name: &str) -> &'f str {
    fields.get(name).map_or("", String::as_str)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive<'a> {
    Literal(&'a str),
    Field(&'a str),
    Escaped(&'a str),
    EscapedStrict(&'a str),
    Mangled(&'a str),
    If(&'a str),
    Else,
    EndIf,
}

fn lex(source: &str) -> Result<Vec<Directive<'_>>, TemplateError> {
    let mut directives = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            directives.push(Directive::Literal(&rest[..open]));
        }
        let after_open = &rest[open + 2..];
        let close = after_open.find("}}").ok_or_else(|| TemplateError::Unterminated {
            template: source.to_string(),
            position: offset + open,
        })?;
        let inner = &after_open[..close];
        directives.push(directive(source, inner, offset + open)?);

        let consumed = open + 2 + close + 2;
        rest = &rest[consumed..];
        offset += consumed;
    }
    if !rest.is_empty() {
        directives.push(Directive::Literal(rest));
    }
    Ok(directives)
}

fn directive<'a>(
    template: &str,
    inner: &'a str,
    position: usize,
) -> Result<Directive<'a>, TemplateError> {
    let directive = match inner {
        "" => {
            return Err(TemplateError::EmptyDirective {
                template: template.to_string(),
                position,
            })
        }
        "ELSE" => return Ok(Directive::Else),
        "ENDIF" => return Ok(Directive::EndIf),
        _ => {
            if let Some(field) = inner.strip_prefix("IF ") {
                Directive::If(field.trim())
            } else if let Some(field) = inner.strip_prefix("^^") {
                Directive::EscapedStrict(field)
            } else if let Some(field) = inner.strip_prefix('^') {
                Directive::Escaped(field)
            } else if let Some(field) = inner.strip_prefix('@') {
                Directive::Mangled(field)
            } else {
                Directive::Field(inner)
            }
        }
    };

    let name = match directive {
        Directive::Field(name)
        | Directive::Escaped(name)
        | Directive::EscapedStrict(name)
        | Directive::Mangled(name)
        | Directive::If(name) => name,
        _ => "",
    };
    if !FIELD_NAME.is_match(name) {
        return Err(TemplateError::InvalidField {
            template: template.to_string(),
            name: name.to_string(),
        });
    }
    Ok(directive)
}

enum Stop {
    End,
    Else,
    EndIf,
}

struct Parser<'a> {
    template: &'a str,
    directives: std::vec::IntoIter<Directive<'a>>,
}

impl Parser<'_> {
    /// Parse segments up to the end of input or the next `ELSE`/`ENDIF`.
    fn sequence(&mut self) -> Result<(Vec<Segment>, Stop), TemplateError> {
        let mut segments = Vec::new();
        while let Some(directive) = self.directives.next() {
            let segment = match directive {
                Directive::Literal(text) => Segment::Literal(text.to_string()),
                Directive::Field(name) => Segment::Field(name.to_string()),
                Directive::Escaped(name) => Segment::Escaped(name.to_string()),
                Directive::EscapedStrict(name) => Segment::EscapedStrict(name.to_string()),
                Directive::Mangled(name) => Segment::Mangled(name.to_string()),
                Directive::If(field) => self.conditional(field)?,
                Directive::Else => return Ok((segments, Stop::Else)),
                Directive::EndIf => return Ok((segments, Stop::EndIf)),
            };
            segments.push(segment);
        }
        Ok((segments, Stop::End))
    }

    fn conditional(&mut self, field: &str) -> Result<Segment, TemplateError> {
        let template = self.template;
        let unclosed = || TemplateError::UnclosedIf {
            template: template.to_string(),
            field: field.to_string(),
        };
        let (then, stop) = self.sequence()?;
        let otherwise = match stop {
            Stop::EndIf => Vec::new(),
            Stop::End => return Err(unclosed()),
            Stop::Else => match self.sequence()? {
                (otherwise, Stop::EndIf) => otherwise,
                (_, Stop::Else) => return Err(self.unbalanced("ELSE")),
                (_, Stop::End) => return Err(unclosed()),
            },
        };
        Ok(Segment::Conditional {
            field: field.to_string(),
            then,
            otherwise,
        })
    }

    fn unbalanced(&self, directive: &'static str) -> TemplateError {
        TemplateError::Unbalanced {
            template: self.template.to_string(),
            directive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&'static str, &str)]) -> Fields {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    fn render(template: &str, pairs: &[(&'static str, &str)]) -> String {
        Template::compile(template)
            .unwrap()
            .render(&fields(pairs), &mut rand::thread_rng())
    }

    #[test]
    fn test_fields_and_literals() {
        assert_eq!(render("<p>{{text}}</p>\n", &[("text", "hi")]), "<p>hi</p>\n");
        assert_eq!(render("{{missing}}!", &[]), "!");
    }

    #[test]
    fn test_escaping_strengths() {
        let pairs = [("code", "&amp; <x>")];
        assert_eq!(render("{{^code}}", &pairs), "&amp; &lt;x&gt;");
        assert_eq!(render("{{^^code}}", &pairs), "&amp;amp; &lt;x&gt;");
    }

    #[test]
    fn test_conditionals() {
        let template = "<{{IF header}}th{{ELSE}}td{{ENDIF}}>";
        assert_eq!(render(template, &[("header", "true")]), "<th>");
        assert_eq!(render(template, &[]), "<td>");
        // An empty value counts as unset.
        assert_eq!(render(template, &[("header", "")]), "<td>");
        assert_eq!(render("a{{IF x}}b{{ENDIF}}c", &[]), "ac");
    }

    #[test]
    fn test_nested_conditionals() {
        let template = "{{IF tight}}{{text}}{{ELSE}}<p{{IF line}} n={{line}}{{ENDIF}}>{{text}}</p>{{ENDIF}}";
        assert_eq!(render(template, &[("tight", "true"), ("text", "a")]), "a");
        assert_eq!(render(template, &[("text", "a"), ("line", "3")]), "<p n=3>a</p>");
        assert_eq!(render(template, &[("text", "a")]), "<p>a</p>");
    }

    #[test]
    fn test_mangled_field_has_no_plain_text() {
        let out = render("{{@href}}", &[("href", "mailto:a@b")]);
        assert!(out.starts_with("&#"));
        assert!(!out.contains("mailto"));
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            Template::compile("<p>{{text</p>"),
            Err(TemplateError::Unterminated { position: 3, .. })
        ));
        assert!(matches!(
            Template::compile("{{}}"),
            Err(TemplateError::EmptyDirective { .. })
        ));
        assert!(matches!(
            Template::compile("{{IF a}}x"),
            Err(TemplateError::UnclosedIf { .. })
        ));
        assert!(matches!(
            Template::compile("x{{ENDIF}}"),
            Err(TemplateError::Unbalanced { directive: "ENDIF", .. })
        ));
        assert!(matches!(
            Template::compile("{{IF a}}x{{ELSE}}y{{ELSE}}z{{ENDIF}}"),
            Err(TemplateError::Unbalanced { directive: "ELSE", .. })
        ));
        assert!(matches!(
            Template::compile("{{x.y}}"),
            Err(TemplateError::InvalidField { .. })
        ));
    }
}
