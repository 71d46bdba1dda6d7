//! The HTML template of every node kind.
//!
//! Block templates end with a newline; inline templates do not. Tags that can
//! be traced back to a source line carry the `data-source-line` attribute when
//! the renderer sets `source_line`.

use super::template::{Template, TemplateError};
use crate::markdown::ast::NodeKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

macro_rules! line_attr {
    () => {
        r#"{{IF source_line}} data-source-line="{{source_line}}"{{ENDIF}}"#
    };
}

const CODE: &str = concat!(
    "<pre",
    line_attr!(),
    r#"><code{{IF lang}} class="lang-{{lang}}"{{ENDIF}}>{{^^code}}"#,
    "\n</code></pre>{{IF lang}}\n{{ENDIF}}"
);
const HEADING: &str = concat!(
    r#"<h{{level}} id="{{id}}""#,
    line_attr!(),
    ">{{text}}</h{{level}}>\n"
);
const TABLE: &str = concat!(
    "<table",
    line_attr!(),
    ">\n<thead>\n{{header}}</thead>\n<tbody>\n{{body}}</tbody>\n</table>\n"
);
const TABLE_ROW: &str = concat!("<tr", line_attr!(), ">\n{{content}}</tr>\n");
const TABLE_CELL: &str = concat!(
    "<{{IF header}}th{{ELSE}}td{{ENDIF}}",
    r#"{{IF align}} style="text-align:{{align}}"{{ENDIF}}"#,
    line_attr!(),
    ">{{text}}</{{IF header}}th{{ELSE}}td{{ENDIF}}>\n"
);
const RULE: &str = concat!("<hr", line_attr!(), "/>\n");
const QUOTE: &str = concat!("<blockquote", line_attr!(), ">\n{{text}}</blockquote>\n");
const LIST: &str = concat!(
    "<{{list_type}}",
    line_attr!(),
    ">\n{{items}}</{{list_type}}>\n"
);
const LIST_ITEM: &str = concat!("<li", line_attr!(), ">{{text}}</li>\n");
const PARAGRAPH: &str = concat!("<p", line_attr!(), ">{{text}}</p>\n");
const BLOCK_TEXT: &str = concat!(
    "{{IF tight}}{{text}}{{ELSE}}<p",
    line_attr!(),
    ">{{text}}</p>\n{{ENDIF}}"
);
const INLINE_MATH: &str = concat!(
    r#"<latex class="inline""#,
    line_attr!(),
    ">{{IF rendered}}{{rendered}}{{ELSE}}{{^latex}}{{ENDIF}}</latex>"
);
const BLOCK_MATH: &str = concat!(
    r#"<latex class="block""#,
    line_attr!(),
    ">{{IF rendered}}{{rendered}}{{ELSE}}{{^latex}}{{ENDIF}}</latex>"
);
const AUTOLINK: &str = concat!(
    r#"{{IF mailto}}<a href="{{@href}}""#,
    line_attr!(),
    r#">{{@text}}</a>{{ELSE}}<a href="{{^href}}""#,
    line_attr!(),
    ">{{^text}}</a>{{ENDIF}}"
);
const URL: &str = concat!(r#"<a href="{{^href}}""#, line_attr!(), ">{{^text}}</a>");
const TAG: &str = concat!(
    "{{IF comment}}{{text}}{{ELSE}}<{{IF is_closing}}/{{ENDIF}}{{text}}",
    line_attr!(),
    "{{IF self_close}}/{{ENDIF}}>{{ENDIF}}"
);
const LINK: &str = concat!(
    r#"{{IF image}}<img src="{{^href}}" alt="{{^text}}"{{IF title}} title="{{^title}}"{{ENDIF}}"#,
    line_attr!(),
    r#"/>{{ELSE}}<a href="{{^href}}"{{IF title}} title="{{^title}}"{{ENDIF}}"#,
    line_attr!(),
    ">{{text}}</a>{{ENDIF}}"
);
const STRONG: &str = concat!("<strong", line_attr!(), ">{{text}}</strong>");
const EM: &str = concat!("<em", line_attr!(), ">{{text}}</em>");
const INLINE_CODE: &str = concat!("<code", line_attr!(), ">{{^^text}}</code>");
const BREAK: &str = concat!("<br", line_attr!(), "/>");
const DEL: &str = concat!("<del", line_attr!(), ">{{text}}</del>");

/// Template source for `kind`.
pub fn source(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Space | NodeKind::Definition => "",
        NodeKind::BlockCode | NodeKind::Fences => CODE,
        NodeKind::Heading | NodeKind::LineHeading => HEADING,
        NodeKind::NoPipeTable | NodeKind::Table => TABLE,
        NodeKind::TableRow => TABLE_ROW,
        NodeKind::TableCell => TABLE_CELL,
        NodeKind::HorizontalRule => RULE,
        NodeKind::BlockQuote => QUOTE,
        NodeKind::List => LIST,
        NodeKind::ListItem => LIST_ITEM,
        NodeKind::Html => "{{text}}",
        NodeKind::Paragraph => PARAGRAPH,
        NodeKind::BlockText => BLOCK_TEXT,
        NodeKind::InlineMath => INLINE_MATH,
        NodeKind::BlockMath => BLOCK_MATH,
        NodeKind::Escape | NodeKind::InlineText => "{{^text}}",
        NodeKind::AutoLink => AUTOLINK,
        NodeKind::Url => URL,
        NodeKind::Tag => TAG,
        NodeKind::Link | NodeKind::ReferenceLink | NodeKind::NoTextRefLink => LINK,
        NodeKind::StrongUs | NodeKind::StrongAs => STRONG,
        NodeKind::EmUs | NodeKind::EmAs => EM,
        NodeKind::InlineCode => INLINE_CODE,
        NodeKind::Break => BREAK,
        NodeKind::Del => DEL,
    }
}

/// Compile the template of every node kind.
pub fn compile_all() -> Result<HashMap<NodeKind, Template>, TemplateError> {
    NodeKind::ALL
        .iter()
        .map(|kind| Ok((*kind, Template::compile(source(*kind))?)))
        .collect()
}

static TEMPLATES: Lazy<HashMap<NodeKind, Template>> = Lazy::new(|| {
    let templates = compile_all().expect("built-in templates must compile");
    tracing::debug!(count = templates.len(), "render templates compiled");
    templates
});

/// The compiled template for `kind`.
pub fn template_for(kind: NodeKind) -> &'static Template {
    // compile_all covers NodeKind::ALL, so every kind is present.
    &TEMPLATES[&kind]
}
