//! Link definition table
//!
//! Filled while block tokenization meets `[label]: href "title"` lines and read
//! when reference links are resolved. One table belongs to one parse call.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDefinition {
    pub href: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkTable {
    definitions: HashMap<String, LinkDefinition>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. A later definition of the same label replaces an earlier one.
    pub fn define(&mut self, label: &str, href: &str, title: Option<&str>) {
        let key = normalize_label(label);
        tracing::debug!(label = %key, href, "link definition");
        self.definitions.insert(
            key,
            LinkDefinition {
                href: href.to_string(),
                title: title.map(str::to_string),
            },
        );
    }

    pub fn get(&self, label: &str) -> Option<&LinkDefinition> {
        self.definitions.get(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Case-fold a label and collapse its internal whitespace.
pub fn normalize_label(label: &str) -> String {
    WHITESPACE_RUN.replace_all(label, " ").to_lowercase()
}
