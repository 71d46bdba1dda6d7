//! Configuration loader
//!
//! `defaults/markgrammar.default.toml` is embedded into the binary so the
//! documented defaults and runtime behavior stay in sync. Callers layer user
//! files and single-key overrides on top with [`Loader`] before deserializing
//! into [`MarkdownConfig`].

use super::ast::AstFormat;
use super::Options;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/markgrammar.default.toml");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkdownConfig {
    pub render: RenderConfig,
    pub ast: AstConfig,
}

/// Mirrors [`Options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    pub include_lines: bool,
    pub wrap_in_html: bool,
    pub expand_toc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AstConfig {
    pub format: AstFormat,
}

impl From<RenderConfig> for Options {
    fn from(config: RenderConfig) -> Self {
        Options {
            include_lines: config.include_lines,
            wrap_in_html: config.wrap_in_html,
            expand_toc: config.expand_toc,
        }
    }
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. A missing file is an error at build time.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file if it exists.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<MarkdownConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<MarkdownConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(!config.render.include_lines);
        assert!(!config.render.wrap_in_html);
        assert!(!config.render.expand_toc);
        assert_eq!(config.ast.format, AstFormat::Yaml);
        assert_eq!(Options::from(config.render), Options::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("render.include_lines", true)
            .expect("override to apply")
            .set_override("ast.format", "json")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.render.include_lines);
        assert_eq!(config.ast.format, AstFormat::Json);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[render]\nwrap_in_html = true").unwrap();
        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert!(config.render.wrap_in_html);
        assert!(!config.render.include_lines);
    }

    #[test]
    fn missing_required_file_fails() {
        assert!(Loader::new().with_file("/nonexistent/markgrammar.toml").build().is_err());
        assert!(Loader::new()
            .with_optional_file("/nonexistent/markgrammar.toml")
            .build()
            .is_ok());
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Loader::new()
            .set_override("ast.format", "xml")
            .unwrap()
            .build();
        assert!(result.is_err());
    }
}
