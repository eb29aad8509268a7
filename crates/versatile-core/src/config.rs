/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Engine configuration: filters and per-extension parser defaults.
//!
//! Each [`Engine`](crate::Engine) owns one [`EngineConfig`]. File-type
//! defaults can also be overridden from a TOML file:
//!
//! ```toml
//! [file-types.".md"]
//! key = "content:html"
//! content-type = "text/markdown"
//!
//! [file-types.".data"]
//! content-type = "application/json"
//! format = "json"
//! ```

use crate::error::ConfigError;
use crate::filter::FilterRegistry;
use crate::parser::DEFAULT_KEY_SPEC;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// How files of a given type are turned into documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// The `@@` directive grammar.
    #[default]
    Versatile,
    /// A JSON object stored as-is.
    Json,
}

/// Parser defaults for one file extension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileTypeDefaults {
    /// Key spec for text before the first block directive.
    #[serde(default = "default_key")]
    pub key: String,

    /// Stored under `contentType`.
    pub content_type: String,

    #[serde(default)]
    pub format: SourceFormat,
}

fn default_key() -> String {
    DEFAULT_KEY_SPEC.to_string()
}

impl FileTypeDefaults {
    pub fn new(key: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content_type: content_type.into(),
            format: SourceFormat::Versatile,
        }
    }

    /// Defaults for JSON documents.
    pub fn json(content_type: impl Into<String>) -> Self {
        Self {
            key: default_key(),
            content_type: content_type.into(),
            format: SourceFormat::Json,
        }
    }
}

/// Extension → defaults mapping.
///
/// Extensions are stored with their leading dot (`.txt`); lookups accept
/// either form.
#[derive(Debug, Clone, Default)]
pub struct FileTypes {
    types: HashMap<String, FileTypeDefaults>,
}

impl FileTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// `.txt`, `.html` and `.json`.
    pub fn with_builtins() -> Self {
        let mut types = Self::new();
        types.set(".txt", FileTypeDefaults::new("content", "text/plain"));
        types.set(".html", FileTypeDefaults::new("content:html", "text/html"));
        types.set(".json", FileTypeDefaults::json("application/json"));
        types
    }

    pub fn set(&mut self, extension: &str, defaults: FileTypeDefaults) -> &mut Self {
        self.types.insert(normalize_extension(extension), defaults);
        self
    }

    pub fn get(&self, extension: &str) -> Option<&FileTypeDefaults> {
        self.types.get(&normalize_extension(extension))
    }

    /// Defaults for `path`, chosen by its extension.
    pub fn for_path(&self, path: &Path) -> Option<&FileTypeDefaults> {
        let extension = path.extension()?.to_str()?;
        self.get(extension)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

/// Overrides read from a TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub file_types: HashMap<String, FileTypeDefaults>,
}

impl ConfigFile {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// Everything an engine needs besides its documents.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub filters: FilterRegistry,
    pub file_types: FileTypes,
}

impl EngineConfig {
    /// Built-in filters and file types.
    pub fn new() -> Self {
        Self {
            filters: FilterRegistry::with_builtins(),
            file_types: FileTypes::with_builtins(),
        }
    }

    /// Apply the overrides from a config file.
    pub fn apply(&mut self, file: ConfigFile) -> &mut Self {
        for (extension, defaults) in file.file_types {
            self.file_types.set(&extension, defaults);
        }
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
