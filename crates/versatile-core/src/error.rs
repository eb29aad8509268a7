/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for loading, configuration and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Structural errors that abort a single render call.
///
/// Missing mixin/partial/embed targets are not errors; they degrade to inline
/// text in the rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A document in the layout chain names a layout that is not in the store.
    #[error("Unable to render document: layout \"{id}\" not found")]
    LayoutNotFound { id: String },

    /// The same layout appears twice in one layout chain.
    #[error("Unable to render document: layout \"{id}\" usage is recursive")]
    RecursiveLayout { id: String },

    /// A mixin/partial/embed reference re-enters a document that is already
    /// being rendered further up the call chain.
    #[error("Unable to render document: reference \"{id}\" is recursive")]
    RecursiveReference { id: String },
}

impl RenderError {
    /// HTTP-style status code for callers that serve rendered documents.
    pub fn status_code(&self) -> u16 {
        500
    }
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while loading a content tree.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The content root could not be walked.
    #[error("Unable to read content directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A content file could not be read.
    #[error("Unable to read content file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A structured document is not valid JSON.
    #[error("Unable to parse JSON document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A structured document parsed, but is not a JSON object.
    #[error("JSON document {} must contain an object", path.display())]
    NotAnObject { path: PathBuf },
}

impl LoadError {
    /// The file or directory the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Walk { path, .. }
            | LoadError::Io { path, .. }
            | LoadError::Json { path, .. }
            | LoadError::NotAnObject { path } => path,
        }
    }
}

/// Errors reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
