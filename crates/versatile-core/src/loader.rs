/*
 * loader.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Content tree loading.
//!
//! Walks a directory, picks parser defaults for each file by extension, and
//! reads and parses the recognized files in parallel. Storing the results is
//! left to the caller so that it happens serially and in a stable order.

use crate::config::{FileTypeDefaults, FileTypes, SourceFormat};
use crate::document::{Document, keys};
use crate::error::LoadError;
use crate::filter::FilterRegistry;
use crate::log::LogSink;
use crate::parser::DocumentParser;
use crate::store::Added;
use crate::value::Value;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every regular file below `root`, sorted.
///
/// Symbolic links are not followed. Entries below the root that cannot be
/// read are reported through `sink` and skipped; failing to read the root
/// itself is an error.
pub fn discover_files(root: &Path, sink: &LogSink) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) if err.depth() == 0 => {
                return Err(LoadError::Walk {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => sink.warn(&format!("Skipping unreadable entry: {err}")),
        }
    }

    files.sort();
    Ok(files)
}

/// Read and parse one file.
pub fn load_file(
    path: &Path,
    defaults: &FileTypeDefaults,
    filters: &FilterRegistry,
) -> Result<Document, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path.to_string_lossy().into_owned();

    match defaults.format {
        SourceFormat::Versatile => {
            let mut extra = Document::new();
            extra.insert(keys::FILENAME, filename);
            Ok(DocumentParser::new(filters).parse(
                &text,
                Some(&defaults.key),
                Some(&defaults.content_type),
                extra,
            ))
        }
        SourceFormat::Json => {
            let json: serde_json::Value =
                serde_json::from_str(&text).map_err(|source| LoadError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            let Value::Map(object) = Value::from(json) else {
                return Err(LoadError::NotAnObject {
                    path: path.to_path_buf(),
                });
            };
            let mut doc = Document::new();
            doc.insert(keys::CONTENT_TYPE, defaults.content_type.as_str());
            doc.insert(keys::FILENAME, filename);
            doc.overlay(&object);
            Ok(doc)
        }
    }
}

/// Read and parse every recognized file in `paths` in parallel.
///
/// Results come back in the order of `paths`; files with no registered
/// file type are returned separately.
pub fn load_files(
    paths: Vec<PathBuf>,
    file_types: &FileTypes,
    filters: &FilterRegistry,
    sink: &LogSink,
) -> (Vec<(PathBuf, Result<Document, LoadError>)>, Vec<PathBuf>) {
    let (recognized, skipped): (Vec<_>, Vec<_>) = paths
        .into_iter()
        .partition(|path| file_types.for_path(path).is_some());

    for path in &skipped {
        sink.debug(&format!("Skipping file with unknown type: {}", path.display()));
    }

    let loaded = recognized
        .into_par_iter()
        .filter_map(|path| {
            let defaults = file_types.for_path(&path)?;
            sink.info(&format!("Processing content file: {}", path.display()));
            let result = load_file(&path, defaults, filters);
            if let Err(err) = &result {
                sink.error(&err.to_string());
            }
            Some((path, result))
        })
        .collect();

    (loaded, skipped)
}

/// What happened to one recognized file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<Added, LoadError>,
}

/// Summary of a load phase.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// One entry per recognized file, in path order.
    pub files: Vec<FileOutcome>,
    /// Files skipped because their extension has no registered defaults.
    pub skipped: Vec<PathBuf>,
}

impl LoadReport {
    /// Files that failed to load.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &LoadError)> {
        self.files.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(err) => Some((outcome.path.as_path(), err)),
        })
    }

    /// Number of documents added to the store.
    pub fn stored(&self) -> usize {
        self.files
            .iter()
            .filter(|outcome| matches!(outcome.result, Ok(ref added) if *added != Added::Skipped))
            .count()
    }

    pub fn is_ok(&self) -> bool {
        self.failures().next().is_none()
    }
}
