/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The public entry point: configuration, document store and rendering.

use crate::compose::{RenderRequest, RenderScope};
use crate::config::{EngineConfig, FileTypeDefaults};
use crate::document::Document;
use crate::error::{LoadError, RenderResult};
use crate::loader::{self, FileOutcome, LoadReport};
use crate::log::LogSink;
use crate::parser::DocumentParser;
use crate::store::{Added, DocumentStore};
use crate::value::Value;
use std::path::Path;

/// A configured document store and renderer.
///
/// Loading needs `&mut self` and rendering needs `&self`, so a load phase can
/// never overlap a render or another load.
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
    store: DocumentStore,
    sink: LogSink,
}

impl Engine {
    /// An engine with the built-in filters and file types.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Register a filter, replacing any filter with the same name.
    ///
    /// Only documents parsed after this call can use the filter.
    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        filter: impl Fn(Value, &Document, &str) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.config.filters.register(name, filter);
        self
    }

    /// Set the parser defaults for files with `extension` (e.g. `.md`).
    pub fn set_file_type_defaults(
        &mut self,
        extension: &str,
        defaults: FileTypeDefaults,
    ) -> &mut Self {
        self.config.file_types.set(extension, defaults);
        self
    }

    /// Replace the sink that load-phase messages are reported to.
    pub fn set_log_sink(&mut self, sink: LogSink) -> &mut Self {
        self.sink = sink;
        self
    }

    /// A parser using this engine's filters.
    pub fn parser(&self) -> DocumentParser<'_> {
        DocumentParser::new(&self.config.filters)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Add a document that did not come from the content tree.
    pub fn add_document(&mut self, doc: Document) -> Added {
        self.store.add(doc)
    }

    /// Parse `text` with the default key spec and add the result.
    pub fn add_text(&mut self, text: &str, extra: Document) -> Added {
        let doc = self.parser().parse(text, None, None, extra);
        self.store.add(doc)
    }

    /// Drop every stored document ahead of a full reload.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Load every recognized file below `root` into the store.
    ///
    /// Files are read and parsed in parallel, then stored in path order.
    /// Per-file failures are reported through the log sink and in the
    /// returned report; they do not stop the load. Only failing to walk
    /// `root` itself is an error.
    pub fn load_content_tree(&mut self, root: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
        let root = root.as_ref();
        let paths = loader::discover_files(root, &self.sink).inspect_err(|err| {
            self.sink.error(&err.to_string());
        })?;

        let (loaded, skipped) = loader::load_files(
            paths,
            &self.config.file_types,
            &self.config.filters,
            &self.sink,
        );

        let mut report = LoadReport {
            files: Vec::with_capacity(loaded.len()),
            skipped,
        };
        for (path, result) in loaded {
            let result = result.map(|doc| {
                let added = self.store.add(doc);
                if let Added::Shadowed(id) = &added {
                    self.sink.warn(&format!(
                        "Document id \"{id}\" in {} is already taken; it will not be reachable by id",
                        path.display()
                    ));
                }
                added
            });
            report.files.push(FileOutcome { path, result });
        }

        tracing::info!(
            root = %root.display(),
            stored = report.stored(),
            failed = report.failures().count(),
            skipped = report.skipped.len(),
            "Content tree loaded"
        );
        Ok(report)
    }

    /// Render a document by identifier or directly.
    ///
    /// Returns `Ok(None)` if the identifier is not in the store, and `Err`
    /// for a broken layout chain or a reference cycle.
    pub fn render<'r>(
        &self,
        request: impl Into<RenderRequest<'r>>,
        extra: Option<&Document>,
    ) -> RenderResult<Option<Document>> {
        RenderScope::new(&self.store).render(request.into(), extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::log::Severity;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn doc(pairs: &[(&str, &str)]) -> Document {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_render_unknown_id() {
        let engine = Engine::new();
        assert_eq!(engine.render("missing", None), Ok(None));
    }

    #[test]
    fn test_register_filter_affects_parsing() {
        let mut engine = Engine::new();
        engine.register_filter("upper", |v, _, _| Value::from(v.to_text().to_uppercase()));
        engine.add_text("@@ id page\n@@ title:upper hello", Document::new());

        let rendered = engine.render("page", None).unwrap().unwrap();
        assert_eq!(rendered.get("title"), Some(&Value::from("HELLO")));
    }

    #[test]
    fn test_load_content_tree_reports_failures() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "@@ id a\nA").unwrap();
        fs::write(temp.path().join("bad.json"), "{").unwrap();
        fs::write(temp.path().join("skip.bin"), "x").unwrap();

        let messages = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&messages);
        let mut engine = Engine::new();
        engine.set_log_sink(LogSink::new(move |severity, message| {
            captured.lock().unwrap().push((severity, message.to_string()));
        }));

        let report = engine.load_content_tree(temp.path()).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.stored(), 1);
        assert_eq!(report.skipped, vec![temp.path().join("skip.bin")]);
        let failures: Vec<&Path> = report.failures().map(|(path, _)| path).collect();
        assert_eq!(failures, vec![temp.path().join("bad.json").as_path()]);
        assert!(!report.is_ok());
        assert!(engine.store().contains("a"));

        let messages = messages.lock().unwrap();
        assert!(
            messages
                .iter()
                .any(|(severity, message)| *severity == Severity::Error
                    && message.contains("bad.json"))
        );
    }

    #[test]
    fn test_load_missing_root() {
        let temp = TempDir::new().unwrap();
        let mut engine = Engine::new();
        engine.set_log_sink(LogSink::new(|_, _| {}));
        let result = engine.load_content_tree(temp.path().join("nope"));
        assert!(matches!(result, Err(LoadError::Walk { .. })));
    }

    #[test]
    fn test_custom_file_type() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("note.md"), "# Title").unwrap();

        let mut engine = Engine::new();
        engine.set_log_sink(LogSink::new(|_, _| {}));
        engine.set_file_type_defaults(".md", FileTypeDefaults::new("body", "text/markdown"));
        engine.load_content_tree(temp.path()).unwrap();

        let id = temp.path().join("note.md").to_string_lossy().into_owned();
        let stored = engine.store().get(&id).unwrap();
        assert_eq!(stored.get("body"), Some(&Value::from("# Title")));
        assert_eq!(stored.get("contentType"), Some(&Value::from("text/markdown")));
    }

    #[test]
    fn test_clear_then_reload() {
        let mut engine = Engine::new();
        engine.add_document(doc(&[("id", "a")]));
        engine.clear();
        assert!(engine.store().is_empty());
        assert_eq!(engine.render("a", None), Ok(None));
    }

    #[test]
    fn test_render_error_is_value() {
        let mut engine = Engine::new();
        engine.add_document(doc(&[("id", "page"), ("layout", "ghost")]));
        assert_eq!(
            engine.render("page", None),
            Err(RenderError::LayoutNotFound {
                id: "ghost".to_string()
            })
        );
    }
}
