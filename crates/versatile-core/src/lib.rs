/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document loading and layout composition for Versatile.
//!
//! Content is written as plain text files with optional `@@` directive lines:
//!
//! ```text
//! @@ title Welcome
//! @@ layout main
//! @@ sidebar:partial nav
//! The body of the page.
//! ```
//!
//! Each file becomes a [`Document`], an ordered map of keys to [`Value`]s.
//! Filters named after a key (`sidebar:partial`) transform its value when the
//! file is parsed; the `mixin`, `partial`, `embed` and `template` filters
//! produce deferred values that are only evaluated when a document is
//! rendered.
//!
//! Rendering walks the document's `layout` chain. Each layout supplies
//! defaults for keys the document leaves out, and its deferred values (for
//! example a `content:template` that wraps `$content$`) are evaluated against
//! the merged document.
//!
//! # Example
//!
//! ```ignore
//! use versatile_core::{Document, Engine};
//!
//! let mut engine = Engine::new();
//! engine.add_text("@@ id main\n@@ content:template\n<main>$content$</main>", Document::new());
//! engine.add_text("@@ id home\n@@ layout main\nHello", Document::new());
//!
//! let page = engine.render("home", None)?.expect("home is stored");
//! assert_eq!(page.content().unwrap().to_text(), "<main>Hello</main>");
//! ```

pub mod compose;
pub mod config;
pub mod deferred;
pub mod document;
pub mod engine;
pub mod error;
pub mod filter;
pub mod loader;
pub mod log;
pub mod parser;
pub mod store;
pub mod value;

// Re-export main types at crate root
pub use compose::{RenderRequest, RenderScope};
pub use config::{ConfigFile, EngineConfig, FileTypeDefaults, FileTypes, SourceFormat};
pub use deferred::{Embed, Mixin, Partial, Template};
pub use document::{Document, keys};
pub use engine::Engine;
pub use error::{ConfigError, LoadError, RenderError, RenderResult};
pub use filter::{Filter, FilterRegistry, KeySpec};
pub use loader::{FileOutcome, LoadReport};
pub use log::{LogSink, Severity};
pub use parser::{DEFAULT_KEY_SPEC, DocumentParser};
pub use store::{Added, DocumentStore};
pub use value::{Deferred, Renderer, Value};
