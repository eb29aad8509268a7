/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The `@@` directive grammar.
//!
//! A document file is plain text with optional directive lines:
//!
//! ```text
//! @@ title Hello, world
//! @@ count:int 3
//! @@ sidebar
//! Sidebar text spanning
//! several lines.
//! ```
//!
//! `@@ key value` assigns a single-line value. `@@ key` with nothing after it
//! opens a block that collects every following plain line until the next block
//! directive or the end of input. Text before the first block directive lands
//! in the default key (usually `content`).

use crate::document::{Document, keys};
use crate::filter::{FilterRegistry, KeySpec};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

/// The key spec used when the caller does not supply one.
pub const DEFAULT_KEY_SPEC: &str = "content";

/// Matches a directive line. Group 1 is the key path, group 2 the inline
/// text (possibly empty).
static DIRECTIVE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*@@\s+([A-Za-z0-9_]+(?::[A-Za-z0-9_]+)*)(?:\s+(.*?))?\s*$")
        .expect("Invalid regex pattern for directive lines")
});

/// A classified input line.
#[derive(Debug)]
enum Line<'t> {
    /// `@@ key:filters` with optional inline text.
    Directive { spec: KeySpec, text: Option<&'t str> },
    /// Anything else, including directives that name unknown filters.
    Text(&'t str),
}

/// The block currently collecting plain lines.
#[derive(Debug)]
struct Block<'t> {
    spec: KeySpec,
    lines: Vec<&'t str>,
}

impl<'t> Block<'t> {
    fn new(spec: KeySpec) -> Self {
        Block {
            spec,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: &'t str) {
        // Empty lines ahead of any content are dropped.
        if !self.lines.is_empty() || !line.is_empty() {
            self.lines.push(line);
        }
    }

    /// Store the collected text under the block's key, if any remains once
    /// trailing empty lines are removed.
    fn close(mut self, doc: &mut Document) {
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            return;
        }
        let value = self.spec.apply(Value::from(self.lines.join("\n")), doc);
        doc.insert(self.spec.key, value);
    }
}

/// Parses document text against a filter registry.
#[derive(Debug, Clone, Copy)]
pub struct DocumentParser<'a> {
    filters: &'a FilterRegistry,
}

impl<'a> DocumentParser<'a> {
    pub fn new(filters: &'a FilterRegistry) -> Self {
        Self { filters }
    }

    /// Parse `text` into a document.
    ///
    /// # Arguments
    /// * `default_key_spec` - key spec for text before the first block
    ///   directive; [`DEFAULT_KEY_SPEC`] when `None`
    /// * `content_type` - stored under `contentType`
    /// * `extra` - properties such as `filename`, stored before any directive
    ///   is processed so directives can override them
    pub fn parse(
        &self,
        text: &str,
        default_key_spec: Option<&str>,
        content_type: Option<&str>,
        extra: Document,
    ) -> Document {
        let mut doc = Document::new();
        if let Some(content_type) = content_type {
            doc.insert(keys::CONTENT_TYPE, content_type);
        }
        doc.overlay(&extra);

        let mut block = Block::new(self.default_spec(default_key_spec));

        for line in text.lines() {
            match self.classify(line) {
                Line::Directive {
                    spec,
                    text: Some(inline),
                } => {
                    let value = spec.apply(Value::from(inline), &doc);
                    doc.insert(spec.key, value);
                }
                Line::Directive { spec, text: None } => {
                    std::mem::replace(&mut block, Block::new(spec)).close(&mut doc);
                }
                Line::Text(text) => block.push(text),
            }
        }
        block.close(&mut doc);

        doc
    }

    /// Parse with the default key spec and no extra properties.
    pub fn parse_str(&self, text: &str) -> Document {
        self.parse(text, None, None, Document::new())
    }

    fn default_spec(&self, spec: Option<&str>) -> KeySpec {
        let spec = spec.unwrap_or(DEFAULT_KEY_SPEC);
        self.filters.parse_key_spec(spec).unwrap_or_else(|| {
            tracing::warn!(
                spec,
                "Default key spec names an unknown filter; using plain `content`"
            );
            KeySpec::plain(keys::CONTENT)
        })
    }

    fn classify<'t>(&self, line: &'t str) -> Line<'t> {
        let Some(captures) = DIRECTIVE_LINE.captures(line) else {
            return Line::Text(line);
        };
        let Some(spec) = self.filters.parse_key_spec(&captures[1]) else {
            return Line::Text(line);
        };
        let text = captures
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|text| !text.is_empty());
        Line::Directive { spec, text }
    }
}
