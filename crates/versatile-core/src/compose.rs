/*
 * compose.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Layout composition.
//!
//! Rendering a document walks its `layout` chain. Each link is one *merge
//! step*: the document's keys are laid over the layout's keys, and every key
//! the layout declares as [`Value::Deferred`] is evaluated with the merged
//! document as context. A layout's deferred `content` can therefore wrap the
//! content of the document that inherits from it.
//!
//! The [`RenderScope`] is passed explicitly through every merge step and every
//! deferred evaluation. Deferred filters that render other documents
//! (`mixin`, `partial`, `embed`) call back into the same scope, which tracks
//! the chain of documents being rendered so that reference cycles fail
//! instead of recursing forever.

use crate::document::{Document, keys};
use crate::error::{RenderError, RenderResult};
use crate::store::DocumentStore;
use crate::value::Value;
use std::collections::HashSet;

/// What to render: a stored identifier or a document supplied directly.
#[derive(Debug, Clone, Copy)]
pub enum RenderRequest<'a> {
    Id(&'a str),
    Document(&'a Document),
}

impl<'a> From<&'a str> for RenderRequest<'a> {
    fn from(id: &'a str) -> Self {
        RenderRequest::Id(id)
    }
}

impl<'a> From<&'a String> for RenderRequest<'a> {
    fn from(id: &'a String) -> Self {
        RenderRequest::Id(id)
    }
}

impl<'a> From<&'a Document> for RenderRequest<'a> {
    fn from(doc: &'a Document) -> Self {
        RenderRequest::Document(doc)
    }
}

/// State threaded through one top-level render call.
#[derive(Debug)]
pub struct RenderScope<'s> {
    store: &'s DocumentStore,

    /// Identifiers of the documents currently being rendered, outermost
    /// first.
    chain: Vec<String>,
}

impl<'s> RenderScope<'s> {
    pub fn new(store: &'s DocumentStore) -> Self {
        Self {
            store,
            chain: Vec::new(),
        }
    }

    /// The store that identifiers are resolved against.
    pub fn store(&self) -> &'s DocumentStore {
        self.store
    }

    /// Identifiers of the documents currently being rendered.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Render a document.
    ///
    /// Returns `Ok(None)` when an identifier is not in the store. `extra` is
    /// laid over the starting document before composition; its keys win.
    pub fn render(
        &mut self,
        request: RenderRequest<'_>,
        extra: Option<&Document>,
    ) -> RenderResult<Option<Document>> {
        let start = match request {
            RenderRequest::Id(id) => match self.store.get(id) {
                Some(doc) => doc,
                None => {
                    tracing::debug!(id, "Requested document not found");
                    return Ok(None);
                }
            },
            RenderRequest::Document(doc) => doc,
        };

        let id = start.id();
        if let Some(id) = &id {
            if self.chain.contains(id) {
                return Err(RenderError::RecursiveReference { id: id.clone() });
            }
            self.chain.push(id.clone());
        }

        let result = self.compose(start, extra);

        if id.is_some() {
            self.chain.pop();
        }
        result.map(Some)
    }

    fn compose(&mut self, start: &Document, extra: Option<&Document>) -> RenderResult<Document> {
        let mut requested = start.clone();
        if let Some(extra) = extra {
            requested.overlay(extra);
        }

        // The starting document takes the layout position: its own deferred
        // values are evaluated against the requested document, extra context
        // included. Without extra context this is a merge step over an empty
        // document.
        let mut current = self.resolve_deferred(requested, start)?;

        let mut used = HashSet::new();
        while let Some(layout_id) = current.layout() {
            if !used.insert(layout_id.clone()) {
                return Err(RenderError::RecursiveLayout { id: layout_id });
            }
            let store = self.store;
            let Some(layout) = store.get(&layout_id) else {
                return Err(RenderError::LayoutNotFound { id: layout_id });
            };
            tracing::debug!(layout = %layout_id, "Merging into layout");
            current = self.merge_step(&current, layout)?;
        }

        Ok(current)
    }

    /// Lay `doc` (minus its `layout` key) over `layout`, then evaluate the
    /// layout's deferred values against the result.
    fn merge_step(&mut self, doc: &Document, layout: &Document) -> RenderResult<Document> {
        let mut merged = layout.clone();
        for (key, value) in doc.iter() {
            if key != keys::LAYOUT {
                merged.insert(key, value.clone());
            }
        }
        self.resolve_deferred(merged, layout)
    }

    /// Evaluate every key that `layout` declares as deferred, with `merged`
    /// as the context.
    fn resolve_deferred(
        &mut self,
        mut merged: Document,
        layout: &Document,
    ) -> RenderResult<Document> {
        let merged_keys: Vec<String> = merged.keys().map(str::to_string).collect();
        for key in merged_keys {
            if let Some(Value::Deferred(deferred)) = layout.get(&key) {
                tracing::debug!(key = %key, renderer = deferred.name(), "Evaluating deferred value");
                let value = deferred.render(self, &mut merged, &key)?;
                merged.insert(key, value);
            }
        }

        Ok(merged)
    }
}
