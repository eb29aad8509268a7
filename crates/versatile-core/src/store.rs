/*
 * store.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Identifier-indexed document storage.

use crate::document::{Document, keys};
use std::collections::HashMap;

/// Outcome of [`DocumentStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Added {
    /// The document was empty and was not stored.
    Skipped,
    /// Stored and reachable by this identifier.
    Indexed(String),
    /// Stored in the document list, but another document already owns this
    /// identifier.
    Shadowed(String),
    /// Stored in the document list without any identifier.
    Anonymous,
}

/// All loaded documents plus an identifier index.
///
/// The first document added under an identifier owns it for the rest of the
/// load phase. Later documents with the same identifier stay in
/// [`documents`](Self::documents) but are not returned by [`get`](Self::get).
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document.
    ///
    /// Empty documents are ignored. A document without an `id` gets its
    /// `filename` as `id`.
    pub fn add(&mut self, mut doc: Document) -> Added {
        if doc.is_empty() {
            return Added::Skipped;
        }

        if !doc.contains_key(keys::ID) {
            if let Some(filename) = doc.filename().map(str::to_string) {
                doc.insert(keys::ID, filename);
            }
        }

        let index = self.documents.len();
        let id = doc.id();
        self.documents.push(doc);

        match id {
            Some(id) if self.by_id.contains_key(&id) => {
                tracing::warn!(id = %id, "Duplicate document id; keeping the first document");
                Added::Shadowed(id)
            }
            Some(id) => {
                self.by_id.insert(id.clone(), index);
                Added::Indexed(id)
            }
            None => Added::Anonymous,
        }
    }

    /// Look up a document by identifier.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&index| &self.documents[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Every stored document, in the order it was added.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Identifiers reachable through [`get`](Self::get), in insertion order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<(&str, usize)> = self
            .by_id
            .iter()
            .map(|(id, &index)| (id.as_str(), index))
            .collect();
        ids.sort_unstable_by_key(|&(_, index)| index);
        ids.into_iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Drop every document, ahead of a full reload.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.by_id.clear();
    }
}
