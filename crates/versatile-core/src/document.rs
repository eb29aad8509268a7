/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The ordered key/value document.

use crate::value::Value;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Reserved document keys.
pub mod keys {
    /// Unique identifier; defaults to [`FILENAME`].
    pub const ID: &str = "id";
    /// Path the document was loaded from.
    pub const FILENAME: &str = "filename";
    /// MIME-ish hint from the file-type defaults.
    pub const CONTENT_TYPE: &str = "contentType";
    /// Identifier of the document to inherit from.
    pub const LAYOUT: &str = "layout";
    /// Primary body.
    pub const CONTENT: &str = "content";
}

/// An ordered mapping from keys to values.
///
/// Insertion order is preserved; overwriting an existing key keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Keep only the entries for which `f` returns true.
    pub fn retain(&mut self, mut f: impl FnMut(&str, &Value) -> bool) {
        self.entries.retain(|k, v| f(k, v));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every entry of `other` into this document; `other` wins on
    /// collision.
    pub fn overlay(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// The document's identifier, if it has a non-empty one.
    pub fn id(&self) -> Option<String> {
        self.get(keys::ID).and_then(Value::as_identifier)
    }

    pub fn filename(&self) -> Option<&str> {
        self.get(keys::FILENAME).and_then(Value::as_str)
    }

    /// The identifier of the layout this document inherits from.
    pub fn layout(&self) -> Option<String> {
        self.get(keys::LAYOUT).and_then(Value::as_identifier)
    }

    pub fn content(&self) -> Option<&Value> {
        self.get(keys::CONTENT)
    }

    /// True if any value in the document is still deferred.
    pub fn has_deferred(&self) -> bool {
        self.entries.values().any(Value::is_deferred)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (key, value) in iter {
            doc.insert(key, value);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut doc = Document::new();
        doc.insert("a", "1");
        doc.insert("b", "2");
        doc.insert("a", "3");

        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(doc.get("a"), Some(&Value::from("3")));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut doc: Document = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        doc.remove("a");

        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, ["b", "c"]);
    }

    #[test]
    fn test_overlay_other_wins() {
        let mut base: Document = [("title", "Base"), ("footer", "f")].into_iter().collect();
        let top: Document = [("title", "Top")].into_iter().collect();
        base.overlay(&top);

        assert_eq!(base.get("title"), Some(&Value::from("Top")));
        assert_eq!(base.get("footer"), Some(&Value::from("f")));
    }

    #[test]
    fn test_reserved_accessors() {
        let mut doc = Document::new();
        assert_eq!(doc.id(), None);
        assert_eq!(doc.layout(), None);

        doc.insert(keys::ID, "home");
        doc.insert(keys::FILENAME, "content/home.txt");
        doc.insert(keys::LAYOUT, "main");
        doc.insert(keys::CONTENT, "Body");

        assert_eq!(doc.id().as_deref(), Some("home"));
        assert_eq!(doc.filename(), Some("content/home.txt"));
        assert_eq!(doc.layout().as_deref(), Some("main"));
        assert_eq!(doc.content(), Some(&Value::from("Body")));
    }

    #[test]
    fn test_empty_layout_is_absent() {
        let doc: Document = [(keys::LAYOUT, "")].into_iter().collect();
        assert_eq!(doc.layout(), None);
    }

    #[test]
    fn test_serialize_preserves_order() {
        let doc: Document = [("z", Value::Int(1)), ("a", Value::from("x"))]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"z":1,"a":"x"}"#);
    }
}
