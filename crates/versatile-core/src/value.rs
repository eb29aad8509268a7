/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document values.
//!
//! A [`Value`] is either concrete (the output of a filter chain or a JSON
//! document) or [`Value::Deferred`], an opaque computation that needs a
//! rendering context before it becomes concrete. Callers check the tag; there
//! is no capability probing.

use crate::compose::RenderScope;
use crate::document::Document;
use crate::error::RenderResult;
use serde::ser::{Error as _, Serialize, SerializeSeq, Serializer};
use std::fmt;
use std::sync::Arc;

/// A value stored under a document key.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// A null/missing value.
    #[default]
    Null,

    /// A boolean value.
    Bool(bool),

    /// An integer value.
    Int(i64),

    /// A floating point value. `NaN` is the not-a-number sentinel produced by
    /// the `int` and `float` filters for non-numeric input.
    Float(f64),

    /// A string value.
    String(String),

    /// A list of values (structured documents only).
    List(Vec<Value>),

    /// A nested document.
    Map(Document),

    /// A value that must be evaluated against a rendering context.
    Deferred(Deferred),
}

impl Value {
    /// The not-a-number sentinel.
    pub fn nan() -> Self {
        Value::Float(f64::NAN)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Value::Deferred(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&Deferred> {
        match self {
            Value::Deferred(d) => Some(d),
            _ => None,
        }
    }

    /// Get a nested value by path.
    ///
    /// An empty path returns the value itself; every further segment must
    /// index into a [`Value::Map`].
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self {
                Value::Map(doc) => doc.get(first).and_then(|v| v.get_path(rest)),
                _ => None,
            },
        }
    }

    /// Render this value as plain text.
    ///
    /// - String: returned as-is
    /// - Numbers: decimal form, `NaN` for the sentinel
    /// - Bool: "true" or "false"
    /// - List: concatenation of rendered elements
    /// - Null, Map, Deferred: ""
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Bool(b) => b.to_string(),
            Value::List(items) => items.iter().map(Value::to_text).collect(),
            Value::Null | Value::Map(_) | Value::Deferred(_) => String::new(),
        }
    }

    /// The identifier this value denotes when used as an `id` or `layout`.
    ///
    /// Returns `None` for values with an empty text rendering.
    pub fn as_identifier(&self) -> Option<String> {
        let text = self.to_text();
        if text.is_empty() { None } else { Some(text) }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        f.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Map(doc)
    }
}

impl From<Deferred> for Value {
    fn from(d: Deferred) -> Self {
        Value::Deferred(d)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(map.into_iter().collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            // JSON has no NaN; serde_json writes non-finite floats as null.
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(doc) => doc.serialize(serializer),
            Value::Deferred(d) => Err(S::Error::custom(format!(
                "unresolved deferred value ({})",
                d.name()
            ))),
        }
    }
}

/// A unit of computation evaluated against a rendering context.
///
/// Implementations are created by filters at parse time and invoked by the
/// composition engine during a merge step, or by other renderers that read
/// them.
pub trait Renderer: fmt::Debug + Send + Sync {
    /// Short name used in diagnostics (usually the filter name).
    fn name(&self) -> &str;

    /// Produce a concrete value.
    ///
    /// `context` is the document being assembled; renderers may mutate it.
    /// `key` is the key the deferred value was declared under.
    fn render(
        &self,
        scope: &mut RenderScope<'_>,
        context: &mut Document,
        key: &str,
    ) -> RenderResult<Value>;
}

/// Shared handle to a [`Renderer`].
#[derive(Clone)]
pub struct Deferred(Arc<dyn Renderer>);

impl Deferred {
    pub fn new(renderer: impl Renderer + 'static) -> Self {
        Deferred(Arc::new(renderer))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Evaluate against `context`.
    pub fn render(
        &self,
        scope: &mut RenderScope<'_>,
        context: &mut Document,
        key: &str,
    ) -> RenderResult<Value> {
        self.0.render(scope, context, key)
    }

    /// True if both handles point at the same renderer.
    pub fn ptr_eq(&self, other: &Deferred) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deferred").field(&self.0).finish()
    }
}
