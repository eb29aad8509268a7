/*
 * filter.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Named, chainable value filters.
//!
//! A directive such as `@@ count:int` names the key `count` and the filter
//! chain `[int]`. Filters are looked up in a [`FilterRegistry`] when the line
//! is parsed; an unknown name makes the parser treat the whole line as text.

use crate::document::Document;
use crate::value::Value;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// A filter function: `(value, owner_document, key) -> value`.
///
/// `owner_document` is the document the value belongs to (at parse time, the
/// document under construction) and `key` is the key being assigned.
pub type Filter = Arc<dyn Fn(Value, &Document, &str) -> Value + Send + Sync>;

/// Registry of named filters.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Filter>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the scalar filters (`html`, `int`, `float`,
    /// `bool`) and the deferred filters (`mixin`, `partial`, `embed`,
    /// `template`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("html", |value, _, _| value);
        registry.register("int", |value, _, _| parse_int(&value.to_text()));
        registry.register("float", |value, _, _| parse_float(&value.to_text()));
        registry.register("bool", |value, _, _| {
            Value::Bool(value.to_text().trim() == "true")
        });
        crate::deferred::register_deferred_filters(&mut registry);
        registry
    }

    /// Register a filter, replacing any filter with the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        filter: impl Fn(Value, &Document, &str) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Look up a filter by name.
    pub fn resolve(&self, name: &str) -> Option<&Filter> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Parse a `key:filter:filter...` path.
    ///
    /// Returns `None` if any filter name is unknown.
    pub fn parse_key_spec(&self, spec: &str) -> Option<KeySpec> {
        let mut segments = spec.split(':');
        let key = segments.next()?.to_string();
        let filters = segments
            .map(|name| self.resolve(name).cloned())
            .collect::<Option<Vec<_>>>()?;
        Some(KeySpec { key, filters })
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FilterRegistry")
            .field("filters", &names)
            .finish()
    }
}

/// A key together with its resolved filter chain.
#[derive(Clone)]
pub struct KeySpec {
    pub key: String,
    pub filters: Vec<Filter>,
}

impl KeySpec {
    /// A key with no filters.
    pub fn plain(key: impl Into<String>) -> Self {
        KeySpec {
            key: key.into(),
            filters: Vec::new(),
        }
    }

    /// Run the filter chain left to right.
    pub fn apply(&self, value: Value, doc: &Document) -> Value {
        self.filters
            .iter()
            .fold(value, |value, filter| filter(value, doc, &self.key))
    }
}

impl fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySpec")
            .field("key", &self.key)
            .field("filters", &self.filters.len())
            .finish()
    }
}

static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("Invalid regex pattern for integers"));

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("Invalid regex pattern for floats")
});

/// Parse the leading decimal integer of `text`.
///
/// Leading whitespace is skipped and trailing garbage ignored (`"12px"` is
/// 12). Non-numeric input yields the not-a-number sentinel. Integers too
/// large for `i64` become floats.
pub fn parse_int(text: &str) -> Value {
    let Some(m) = INT_PREFIX.find(text.trim_start()) else {
        return Value::nan();
    };
    match m.as_str().parse::<i64>() {
        Ok(i) => Value::Int(i),
        Err(_) => m
            .as_str()
            .parse::<f64>()
            .map_or_else(|_| Value::nan(), Value::Float),
    }
}

/// Parse the leading floating point number of `text`.
///
/// Follows the same prefix rules as [`parse_int`]; `Infinity` is accepted.
pub fn parse_float(text: &str) -> Value {
    let Some(m) = FLOAT_PREFIX.find(text.trim_start()) else {
        return Value::nan();
    };
    let number = m.as_str();
    let parsed = match number.trim_start_matches(['+', '-']) {
        "Infinity" if number.starts_with('-') => Ok(f64::NEG_INFINITY),
        "Infinity" => Ok(f64::INFINITY),
        _ => number.parse::<f64>(),
    };
    parsed.map_or_else(|_| Value::nan(), Value::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(registry: &FilterRegistry, spec: &str, raw: &str) -> Value {
        let spec = registry.parse_key_spec(spec).unwrap();
        spec.apply(Value::from(raw), &Document::new())
    }

    #[test]
    fn test_builtin_html_is_identity() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(
            apply(&registry, "body:html", "<b>&</b>"),
            Value::from("<b>&</b>")
        );
    }

    #[test]
    fn test_builtin_int() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(apply(&registry, "n:int", "42"), Value::Int(42));
        assert_eq!(apply(&registry, "n:int", "  -7 "), Value::Int(-7));
        assert_eq!(apply(&registry, "n:int", "12px"), Value::Int(12));
        assert_eq!(apply(&registry, "n:int", "3.9"), Value::Int(3));
        assert!(apply(&registry, "n:int", "abc").is_nan());
        assert!(apply(&registry, "n:int", "").is_nan());
    }

    #[test]
    fn test_builtin_float() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(apply(&registry, "n:float", "3.25"), Value::Float(3.25));
        assert_eq!(apply(&registry, "n:float", ".5"), Value::Float(0.5));
        assert_eq!(apply(&registry, "n:float", "1e3kg"), Value::Float(1000.0));
        assert_eq!(
            apply(&registry, "n:float", "-Infinity"),
            Value::Float(f64::NEG_INFINITY)
        );
        assert!(apply(&registry, "n:float", "x1").is_nan());
    }

    #[test]
    fn test_builtin_bool() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(apply(&registry, "b:bool", "true"), Value::Bool(true));
        assert_eq!(apply(&registry, "b:bool", "false"), Value::Bool(false));
        assert_eq!(apply(&registry, "b:bool", "yes"), Value::Bool(false));
        assert_eq!(apply(&registry, "b:bool", "TRUE"), Value::Bool(false));
    }

    #[test]
    fn test_chain_applies_left_to_right() {
        let mut registry = FilterRegistry::new();
        registry.register("a", |v, _, _| Value::from(format!("a({})", v.to_text())));
        registry.register("b", |v, _, _| Value::from(format!("b({})", v.to_text())));

        assert_eq!(apply(&registry, "k:a:b", "x"), Value::from("b(a(x))"));
        assert_eq!(apply(&registry, "k:b:a", "x"), Value::from("a(b(x))"));
    }

    #[test]
    fn test_filter_receives_key_and_owner() {
        let mut registry = FilterRegistry::new();
        registry.register("describe", |v, doc, key| {
            let owner = doc.id().unwrap_or_default();
            Value::from(format!("{owner}.{key}={}", v.to_text()))
        });
        let spec = registry.parse_key_spec("title:describe").unwrap();
        let owner: Document = [("id", "home")].into_iter().collect();

        assert_eq!(
            spec.apply(Value::from("Hi"), &owner),
            Value::from("home.title=Hi")
        );
    }

    #[test]
    fn test_unknown_filter_rejects_spec() {
        let registry = FilterRegistry::with_builtins();
        assert!(registry.parse_key_spec("title:nosuchfilter").is_none());
        assert!(registry.parse_key_spec("title:int:nosuchfilter").is_none());

        let spec = registry.parse_key_spec("title").unwrap();
        assert_eq!(spec.key, "title");
        assert!(spec.filters.is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FilterRegistry::with_builtins();
        registry.register("html", |_, _, _| Value::from("escaped"));
        assert_eq!(apply(&registry, "k:html", "<b>"), Value::from("escaped"));
    }

    #[test]
    fn test_large_int_becomes_float() {
        assert_eq!(
            parse_int("99999999999999999999"),
            Value::Float(1e20)
        );
    }
}
