/*
 * deferred.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in deferred filters.
//!
//! These filters do no work at parse time. They capture their input in a
//! [`Deferred`] value and do the real work when the composition engine (or
//! another renderer) evaluates it:
//!
//! - `mixin`: render another document, copy its keys (except `content`) into
//!   the context, substitute its content
//! - `partial`: render another document in a sanitized copy of the context
//! - `embed`: render another document on its own
//! - `template`: interpolate `$key$` placeholders from the context
//!
//! A reference to a missing document renders as a short diagnostic string
//! instead of failing the render.

use crate::compose::{RenderRequest, RenderScope};
use crate::document::{Document, keys};
use crate::error::RenderResult;
use crate::filter::FilterRegistry;
use crate::value::{Deferred, Renderer, Value};
use regex::Regex;
use std::sync::LazyLock;

/// Register `mixin`, `partial`, `embed` and `template`.
pub fn register_deferred_filters(registry: &mut FilterRegistry) {
    registry.register("mixin", |value, _, _| {
        Deferred::new(Mixin::new(target_of(&value))).into()
    });
    registry.register("partial", |value, _, _| {
        Deferred::new(Partial::new(target_of(&value))).into()
    });
    registry.register("embed", |value, _, _| {
        Deferred::new(Embed::new(target_of(&value))).into()
    });
    registry.register("template", |value, _, _| {
        Deferred::new(Template::compile(&value.to_text())).into()
    });
}

fn target_of(value: &Value) -> String {
    value.to_text().trim().to_string()
}

/// Inline text substituted for a reference to a missing document.
pub fn not_found_text(id: &str) -> Value {
    Value::from(format!("No document found with id \"{id}\""))
}

/// The rendered document's `content`, or the whole document if it has none.
fn content_or_document(mut doc: Document) -> Value {
    match doc.remove(keys::CONTENT) {
        Some(content) => content,
        None => Value::Map(doc),
    }
}

/// Injects another document's keys into the context and substitutes its
/// content.
#[derive(Debug, Clone)]
pub struct Mixin {
    target: String,
}

impl Mixin {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Renderer for Mixin {
    fn name(&self) -> &str {
        "mixin"
    }

    fn render(
        &self,
        scope: &mut RenderScope<'_>,
        context: &mut Document,
        _key: &str,
    ) -> RenderResult<Value> {
        let Some(rendered) = scope.render(RenderRequest::Id(&self.target), None)? else {
            return Ok(not_found_text(&self.target));
        };
        for (key, value) in rendered.iter() {
            if key != keys::CONTENT {
                context.insert(key, value.clone());
            }
        }
        Ok(content_or_document(rendered))
    }
}

/// Renders another document using the current context, minus anything that
/// must not leak into it.
#[derive(Debug, Clone)]
pub struct Partial {
    target: String,
}

impl Partial {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Renderer for Partial {
    fn name(&self) -> &str {
        "partial"
    }

    fn render(
        &self,
        scope: &mut RenderScope<'_>,
        context: &mut Document,
        key: &str,
    ) -> RenderResult<Value> {
        if !scope.store().contains(&self.target) {
            return Ok(not_found_text(&self.target));
        }
        let sanitized = sanitize_context(context, key);
        match scope.render(RenderRequest::Id(&self.target), Some(&sanitized))? {
            Some(rendered) => Ok(content_or_document(rendered)),
            None => Ok(not_found_text(&self.target)),
        }
    }
}

/// Copy of `context` without the declaring key, unevaluated deferred values,
/// `layout` and `id`.
fn sanitize_context(context: &Document, declaring_key: &str) -> Document {
    let mut sanitized = context.clone();
    sanitized.retain(|key, value| {
        key != declaring_key && key != keys::LAYOUT && key != keys::ID && !value.is_deferred()
    });
    sanitized
}

/// Renders another document with no inherited context.
#[derive(Debug, Clone)]
pub struct Embed {
    target: String,
}

impl Embed {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Renderer for Embed {
    fn name(&self) -> &str {
        "embed"
    }

    fn render(
        &self,
        scope: &mut RenderScope<'_>,
        _context: &mut Document,
        _key: &str,
    ) -> RenderResult<Value> {
        match scope.render(RenderRequest::Id(&self.target), None)? {
            Some(rendered) => Ok(content_or_document(rendered)),
            None => Ok(not_found_text(&self.target)),
        }
    }
}

/// Matches `$$` or a `$name$` / `$a.b$` variable. Group 1 is the path.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\$")
        .expect("Invalid regex pattern for template placeholders")
});

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Variable(Vec<String>),
}

/// A `$key$` interpolation template evaluated against the context document.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Split `source` into literal text and variable references.
    ///
    /// `$$` is a literal `$`; a `$` that does not start a placeholder is kept
    /// as text.
    pub fn compile(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for captures in PLACEHOLDER.captures_iter(source) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            literal.push_str(&source[last..whole.start()]);
            last = whole.end();
            match captures.get(1) {
                Some(path) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(
                        path.as_str().split('.').map(str::to_string).collect(),
                    ));
                }
                None => literal.push('$'),
            }
        }
        literal.push_str(&source[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Interpolate against `context`. Unknown keys render as empty text.
    pub fn apply(&self, context: &Document) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(path) => {
                    if let Some(value) = lookup(context, path) {
                        out.push_str(&value.to_text());
                    }
                }
            }
        }
        out
    }
}

fn lookup<'d>(context: &'d Document, path: &[String]) -> Option<&'d Value> {
    let (first, rest) = path.split_first()?;
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.get(first)?.get_path(&rest)
}

impl Renderer for Template {
    fn name(&self) -> &str {
        "template"
    }

    fn render(
        &self,
        _scope: &mut RenderScope<'_>,
        context: &mut Document,
        _key: &str,
    ) -> RenderResult<Value> {
        Ok(Value::from(self.apply(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use pretty_assertions::assert_eq;

    fn doc(pairs: &[(&str, &str)]) -> Document {
        pairs.iter().copied().collect()
    }

    fn render_with(store: &DocumentStore, renderer: impl Renderer, context: &mut Document) -> Value {
        let mut scope = RenderScope::new(store);
        renderer.render(&mut scope, context, "slot").unwrap()
    }

    #[test]
    fn test_filters_produce_deferred_values() {
        let registry = FilterRegistry::with_builtins();
        for name in ["mixin", "partial", "embed", "template"] {
            let spec = registry.parse_key_spec(&format!("k:{name}")).unwrap();
            let value = spec.apply(Value::from(" target "), &Document::new());
            assert_eq!(value.as_deferred().map(Deferred::name), Some(name));
        }
    }

    #[test]
    fn test_mixin_copies_keys_and_returns_content() {
        let mut store = DocumentStore::new();
        store.add(doc(&[("id", "m"), ("content", "X"), ("foo", "bar")]));
        let mut context = doc(&[("title", "Page")]);

        let value = render_with(&store, Mixin::new("m"), &mut context);

        assert_eq!(value, Value::from("X"));
        assert_eq!(context.get("foo"), Some(&Value::from("bar")));
        assert_eq!(context.get("title"), Some(&Value::from("Page")));
        assert!(!context.contains_key("content"));
    }

    #[test]
    fn test_mixin_without_content_returns_document() {
        let mut store = DocumentStore::new();
        store.add(doc(&[("id", "m"), ("foo", "bar")]));
        let mut context = Document::new();

        let value = render_with(&store, Mixin::new("m"), &mut context);

        assert_eq!(value, Value::Map(doc(&[("id", "m"), ("foo", "bar")])));
    }

    #[test]
    fn test_missing_targets_degrade_to_text() {
        let store = DocumentStore::new();
        let expected = Value::from("No document found with id \"ghost\"");
        let mut context = Document::new();

        assert_eq!(render_with(&store, Mixin::new("ghost"), &mut context), expected);
        assert_eq!(render_with(&store, Partial::new("ghost"), &mut context), expected);
        assert_eq!(render_with(&store, Embed::new("ghost"), &mut context), expected);
        assert!(context.is_empty());
    }

    #[test]
    fn test_partial_sanitizes_context() {
        let mut store = DocumentStore::new();
        let mut card = doc(&[("id", "card")]);
        card.insert(
            "content",
            Deferred::new(Template::compile("$title$|$slot$|$layout$|$id$|$pending$")),
        );
        store.add(card);

        let mut context = doc(&[
            ("id", "page"),
            ("layout", "main"),
            ("title", "Hello"),
            ("slot", "declaring"),
        ]);
        context.insert("pending", Deferred::new(Embed::new("card")));

        let value = render_with(&store, Partial::new("card"), &mut context);

        // `id` is the partial's own id, not the caller's.
        assert_eq!(value, Value::from("Hello|||card|"));
    }

    #[test]
    fn test_embed_ignores_context() {
        let mut store = DocumentStore::new();
        let mut card = doc(&[("id", "card"), ("title", "Own")]);
        card.insert("content", Deferred::new(Template::compile("<$title$>")));
        store.add(card);
        let mut context = doc(&[("title", "Caller")]);

        let value = render_with(&store, Embed::new("card"), &mut context);

        assert_eq!(value, Value::from("<Own>"));
    }

    #[test]
    fn test_template_compile() {
        let template = Template::compile("Hi $name$, $$5 and $ alone $a.b$");
        assert_eq!(
            template.segments,
            vec![
                Segment::Literal("Hi ".to_string()),
                Segment::Variable(vec!["name".to_string()]),
                Segment::Literal(", $5 and $ alone ".to_string()),
                Segment::Variable(vec!["a".to_string(), "b".to_string()]),
            ]
        );
    }

    #[test]
    fn test_template_apply() {
        let mut author = Document::new();
        author.insert("name", "Ann");
        let mut context = doc(&[("title", "Post")]);
        context.insert("author", author);
        context.insert("count", Value::Int(3));

        let template = Template::compile("$title$ by $author.name$ ($count$)$missing$");
        assert_eq!(template.apply(&context), "Post by Ann (3)");
    }
}
