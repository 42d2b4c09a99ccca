//! Inline shortcode expansion.
//!
//! Shortcodes are bracketed macros embedded in content text:
//!
//! - `[year]` or `[year /]`
//! - `[button url="/contact"]`
//! - `[note kind="tip"]Inner text[/note]`
//!
//! Each registered name maps to a template using `{{ attribute }}`
//! placeholders; `{{ content }}` receives the expanded inner text of an
//! enclosing shortcode. Expansion never fails: unregistered shortcodes stay in
//! the text verbatim and unknown placeholders render empty.

use std::{collections::HashMap, sync::LazyLock};

use indexmap::IndexMap;
use regex::Regex;

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([A-Za-z][\w-]*)((?:\s+[\w-]+\s*=\s*"[^"]*")*)\s*(/)?\]"#)
        .expect("static shortcode pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)\s*=\s*"([^"]*)""#).expect("static attribute pattern")
});

/// Placeholder receiving the inner text of an enclosing shortcode.
const CONTENT_VAR: &str = "content";

/// Registry of shortcode templates.
#[derive(Debug, Clone, Default)]
pub struct Shortcodes {
    templates: HashMap<String, String>,
}

impl Shortcodes {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured name/template pairs.
    #[must_use]
    pub fn from_config(entries: &IndexMap<String, String>) -> Self {
        let mut registry = Self::new();
        for (name, template) in entries {
            registry.register(name.clone(), template.clone());
        }
        registry
    }

    /// Register a shortcode template.
    pub fn register(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    /// Whether a shortcode is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Number of registered shortcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no shortcodes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Expand every registered shortcode in `text`.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        if self.templates.is_empty() || !text.contains('[') {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(caps) = OPEN_TAG.captures(rest) {
            let Some(tag) = caps.get(0) else { break };
            let name = &caps[1];
            out.push_str(&rest[..tag.start()]);

            let Some(template) = self.templates.get(name) else {
                out.push_str(tag.as_str());
                rest = &rest[tag.end()..];
                continue;
            };

            let attrs = parse_attributes(caps.get(2).map_or("", |m| m.as_str()));
            let after = &rest[tag.end()..];
            let closing = format!("[/{name}]");
            let self_closing = caps.get(3).is_some();

            let (inner, consumed) = match after.find(&closing).filter(|_| !self_closing) {
                Some(idx) => (Some(&after[..idx]), tag.end() + idx + closing.len()),
                None => (None, tag.end()),
            };

            let inner = inner.map(|text| self.expand(text));
            out.push_str(&render(template, &attrs, inner.as_deref()));
            rest = &rest[consumed..];
        }

        out.push_str(rest);
        out
    }
}

fn parse_attributes(raw: &str) -> HashMap<&str, &str> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str();
            Some((key, value))
        })
        .collect()
}

/// Replace `{{ var }}` placeholders. Unknown variables render empty and an
/// unclosed `{{` is copied through.
fn render(template: &str, attrs: &HashMap<&str, &str>, inner: Option<&str>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        let end = start + len + 2;
        let var_name = rest[start + 2..end - 2].trim();

        result.push_str(&rest[..start]);
        let value = if var_name == CONTENT_VAR {
            inner.unwrap_or_default()
        } else {
            attrs.get(var_name).copied().unwrap_or_default()
        };
        result.push_str(value);
        rest = &rest[end..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Shortcodes {
        let mut shortcodes = Shortcodes::new();
        shortcodes.register("year", "2026");
        shortcodes.register("button", r#"<a class="btn" href="{{ url }}">{{ label }}</a>"#);
        shortcodes.register("note", r#"<aside class="{{ kind }}">{{ content }}</aside>"#);
        shortcodes
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(registry().expand("Nothing to see"), "Nothing to see");
    }

    #[test]
    fn test_simple_shortcode() {
        assert_eq!(registry().expand("(c) [year] Acme"), "(c) 2026 Acme");
        assert_eq!(registry().expand("(c) [year /] Acme"), "(c) 2026 Acme");
    }

    #[test]
    fn test_attributes() {
        let out = registry().expand(r#"Go [button url="/contact" label="Contact us"] now"#);
        assert_eq!(out, r#"Go <a class="btn" href="/contact">Contact us</a> now"#);
    }

    #[test]
    fn test_missing_attribute_renders_empty() {
        let out = registry().expand(r#"[button url="/x"]"#);
        assert_eq!(out, r#"<a class="btn" href="/x"></a>"#);
    }

    #[test]
    fn test_enclosing_shortcode_expands_inner() {
        let out = registry().expand(r#"[note kind="tip"]Since [year][/note]"#);
        assert_eq!(out, r#"<aside class="tip">Since 2026</aside>"#);
    }

    #[test]
    fn test_unknown_shortcode_left_verbatim() {
        let text = r#"[gallery ids="1,2"] and [year]"#;
        assert_eq!(registry().expand(text), r#"[gallery ids="1,2"] and 2026"#);
    }

    #[test]
    fn test_unclosed_enclosing_shortcode() {
        let out = registry().expand(r#"[note kind="warn"]no closing tag"#);
        assert_eq!(out, r#"<aside class="warn"></aside>no closing tag"#);
    }

    #[test]
    fn test_empty_registry_is_identity() {
        let text = "[year] [button]";
        assert_eq!(Shortcodes::new().expand(text), text);
    }

    #[test]
    fn test_from_config() {
        let mut entries = IndexMap::new();
        entries.insert("site".to_string(), "Example".to_string());
        let shortcodes = Shortcodes::from_config(&entries);

        assert!(shortcodes.contains("site"));
        assert_eq!(shortcodes.len(), 1);
        assert_eq!(shortcodes.expand("[site]"), "Example");
    }

    #[test]
    fn test_render_unclosed_placeholder() {
        let attrs = HashMap::new();
        assert_eq!(render("a {{ b", &attrs, None), "a {{ b");
    }
}
