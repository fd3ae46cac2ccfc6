//! Dotted-key lookup and `{{name}}` interpolation.
//!
//! Both functions are pure: no I/O and no shared state.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::OnceLock;

use crate::catalog::{Catalog, Entry};

/// Interpolation values keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars {
    values: HashMap<String, String>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.values.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Vars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |vars, (name, value)| vars.with(name, value))
    }
}

/// Walk `catalog` along the `.`-separated segments of `key`.
///
/// Returns `None` when a segment is missing, an intermediate segment is a
/// string leaf, or the final segment is a nested catalog.
pub fn resolve<'a>(catalog: &'a Catalog, key: &str) -> Option<&'a str> {
    let mut segments = key.split('.');
    let last = segments.next_back()?;

    let mut node = catalog;
    for segment in segments {
        match node.get(segment)? {
            Entry::Nested(inner) => node = inner,
            Entry::Text(_) => return None,
        }
    }

    match node.get(last)? {
        Entry::Text(text) => Some(text),
        Entry::Nested(_) => None,
    }
}

/// Replace every `{{name}}` whose name is in `vars`; leave the others as-is.
///
/// Single pass: substituted values are not scanned again.
pub fn interpolate(template: &str, vars: &Vars) -> String {
    if vars.is_empty() {
        return template.to_string();
    }

    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("Invalid regex pattern"));

    re.replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_json_slice(
            br#"{
                "a": {"b": "X", "c": {"d": "deep"}},
                "flat": "F",
                "dotted.key": "literal"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_paths() {
        let catalog = sample();
        assert_eq!(resolve(&catalog, "a.b"), Some("X"));
        assert_eq!(resolve(&catalog, "a.c.d"), Some("deep"));
        assert_eq!(resolve(&catalog, "flat"), Some("F"));
    }

    #[test]
    fn test_resolve_misses() {
        let catalog = sample();
        // final segment is a nested mapping
        assert_eq!(resolve(&catalog, "a"), None);
        assert_eq!(resolve(&catalog, "a.c"), None);
        // intermediate segment is a leaf
        assert_eq!(resolve(&catalog, "flat.x"), None);
        assert_eq!(resolve(&catalog, "a.b.c"), None);
        // missing segments
        assert_eq!(resolve(&catalog, "a.z"), None);
        assert_eq!(resolve(&catalog, "zz"), None);
        assert_eq!(resolve(&catalog, ""), None);
        assert_eq!(resolve(&catalog, "a..b"), None);
        assert_eq!(resolve(&Catalog::new(), "a.b"), None);
    }

    #[test]
    fn test_resolve_has_no_dot_escaping() {
        assert_eq!(resolve(&sample(), "dotted.key"), None);
    }

    #[test]
    fn test_interpolate_replaces_known_names() {
        let vars = Vars::new().with("name", "Ann");
        assert_eq!(interpolate("Hello {{name}}", &vars), "Hello Ann");
        assert_eq!(
            interpolate("{{name}} and {{name}} again", &vars),
            "Ann and Ann again"
        );
    }

    #[test]
    fn test_interpolate_leaves_unknown_tokens() {
        assert_eq!(interpolate("Hi {{x}}", &Vars::new()), "Hi {{x}}");

        let vars = Vars::new().with("name", "Ann");
        assert_eq!(
            interpolate("{{name}} owes {{amount}}", &vars),
            "Ann owes {{amount}}"
        );
        assert_eq!(interpolate("{{ name }}", &vars), "{{ name }}");
    }

    #[test]
    fn test_interpolate_stringifies_values() {
        let vars: Vars = [("count", 3)].into_iter().collect();
        assert_eq!(interpolate("{{count}} items", &vars), "3 items");

        let vars = Vars::new().with("ratio", 0.5).with("ok", true);
        assert_eq!(interpolate("{{ratio}}/{{ok}}", &vars), "0.5/true");
    }

    #[test]
    fn test_interpolate_is_single_pass() {
        let vars = Vars::new().with("a", "{{b}}").with("b", "B");
        assert_eq!(interpolate("{{a}} {{b}}", &vars), "{{b}} B");
    }

    #[test]
    fn test_interpolate_inside_extra_braces() {
        let vars = Vars::new().with("name", "Ann");
        assert_eq!(interpolate("{{{name}}}", &vars), "{Ann}");
    }
}
