//! Resource reference resolution
//!
//! Schema string fields may be literals or references of the form
//! `@kind/name` (e.g. `@string/sound_title`, `@array/quality_levels`).
//! Resolution goes through the [`Resources`] trait so the preference model
//! stays independent of where resource values actually live.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// A parsed `@kind/name` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef<'a> {
    pub kind: &'a str,
    pub name: &'a str,
}

impl<'a> ResourceRef<'a> {
    /// Parse a `@kind/name` reference, or None if the text is a plain literal.
    /// Both kind and name must be non-empty; kind is restricted to word
    /// characters so strings like `"@@@@"` or `"a@string/x"` stay literals.
    pub fn parse(text: &'a str) -> Option<Self> {
        let rest = text.strip_prefix('@')?;
        let (kind, name) = rest.split_once('/')?;
        if kind.is_empty() || name.is_empty() {
            return None;
        }
        if !kind.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self { kind, name })
    }
}

/// Lookup boundary for `@kind/name` references
///
/// A lookup returns None when the resource does not exist; callers decide
/// whether that is a fallback-to-literal situation or a hard parse error.
pub trait Resources {
    fn string(&self, res: ResourceRef<'_>) -> Option<String>;
    fn integer(&self, res: ResourceRef<'_>) -> Option<i64>;
    fn string_array(&self, res: ResourceRef<'_>) -> Option<Vec<String>>;
}

/// Resolve a string field: references go through `resources`, anything else
/// is returned as-is. An unresolvable reference falls back to the literal
/// text so a missing translation never breaks parsing.
pub fn resolve_string(resources: &dyn Resources, text: &str) -> String {
    match ResourceRef::parse(text) {
        Some(res) => resources.string(res).unwrap_or_else(|| {
            warn!(reference = %text, "unresolved string resource, keeping literal");
            text.to_string()
        }),
        None => text.to_string(),
    }
}

/// Resolve an integer field: literal integer first, then integer-resource
/// reference, defaulting to 0 when both fail.
pub fn resolve_int(resources: &dyn Resources, text: &str) -> i64 {
    if let Ok(n) = text.trim().parse::<i64>() {
        return n;
    }
    match ResourceRef::parse(text).and_then(|res| resources.integer(res)) {
        Some(n) => n,
        None => {
            if !text.is_empty() {
                warn!(value = %text, "could not resolve integer value, using 0");
            }
            0
        }
    }
}

/// Resolve a string-array field. Arrays have no literal form, so a
/// non-reference or missing array yields None.
pub fn resolve_string_array(resources: &dyn Resources, text: &str) -> Option<Vec<String>> {
    resources.string_array(ResourceRef::parse(text)?)
}

/// Resolver that knows nothing; every reference falls back.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResources;

impl Resources for NoResources {
    fn string(&self, _res: ResourceRef<'_>) -> Option<String> {
        None
    }

    fn integer(&self, _res: ResourceRef<'_>) -> Option<i64> {
        None
    }

    fn string_array(&self, _res: ResourceRef<'_>) -> Option<Vec<String>> {
        None
    }
}

/// In-memory resource pack, deserializable from a JSON file:
///
/// ```json
/// { "strings": {"sound_title": "Sound"},
///   "integers": {"default_quality": 1},
///   "arrays": {"quality_levels": ["Low", "Medium", "High"]} }
/// ```
///
/// Lookups are keyed by resource name only; the reference kind is not
/// checked beyond selecting which table to search.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MapResources {
    #[serde(default)]
    strings: HashMap<String, String>,
    #[serde(default)]
    integers: HashMap<String, i64>,
    #[serde(default)]
    arrays: HashMap<String, Vec<String>>,
}

impl MapResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, name: &str, value: &str) -> Self {
        self.strings.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_integer(mut self, name: &str, value: i64) -> Self {
        self.integers.insert(name.to_string(), value);
        self
    }

    pub fn with_array(mut self, name: &str, values: &[&str]) -> Self {
        self.arrays.insert(
            name.to_string(),
            values.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

impl Resources for MapResources {
    fn string(&self, res: ResourceRef<'_>) -> Option<String> {
        self.strings.get(res.name).cloned()
    }

    fn integer(&self, res: ResourceRef<'_>) -> Option<i64> {
        self.integers.get(res.name).copied()
    }

    fn string_array(&self, res: ResourceRef<'_>) -> Option<Vec<String>> {
        self.arrays.get(res.name).cloned()
    }
}
