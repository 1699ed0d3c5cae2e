//! Definitions document parser
//!
//! Converts a raw JSON definitions document into a [`PreferenceGroup`].
//! The document shape:
//!
//! ```json
//! {
//!   "prefs": "app_settings",
//!   "preinit": false,
//!   "items": [
//!     { "type": "boolean", "key": "sound", "name": "@string/sound_title",
//!       "checked": true, "description_selected": "Sound is on" },
//!     { "type": "list_single", "key": "quality", "name": "Quality",
//!       "items": "@array/quality_levels", "default": "@integer/default_quality" }
//!   ]
//! }
//! ```
//!
//! Unknown item types are skipped with a log line, never an error. A
//! malformed document or one without usable items produces an empty group;
//! `is_empty()` is the caller-visible failure signal. The one hard failure
//! is a list entry whose display array cannot be resolved: such an entry
//! could never render, so the whole parse fails with [`ParseError`].

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::schema as tags;
use crate::dependency::Dependency;
use crate::group::PreferenceGroup;
use crate::model::{
    BooleanPreference, ListPreference, Meta, PreferenceEntry, SimplePreference,
};
use crate::resources::{resolve_int, resolve_string, resolve_string_array, Resources};

/// Hard parse failures; everything recoverable is skipped and logged instead
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("list preference '{key}' has no display list: could not resolve '{reference}'")]
    UnresolvedDisplayList { key: String, reference: String },
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "prefs", default = "default_namespace")]
    namespace: String,
    #[serde(default)]
    preinit: bool,
    #[serde(default)]
    items: Vec<RawItem>,
}

fn default_namespace() -> String {
    tags::DEFAULT_NAMESPACE.to_string()
}

/// Union of every variant's schema fields; the `type` tag decides which
/// subset is meaningful.
#[derive(Debug, Default, Deserialize)]
struct RawItem {
    #[serde(rename = "type", default)]
    kind: String,
    key: Option<String>,
    #[serde(default)]
    name: String,
    description: Option<String>,
    #[serde(rename = "if")]
    dependency: Option<String>,

    // boolean
    #[serde(default)]
    checked: bool,
    description_selected: Option<String>,
    description_unselected: Option<String>,

    // list_single: a "@array/..." reference; group: an array of child items
    items: Option<RawItems>,
    default: Option<String>,
}

/// The `items` field is overloaded by type: a resource reference on
/// `list_single`, a child list on `group`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItems {
    Reference(String),
    Nested(Vec<RawItem>),
}

/// Parse a definitions document against a resource resolver.
///
/// Returns an empty group (never an error) for malformed JSON, so callers
/// distinguish "failed to load" purely by `is_empty()`.
pub fn parse(document: &str, resources: &dyn Resources) -> Result<PreferenceGroup, ParseError> {
    let raw: RawDocument = match serde_json::from_str(document) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Failed to parse preference definitions");
            return Ok(PreferenceGroup::new(tags::DEFAULT_NAMESPACE));
        }
    };

    let mut group = PreferenceGroup::new(&raw.namespace);
    group.preinit = raw.preinit;
    let entries = build_entries(raw.items, &raw.namespace, resources)?;
    group.set_entries(entries);
    Ok(group)
}

fn build_entries(
    items: Vec<RawItem>,
    namespace: &str,
    resources: &dyn Resources,
) -> Result<Vec<PreferenceEntry>, ParseError> {
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        if let Some(entry) = entry_from_item(item, namespace, resources)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Construct one entry from its raw definition. Ok(None) means the item was
/// skipped (unknown type or missing key); Err is reserved for defects that
/// make the entry unrenderable.
fn entry_from_item(
    item: RawItem,
    namespace: &str,
    resources: &dyn Resources,
) -> Result<Option<PreferenceEntry>, ParseError> {
    let Some(key) = item.key.clone().filter(|k| !k.is_empty()) else {
        warn!(kind = %item.kind, "Skipping preference item without a key");
        return Ok(None);
    };

    let meta = Meta {
        prefs: namespace.to_string(),
        key: key.clone(),
        name: resolve_string(resources, &item.name),
        description: item
            .description
            .as_deref()
            .map(|d| resolve_string(resources, d)),
        dependency: item.dependency.as_deref().and_then(Dependency::parse),
    };

    let entry = match item.kind.as_str() {
        tags::TYPE_SIMPLE | "" => PreferenceEntry::Simple(SimplePreference { meta }),
        tags::TYPE_BOOLEAN => PreferenceEntry::Boolean(BooleanPreference {
            meta,
            checked: item.checked,
            selected_description: item
                .description_selected
                .as_deref()
                .map(|d| resolve_string(resources, d)),
            unselected_description: item
                .description_unselected
                .as_deref()
                .map(|d| resolve_string(resources, d)),
        }),
        tags::TYPE_LIST_SINGLE => {
            let reference = match item.items {
                Some(RawItems::Reference(text)) => text,
                _ => String::new(),
            };
            let display_list = resolve_string_array(resources, &reference).ok_or_else(|| {
                ParseError::UnresolvedDisplayList {
                    key: key.clone(),
                    reference: reference.clone(),
                }
            })?;
            let selected_value = item
                .default
                .as_deref()
                .map(|d| resolve_int(resources, d))
                .unwrap_or(0);
            let mut pref = ListPreference {
                meta,
                display_list,
                selected_value,
                selected_display: String::new(),
            };
            pref.refresh_display();
            PreferenceEntry::List(pref)
        }
        tags::TYPE_GROUP => {
            let children = match item.items {
                Some(RawItems::Nested(items)) => build_entries(items, namespace, resources)?,
                _ => Vec::new(),
            };
            let mut nested = PreferenceGroup::with_meta(meta);
            nested.set_entries(children);
            PreferenceEntry::Group(nested)
        }
        other => {
            debug!(kind = %other, key = %key, "Unknown preference type - check your definitions file");
            return Ok(None);
        }
    };

    Ok(Some(entry))
}
