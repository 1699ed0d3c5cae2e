//! Preference entry model
//!
//! The closed set of entry variants a definitions document can produce.
//! Every variant shares the same capability contract: a type tag, a
//! load/save pair against a [`PrefStore`], and an `update` that applies an
//! externally-observed value change in memory without persisting it.
//! Callers persist explicitly via `save`.

use std::fmt;

use crate::constants::store::DISPLAY_SUFFIX;
use crate::dependency::{Dependency, Operator};
use crate::group::PreferenceGroup;
use crate::store::PrefStore;

/// The value shape carried by an update event across the presentation
/// boundary: one primitive per user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Data shared by every entry variant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Meta {
    /// Persistence namespace (the store name), set from the document root
    pub prefs: String,
    /// Unique within the owning collection; immutable after construction
    pub key: String,
    /// UI display name
    pub name: String,
    /// UI description of what this preference does
    pub description: Option<String>,
    /// Display rule tied to another preference's value, if any
    pub dependency: Option<Dependency>,
}

/// Display-only entry; persists nothing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimplePreference {
    pub meta: Meta,
}

/// On/off entry persisting `checked` under its key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BooleanPreference {
    pub meta: Meta,
    pub checked: bool,
    /// Overrides `description` while checked
    pub selected_description: Option<String>,
    /// Overrides `description` while unchecked
    pub unselected_description: Option<String>,
}

impl BooleanPreference {
    /// The description matching the current checked state, falling back to
    /// the plain description when no state-specific text was defined.
    pub fn context_description(&self) -> Option<&str> {
        let specific = if self.checked {
            self.selected_description.as_deref()
        } else {
            self.unselected_description.as_deref()
        };
        specific.or(self.meta.description.as_deref())
    }
}

/// Single-selection list entry
///
/// Persists the selected index under its key and the selected display text
/// under `key + "_display"`. The display list is resolved eagerly at parse
/// time; an entry without one cannot render a selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPreference {
    pub meta: Meta,
    /// Ordered display texts for the selectable options
    pub display_list: Vec<String>,
    pub selected_value: i64,
    pub selected_display: String,
}

impl ListPreference {
    /// Store key for the selected display text
    pub fn display_key(&self) -> String {
        format!("{}{DISPLAY_SUFFIX}", self.meta.key)
    }

    /// Recompute `selected_display` from the display list, clamping an
    /// out-of-range selection back to the first option.
    pub fn refresh_display(&mut self) {
        if self.display_list.is_empty() {
            return;
        }
        if self.selected_value < 0 || self.selected_value as usize >= self.display_list.len() {
            self.selected_value = 0;
        }
        self.selected_display = self.display_list[self.selected_value as usize].clone();
    }
}

/// One configurable item in a preferences schema
///
/// Closed set: adding a variant is a compile-checked enumeration change at
/// every match site, starting with the parser's type-tag dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceEntry {
    Simple(SimplePreference),
    Boolean(BooleanPreference),
    List(ListPreference),
    Group(PreferenceGroup),
}

impl PreferenceEntry {
    pub fn meta(&self) -> &Meta {
        match self {
            Self::Simple(p) => &p.meta,
            Self::Boolean(p) => &p.meta,
            Self::List(p) => &p.meta,
            Self::Group(g) => g.meta(),
        }
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Self::Simple(p) => &mut p.meta,
            Self::Boolean(p) => &mut p.meta,
            Self::List(p) => &mut p.meta,
            Self::Group(g) => g.meta_mut(),
        }
    }

    pub fn key(&self) -> &str {
        &self.meta().key
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    /// Stable string discriminator, matching the schema `type` field
    pub fn type_tag(&self) -> &'static str {
        use crate::constants::schema;
        match self {
            Self::Simple(_) => schema::TYPE_SIMPLE,
            Self::Boolean(_) => schema::TYPE_BOOLEAN,
            Self::List(_) => schema::TYPE_LIST_SINGLE,
            Self::Group(_) => schema::TYPE_GROUP,
        }
    }

    /// Description reflecting current state (boolean entries swap text with
    /// their checked state)
    pub fn context_description(&self) -> Option<&str> {
        match self {
            Self::Boolean(p) => p.context_description(),
            other => other.meta().description.as_deref(),
        }
    }

    /// Read persisted value(s), keeping the in-memory value when absent
    pub fn load(&mut self, store: &dyn PrefStore) {
        match self {
            Self::Simple(_) => {}
            Self::Boolean(p) => {
                p.checked = store.get_bool(&p.meta.key).unwrap_or(p.checked);
            }
            Self::List(p) => {
                p.selected_value = store.get_int(&p.meta.key).unwrap_or(p.selected_value);
                p.selected_display = store
                    .get_string(&p.display_key())
                    .unwrap_or_else(|| p.selected_display.clone());
            }
            Self::Group(g) => g.load(store),
        }
    }

    /// Write current value(s) to the store; caller commits afterwards
    pub fn save(&self, store: &mut dyn PrefStore) {
        match self {
            Self::Simple(_) => {}
            Self::Boolean(p) => store.put_bool(&p.meta.key, p.checked),
            Self::List(p) => {
                store.put_int(&p.meta.key, p.selected_value);
                store.put_string(&p.display_key(), &p.selected_display);
            }
            Self::Group(g) => g.save(store),
        }
    }

    /// Apply an externally-observed value change in memory.
    ///
    /// Does not persist; callers save explicitly. A variant ignores value
    /// kinds it does not own.
    pub fn update(&mut self, value: &PrefValue) {
        match (self, value) {
            (Self::Boolean(p), PrefValue::Bool(b)) => p.checked = *b,
            (Self::List(p), PrefValue::Int(n)) => p.selected_value = *n,
            (Self::List(p), PrefValue::Str(s)) => p.selected_display = s.clone(),
            _ => {}
        }
    }

    /// Check a dependant entry's rule against this entry's current value.
    /// Variants without a comparable value pass unconditionally, as does a
    /// rule using an operator the variant does not understand.
    pub fn meets_dependency(&self, dependency: &Dependency) -> bool {
        match self {
            Self::Boolean(p) => match dependency.operator {
                Operator::Eq => dependency.bool_value() == p.checked,
                Operator::Ne => dependency.bool_value() != p.checked,
                _ => true,
            },
            Self::List(p) => match dependency.int_value() {
                Some(value) => dependency.operator.compare_int(p.selected_value, value),
                None => true,
            },
            _ => true,
        }
    }

    /// True while no dependency rule forbids displaying this entry
    pub fn allow_display(&self) -> bool {
        self.meta().dependency.as_ref().map_or(true, |d| d.passed)
    }

    /// Row-content equality for the diff engine: entries matched by key but
    /// differing here need a rebind rather than a remove+insert.
    pub fn same_contents(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Simple(a), Self::Simple(b)) => a.meta.name == b.meta.name
                && a.meta.description == b.meta.description,
            (Self::Boolean(a), Self::Boolean(b)) => {
                a.checked == b.checked
                    && a.meta.name == b.meta.name
                    && a.context_description() == b.context_description()
            }
            (Self::Boolean(_), _) | (_, Self::Boolean(_)) => false,
            (Self::List(a), Self::List(b)) => {
                a.selected_value == b.selected_value
                    && a.selected_display == b.selected_display
                    && a.meta.name == b.meta.name
            }
            (Self::List(_), _) | (_, Self::List(_)) => false,
            (Self::Group(a), Self::Group(b)) => {
                let keys = |g: &PreferenceGroup| {
                    g.entries().iter().map(|e| e.key().to_string()).collect::<Vec<_>>()
                };
                a.meta().name == b.meta().name && keys(a) == keys(b)
            }
            (Self::Group(_), _) | (_, Self::Group(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn meta(key: &str) -> Meta {
        Meta {
            prefs: "prefs".to_string(),
            key: key.to_string(),
            name: key.to_string(),
            description: None,
            dependency: None,
        }
    }

    fn boolean(key: &str, checked: bool) -> PreferenceEntry {
        PreferenceEntry::Boolean(BooleanPreference {
            meta: meta(key),
            checked,
            selected_description: None,
            unselected_description: None,
        })
    }

    fn list(key: &str, selected: i64) -> PreferenceEntry {
        let mut p = ListPreference {
            meta: meta(key),
            display_list: vec!["Low".into(), "Medium".into(), "High".into()],
            selected_value: selected,
            selected_display: String::new(),
        };
        p.refresh_display();
        PreferenceEntry::List(p)
    }

    #[test]
    fn test_boolean_save_and_load() {
        let mut store = MemoryStore::new();
        let mut entry = boolean("sound", true);
        entry.save(&mut store);
        assert_eq!(store.get_bool("sound"), Some(true));

        // A fresh entry with a different default picks up the stored value
        let mut reloaded = boolean("sound", false);
        reloaded.load(&store);
        match reloaded {
            PreferenceEntry::Boolean(p) => assert!(p.checked),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_boolean_load_empty_store_keeps_default() {
        let store = MemoryStore::new();
        let mut entry = boolean("sound", true);
        entry.load(&store);
        match entry {
            PreferenceEntry::Boolean(p) => assert!(p.checked),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_list_save_writes_both_keys() {
        let mut store = MemoryStore::new();
        let entry = list("quality", 2);
        entry.save(&mut store);
        assert_eq!(store.get_int("quality"), Some(2));
        assert_eq!(store.get_string("quality_display"), Some("High".to_string()));
    }

    #[test]
    fn test_list_load_falls_back_per_field() {
        let mut store = MemoryStore::new();
        store.put_int("quality", 1);
        // No display text stored: value loads, display keeps its default

        let mut entry = list("quality", 0);
        entry.load(&store);
        match entry {
            PreferenceEntry::List(p) => {
                assert_eq!(p.selected_value, 1);
                assert_eq!(p.selected_display, "Low");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_simple_persists_nothing() {
        let mut store = MemoryStore::new();
        let entry = PreferenceEntry::Simple(SimplePreference { meta: meta("about") });
        entry.save(&mut store);
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_ignores_foreign_value_kinds() {
        let mut entry = boolean("sound", false);
        entry.update(&PrefValue::Int(5));
        entry.update(&PrefValue::Str("ignored".to_string()));
        match &entry {
            PreferenceEntry::Boolean(p) => assert!(!p.checked),
            _ => unreachable!(),
        }

        entry.update(&PrefValue::Bool(true));
        match &entry {
            PreferenceEntry::Boolean(p) => assert!(p.checked),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_update_does_not_persist() {
        let mut store = MemoryStore::new();
        let mut entry = boolean("sound", false);
        entry.update(&PrefValue::Bool(true));
        assert!(store.is_empty());

        entry.save(&mut store);
        assert_eq!(store.get_bool("sound"), Some(true));
    }

    #[test]
    fn test_list_update_reconverges_via_paired_events() {
        // A completed selection arrives as two events: the index and its
        // display text. After both, the invariant holds again.
        let mut entry = list("quality", 0);
        entry.update(&PrefValue::Int(2));
        entry.update(&PrefValue::Str("High".to_string()));
        match entry {
            PreferenceEntry::List(p) => {
                assert_eq!(p.selected_value, 2);
                assert_eq!(p.selected_display, "High");
                assert_eq!(p.display_list[p.selected_value as usize], p.selected_display);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_refresh_display_clamps_out_of_range() {
        let mut p = ListPreference {
            meta: meta("quality"),
            display_list: vec!["Low".into(), "High".into()],
            selected_value: 7,
            selected_display: String::new(),
        };
        p.refresh_display();
        assert_eq!(p.selected_value, 0);
        assert_eq!(p.selected_display, "Low");
    }

    #[test]
    fn test_context_description_switches_with_state() {
        let mut p = BooleanPreference {
            meta: Meta {
                description: Some("plain".to_string()),
                ..meta("sound")
            },
            checked: true,
            selected_description: Some("on".to_string()),
            unselected_description: None,
        };
        assert_eq!(p.context_description(), Some("on"));
        p.checked = false;
        // No unselected text defined: falls back to the plain description
        assert_eq!(p.context_description(), Some("plain"));
    }

    #[test]
    fn test_boolean_meets_dependency() {
        let entry = boolean("sound", true);
        let dep = Dependency::parse("sound == true").unwrap();
        assert!(entry.meets_dependency(&dep));
        let dep = Dependency::parse("sound != true").unwrap();
        assert!(!entry.meets_dependency(&dep));
        // Ordering operators are meaningless for booleans: always pass
        let dep = Dependency::parse("sound >= 1").unwrap();
        assert!(entry.meets_dependency(&dep));
    }

    #[test]
    fn test_list_meets_dependency() {
        let entry = list("quality", 2);
        assert!(entry.meets_dependency(&Dependency::parse("quality >= 1").unwrap()));
        assert!(entry.meets_dependency(&Dependency::parse("quality == 2").unwrap()));
        assert!(!entry.meets_dependency(&Dependency::parse("quality < 2").unwrap()));
        // Non-integer comparison value: pass
        assert!(entry.meets_dependency(&Dependency::parse("quality == high").unwrap()));
    }

    #[test]
    fn test_same_contents_tracks_value_changes() {
        let a = boolean("sound", true);
        let b = boolean("sound", true);
        assert!(a.same_contents(&b));

        let c = boolean("sound", false);
        assert!(!a.same_contents(&c));
    }
}
