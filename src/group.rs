//! Ordered preference collection with a derived key index
//!
//! A group owns its entries in document order (which is display order) plus
//! a key → position map rebuilt on every wholesale replacement. External
//! edits reach the model only through [`notify_update`], which resolves the
//! target in O(1) and returns the row position for targeted UI invalidation.
//!
//! Not designed for concurrent mutation; callers serialize access the same
//! way they serialize the presentation layer itself.
//!
//! [`notify_update`]: PreferenceGroup::notify_update

use std::collections::HashMap;
use tracing::debug;

use crate::model::{Meta, PrefValue, PreferenceEntry};
use crate::store::PrefStore;

/// The root (or a nested) collection of preference entries
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferenceGroup {
    meta: Meta,
    entries: Vec<PreferenceEntry>,
    /// Derived index: entry key → position in `entries`. Always the exact
    /// inverse of the sequence's key assignment; rebuilt, never patched.
    key_map: HashMap<String, usize>,
    /// Dependant key → parent key, for display-rule refresh
    dependencies: HashMap<String, String>,
    /// Set by the parser when the document requests `"preinit": true`
    pub preinit: bool,
}

impl PreferenceGroup {
    /// Construct an empty group persisting into `namespace`
    pub fn new(namespace: &str) -> Self {
        Self {
            meta: Meta {
                prefs: namespace.to_string(),
                name: namespace.to_string(),
                ..Meta::default()
            },
            ..Self::default()
        }
    }

    pub(crate) fn with_meta(meta: Meta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// The persistence namespace this group loads from and saves to
    pub fn namespace(&self) -> &str {
        &self.meta.prefs
    }

    /// True when the group holds no entries: the caller-visible signal that
    /// a document failed to parse or contained no usable items.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[PreferenceEntry] {
        &self.entries
    }

    /// Replace the sequence wholesale.
    ///
    /// The key map and dependency table are fully rebuilt before the method
    /// returns, so no reader can observe a sequence/index pair that disagree.
    /// Duplicate keys keep the first occurrence's index.
    pub fn set_entries(&mut self, entries: Vec<PreferenceEntry>) {
        self.entries = entries;

        self.key_map.clear();
        self.dependencies.clear();
        for (position, entry) in self.entries.iter().enumerate() {
            self.key_map
                .entry(entry.key().to_string())
                .or_insert(position);
            if let Some(dep) = &entry.meta().dependency {
                self.dependencies
                    .insert(entry.key().to_string(), dep.key.clone());
            }
        }
        self.update_dependencies();
    }

    /// Position of `key` in the sequence. Falls back to scanning nested
    /// groups; a key found inside one reports the containing group's
    /// position, since that is the row the presentation layer knows.
    pub fn position_of(&self, key: &str) -> Option<usize> {
        if let Some(&position) = self.key_map.get(key) {
            return Some(position);
        }
        self.entries.iter().position(|entry| match entry {
            PreferenceEntry::Group(g) => g.position_of(key).is_some(),
            _ => false,
        })
    }

    pub fn find(&self, key: &str) -> Option<&PreferenceEntry> {
        self.key_map.get(key).map(|&i| &self.entries[i])
    }

    /// Read every entry's persisted value(s) in sequence order, then refresh
    /// display rules against the loaded values.
    pub fn load(&mut self, store: &dyn PrefStore) {
        for entry in &mut self.entries {
            entry.load(store);
        }
        self.update_dependencies();
    }

    /// Write every entry's value(s) in sequence order. The caller commits
    /// the store transaction after this returns.
    pub fn save(&self, store: &mut dyn PrefStore) {
        for entry in &self.entries {
            entry.save(store);
        }
    }

    /// Write default values for keys the store does not hold yet, leaving
    /// existing values untouched.
    pub fn pre_init(&self, store: &mut dyn PrefStore) {
        for entry in &self.entries {
            match entry {
                PreferenceEntry::Group(g) => g.pre_init(store),
                PreferenceEntry::Simple(_) => {}
                other => {
                    if !store.contains(other.key()) {
                        debug!(key = %other.key(), "Initialising store value from schema default");
                        other.save(store);
                    }
                }
            }
        }
    }

    /// Apply an update event from the presentation boundary.
    ///
    /// Returns the position of the updated row for targeted invalidation,
    /// or None when the key is unknown (non-fatal; nothing is mutated).
    /// O(1) for direct children regardless of collection size.
    pub fn notify_update(&mut self, key: &str, value: &PrefValue) -> Option<usize> {
        let Some(position) = self.position_of(key) else {
            debug!(key = %key, "notify_update: key not found");
            return None;
        };

        match &mut self.entries[position] {
            PreferenceEntry::Group(g) => {
                g.notify_update(key, value);
            }
            entry => entry.update(value),
        }
        debug!(key = %key, position = position, "Updated preference");
        self.update_dependencies();
        Some(position)
    }

    /// Re-evaluate every display rule against the current entry values
    pub fn update_dependencies(&mut self) {
        if self.dependencies.is_empty() {
            return;
        }

        let mut results = Vec::with_capacity(self.dependencies.len());
        for (dependant, parent) in &self.dependencies {
            let dependant_index = match self.key_map.get(dependant) {
                Some(&i) => i,
                None => continue,
            };
            let passed = match (
                self.find(parent),
                &self.entries[dependant_index].meta().dependency,
            ) {
                (Some(parent_entry), Some(dep)) => parent_entry.meets_dependency(dep),
                // Parent missing or rule lost: default to displaying
                _ => true,
            };
            results.push((dependant_index, passed));
        }

        for (index, passed) in results {
            if let Some(dep) = &mut self.entries[index].meta_mut().dependency {
                dep.passed = passed;
            }
        }
    }

    /// Entries whose display rules currently pass, in sequence order
    pub fn displayable(&self) -> Vec<&PreferenceEntry> {
        self.entries.iter().filter(|e| e.allow_display()).collect()
    }
}
