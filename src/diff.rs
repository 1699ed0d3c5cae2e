//! List diff engine for the presentation boundary
//!
//! Translates "old displayed sequence vs new sequence" into a minimal set of
//! row operations so the presentation layer updates only the rows that
//! actually changed. Entry identity is the key, not structural equality; an
//! entry present in both sequences is never reported as removed+reinserted.
//!
//! Stateless: the caller supplies both snapshots on every invocation.

use std::collections::{HashMap, HashSet};

use crate::model::PreferenceEntry;

/// One row-level update instruction
///
/// Operations are emitted as a single valid transformation sequence: applied
/// in order to the old list, no instruction ever references an out-of-range
/// position, and the final order matches the new sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    /// Row removed; `index` is valid at the time the op is applied
    Remove { index: usize },
    /// Row inserted at `index` in the partially-transformed list
    Insert { index: usize },
    /// Row moved from `from` to `to` in the partially-transformed list
    Move { from: usize, to: usize },
    /// Row at `index` (final coordinates) kept its identity but its
    /// displayed content changed; rebind without touching position
    Change { index: usize },
}

/// Receiver of dispatched diff operations: the presentation adapter
pub trait ListObserver {
    fn on_remove(&mut self, index: usize);
    fn on_insert(&mut self, index: usize);
    fn on_move(&mut self, from: usize, to: usize);
    fn on_change(&mut self, index: usize);
}

/// Forward a computed operation set to a presentation adapter in order
pub fn dispatch(ops: &[DiffOp], observer: &mut dyn ListObserver) {
    for op in ops {
        match *op {
            DiffOp::Remove { index } => observer.on_remove(index),
            DiffOp::Insert { index } => observer.on_insert(index),
            DiffOp::Move { from, to } => observer.on_move(from, to),
            DiffOp::Change { index } => observer.on_change(index),
        }
    }
}

/// Compute the operations transforming `old` into `new`.
///
/// Removals are emitted in descending index order, then insertions in
/// ascending order, then moves against the simulated intermediate list,
/// then content changes at final positions. Identical sequences yield no
/// operations.
pub fn diff(old: &[PreferenceEntry], new: &[PreferenceEntry]) -> Vec<DiffOp> {
    let old_keys: HashSet<&str> = old.iter().map(|e| e.key()).collect();
    let new_index: HashMap<&str, usize> = new
        .iter()
        .enumerate()
        .map(|(i, e)| (e.key(), i))
        .collect();

    let mut ops = Vec::new();

    // Removals, descending so earlier indices stay valid
    let mut working: Vec<&str> = Vec::with_capacity(new.len());
    for entry in old {
        working.push(entry.key());
    }
    for index in (0..old.len()).rev() {
        if !new_index.contains_key(old[index].key()) {
            ops.push(DiffOp::Remove { index });
            working.remove(index);
        }
    }

    // Insertions, ascending; every target index is within the current
    // working length because all earlier new positions are already present
    for (index, entry) in new.iter().enumerate() {
        if !old_keys.contains(entry.key()) {
            ops.push(DiffOp::Insert { index });
            working.insert(index, entry.key());
        }
    }

    // Moves: walk the target order, relocating the first mismatch each time
    for (target, entry) in new.iter().enumerate() {
        if working[target] == entry.key() {
            continue;
        }
        let from = working[target..]
            .iter()
            .position(|&k| k == entry.key())
            .map(|offset| target + offset)
            .unwrap_or_else(|| unreachable!("key present after removals and insertions"));
        ops.push(DiffOp::Move { from, to: target });
        let key = working.remove(from);
        working.insert(target, key);
    }

    // Content changes for surviving entries, reported in final coordinates
    let old_by_key: HashMap<&str, &PreferenceEntry> =
        old.iter().map(|e| (e.key(), e)).collect();
    for (index, entry) in new.iter().enumerate() {
        if let Some(previous) = old_by_key.get(entry.key()) {
            if !previous.same_contents(entry) {
                ops.push(DiffOp::Change { index });
            }
        }
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BooleanPreference, Meta, SimplePreference};

    fn simple(key: &str) -> PreferenceEntry {
        PreferenceEntry::Simple(SimplePreference {
            meta: Meta {
                key: key.to_string(),
                name: key.to_string(),
                ..Meta::default()
            },
        })
    }

    fn boolean(key: &str, checked: bool) -> PreferenceEntry {
        PreferenceEntry::Boolean(BooleanPreference {
            meta: Meta {
                key: key.to_string(),
                name: key.to_string(),
                ..Meta::default()
            },
            checked,
            selected_description: None,
            unselected_description: None,
        })
    }

    fn entries(keys: &[&str]) -> Vec<PreferenceEntry> {
        keys.iter().map(|k| simple(k)).collect()
    }

    /// Apply positional ops to the old key order; Change ops are positional
    /// no-ops and skipped here.
    fn apply(old: &[PreferenceEntry], ops: &[DiffOp]) -> Vec<String> {
        let mut keys: Vec<String> = old.iter().map(|e| e.key().to_string()).collect();
        let mut inserted = 0usize;
        for op in ops {
            match *op {
                DiffOp::Remove { index } => {
                    keys.remove(index);
                }
                DiffOp::Insert { index } => {
                    // Test stand-in for a real adapter that knows the new
                    // content: label inserts so order can be verified
                    keys.insert(index, format!("ins{inserted}"));
                    inserted += 1;
                }
                DiffOp::Move { from, to } => {
                    let key = keys.remove(from);
                    keys.insert(to, key);
                }
                DiffOp::Change { .. } => {}
            }
        }
        keys
    }

    #[test]
    fn test_identical_sequences_yield_no_ops() {
        let xs = entries(&["a", "b", "c"]);
        assert!(diff(&xs, &xs).is_empty());
    }

    #[test]
    fn test_remove_and_insert() {
        // [A,B,C] -> [A,C,D]: B removed, D inserted, A and C survive
        let old = entries(&["a", "b", "c"]);
        let new = entries(&["a", "c", "d"]);
        let ops = diff(&old, &new);

        assert!(ops.contains(&DiffOp::Remove { index: 1 }));
        assert!(ops.contains(&DiffOp::Insert { index: 2 }));
        assert_eq!(ops.len(), 2, "A and C must not be removed and reinserted");
    }

    #[test]
    fn test_applied_ops_reproduce_new_order() {
        let old = entries(&["a", "b", "c", "d"]);
        let new = entries(&["d", "a", "e", "c"]);
        let ops = diff(&old, &new);

        let result = apply(&old, &ops);
        // "e" is the only insertion
        assert_eq!(result, vec!["d", "a", "ins0", "c"]);
    }

    #[test]
    fn test_pure_move() {
        let old = entries(&["a", "b", "c"]);
        let new = entries(&["c", "a", "b"]);
        let ops = diff(&old, &new);

        assert!(ops.iter().all(|op| matches!(op, DiffOp::Move { .. })));
        assert_eq!(apply(&old, &ops), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_all_removed() {
        let old = entries(&["a", "b"]);
        let ops = diff(&old, &[]);
        assert_eq!(
            ops,
            vec![DiffOp::Remove { index: 1 }, DiffOp::Remove { index: 0 }]
        );
        assert!(apply(&old, &ops).is_empty());
    }

    #[test]
    fn test_all_inserted() {
        let new = entries(&["a", "b"]);
        let ops = diff(&[], &new);
        assert_eq!(
            ops,
            vec![DiffOp::Insert { index: 0 }, DiffOp::Insert { index: 1 }]
        );
    }

    #[test]
    fn test_content_change_reported_in_place() {
        let old = vec![boolean("sound", false), simple("about")];
        let new = vec![boolean("sound", true), simple("about")];
        let ops = diff(&old, &new);
        assert_eq!(ops, vec![DiffOp::Change { index: 0 }]);
    }

    #[test]
    fn test_moved_entry_with_changed_content() {
        let old = vec![boolean("sound", false), simple("about")];
        let new = vec![simple("about"), boolean("sound", true)];
        let ops = diff(&old, &new);

        assert!(ops.iter().any(|op| matches!(op, DiffOp::Move { .. })));
        assert!(ops.contains(&DiffOp::Change { index: 1 }));
        assert_eq!(apply(&old, &ops), vec!["about", "sound"]);
    }

    #[test]
    fn test_dispatch_forwards_in_order() {
        #[derive(Default)]
        struct Recorder(Vec<String>);
        impl ListObserver for Recorder {
            fn on_remove(&mut self, index: usize) {
                self.0.push(format!("remove {index}"));
            }
            fn on_insert(&mut self, index: usize) {
                self.0.push(format!("insert {index}"));
            }
            fn on_move(&mut self, from: usize, to: usize) {
                self.0.push(format!("move {from}->{to}"));
            }
            fn on_change(&mut self, index: usize) {
                self.0.push(format!("change {index}"));
            }
        }

        let old = entries(&["a", "b"]);
        let new = entries(&["b"]);
        let mut recorder = Recorder::default();
        dispatch(&diff(&old, &new), &mut recorder);
        assert_eq!(recorder.0, vec!["remove 0"]);
    }
}
