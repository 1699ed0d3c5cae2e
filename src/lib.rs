#![forbid(unsafe_code)]

//! Schema-driven preference model
//!
//! Parses declarative JSON definitions into a typed tree of preference
//! entries, persists their values against a key-value store, and computes
//! minimal row-update instructions for a displaying list.

pub mod constants;
pub mod dependency;
pub mod diff;
pub mod group;
pub mod loader;
pub mod model;
pub mod resources;
pub mod schema;
pub mod store;

pub use dependency::{Dependency, Operator};
pub use diff::{diff, dispatch, DiffOp, ListObserver};
pub use group::PreferenceGroup;
pub use loader::{LoadError, LoadHandle, PreferenceLoader};
pub use model::{
    BooleanPreference, ListPreference, Meta, PrefValue, PreferenceEntry, SimplePreference,
};
pub use resources::{MapResources, NoResources, ResourceRef, Resources};
pub use schema::{parse, ParseError};
pub use store::{FileStore, MemoryStore, PrefStore};
