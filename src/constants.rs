//! Schema and store string literals
//!
//! Field names used in preference definition documents plus the derived
//! store-key layout, kept in one place so the parser and the model never
//! drift apart.

/// Schema document fields and type tags
pub mod schema {
    /// Top-level field naming the persistence namespace
    pub const PREFS: &str = "prefs";

    /// Namespace used when the document does not name one
    pub const DEFAULT_NAMESPACE: &str = "prefs";

    /// Type tag for display-only entries
    pub const TYPE_SIMPLE: &str = "simple";

    /// Type tag for on/off entries
    pub const TYPE_BOOLEAN: &str = "boolean";

    /// Type tag for single-selection list entries
    pub const TYPE_LIST_SINGLE: &str = "list_single";

    /// Type tag for nested entry groups
    pub const TYPE_GROUP: &str = "group";
}

/// Persisted key layout
pub mod store {
    /// Suffix appended to a list entry's key to store its display text
    pub const DISPLAY_SUFFIX: &str = "_display";
}

/// File store location
pub mod config {
    /// Directory under the user config dir holding one JSON file per namespace
    pub const APP_DIR: &str = "prefkit";
}
