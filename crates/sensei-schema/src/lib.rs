//! Completion schema for SENSEI user-profile YAML files.
//!
//! The schema is a flat map from dotted context paths (`user.goals.function`)
//! to the candidates an editor may offer at that position. It is built once
//! and never mutated.

mod profile;
pub mod registry;
pub mod types;

use std::sync::LazyLock;

pub use registry::{RequiredFieldSpec, SchemaRegistry};
pub use types::{EntryKind, INDENT_UNIT, Insertion, InsertionStrategy, SchemaEntry};

static BUILTIN: LazyLock<SchemaRegistry> = LazyLock::new(|| {
    #[cfg(feature = "tracing")]
    tracing::debug!(paths = profile::PATHS.len(), "building profile schema");
    SchemaRegistry::new(profile::PATHS.iter().copied())
});

/// The SENSEI user-profile registry.
pub fn builtin() -> &'static SchemaRegistry {
    &BUILTIN
}

/// Required keys of a SENSEI user profile.
pub fn required() -> &'static RequiredFieldSpec {
    &profile::REQUIRED
}
