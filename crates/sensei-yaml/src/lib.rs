//! Structured editing support for SENSEI user-profile YAML.
//!
//! Three pure functions over a text snapshot, meant to be called by an
//! editor on every keystroke:
//!
//! - [`resolve_context`]: the dotted schema path at a cursor offset
//! - [`get_completions`]: ranked schema candidates for that path
//! - [`lint_typos`]: keys that look like misspelled schema labels
//!
//! None of them parse YAML; they work line by line on indentation and key
//! syntax, so they keep answering while the buffer is invalid. All offsets
//! are UTF-8 byte offsets.

mod completion;
mod context;
mod hints;
mod lint;
mod render;

pub use completion::{
    Completion, CompletionResult, TextEdit, apply_completion, complete, get_completions,
    get_completions_in, word_before,
};
pub use context::resolve_context;
pub use hints::{KeyAt, key_at, key_paths, required_hints, required_hints_with};
pub use lint::{
    Diagnostic, LintOptions, Severity, SuggestedFix, levenshtein, lint_typos, lint_typos_with,
};
pub use sensei_schema::{EntryKind, InsertionStrategy, SchemaEntry, SchemaRegistry};
