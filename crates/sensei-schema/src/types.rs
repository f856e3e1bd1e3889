//! Completion entry types.
//!
//! Every type here is plain static data: the registry is assembled once from
//! `const` slices of [`SchemaEntry`] and only ever read afterwards.

use serde::Serialize;

/// What sort of token a completion candidate inserts.
///
/// Only used for ranking and for the icon the editor picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Keyword,
    Value,
    Function,
    Variable,
}

impl EntryKind {
    /// Ranking boost handed to the editor. Keywords sort above everything else.
    pub fn boost(self) -> i32 {
        match self {
            EntryKind::Keyword => 1,
            EntryKind::Value | EntryKind::Function | EntryKind::Variable => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Keyword => "keyword",
            EntryKind::Value => "value",
            EntryKind::Function => "function",
            EntryKind::Variable => "variable",
        }
    }
}

/// How accepting a candidate rewrites the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionStrategy {
    /// `label: ` followed by a newline and a nested block indent.
    AppendColonNewlineIndent,
    /// Like [`InsertionStrategy::AppendColonNewlineIndent`], but opens a list item.
    AppendColonNewlineIndentList,
    /// `label: ""` with the caret between the quotes.
    AppendColonQuotes,
    /// `label()` with the caret between the parentheses.
    AppendColonParens,
    /// `label: `
    AppendColonSpace,
    /// The bare label.
    None,
}

/// Text produced by applying an [`InsertionStrategy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Text that replaces the typed word.
    pub text: String,
    /// Caret position, as a byte offset into `text`.
    pub cursor: usize,
}

/// Width of one nesting level in generated YAML.
pub const INDENT_UNIT: &str = "  ";

impl InsertionStrategy {
    /// Render the text inserted for `label`.
    ///
    /// `current_indent` is the leading whitespace of the line the caret is on;
    /// nested blocks are opened one [`INDENT_UNIT`] deeper than that line, not
    /// at the depth the schema path would suggest.
    pub fn apply(self, label: &str, current_indent: &str) -> Insertion {
        let text = match self {
            InsertionStrategy::AppendColonNewlineIndent => {
                format!("{label}: \n{current_indent}{INDENT_UNIT}")
            }
            InsertionStrategy::AppendColonNewlineIndentList => {
                format!("{label}: \n{current_indent}{INDENT_UNIT}- ")
            }
            InsertionStrategy::AppendColonQuotes => {
                let text = format!("{label}: \"\"");
                let cursor = text.len() - 1;
                return Insertion { text, cursor };
            }
            InsertionStrategy::AppendColonParens => {
                let text = format!("{label}()");
                let cursor = text.len() - 1;
                return Insertion { text, cursor };
            }
            InsertionStrategy::AppendColonSpace => format!("{label}: "),
            InsertionStrategy::None => label.to_string(),
        };
        let cursor = text.len();
        Insertion { text, cursor }
    }
}

/// One completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaEntry {
    pub label: &'static str,
    pub kind: EntryKind,
    /// Documentation shown next to the candidate.
    pub info: &'static str,
    pub insertion: InsertionStrategy,
}

impl SchemaEntry {
    pub const fn new(
        label: &'static str,
        kind: EntryKind,
        info: &'static str,
        insertion: InsertionStrategy,
    ) -> Self {
        Self {
            label,
            kind,
            info,
            insertion,
        }
    }

    /// A key that opens a nested mapping.
    pub const fn block(label: &'static str, info: &'static str) -> Self {
        Self::new(
            label,
            EntryKind::Keyword,
            info,
            InsertionStrategy::AppendColonNewlineIndent,
        )
    }

    /// A key that opens a nested list.
    pub const fn list(label: &'static str, info: &'static str) -> Self {
        Self::new(
            label,
            EntryKind::Keyword,
            info,
            InsertionStrategy::AppendColonNewlineIndentList,
        )
    }

    /// A key whose value is a quoted string.
    pub const fn text(label: &'static str, info: &'static str) -> Self {
        Self::new(
            label,
            EntryKind::Keyword,
            info,
            InsertionStrategy::AppendColonQuotes,
        )
    }

    /// A key whose value is a plain scalar.
    pub const fn scalar(label: &'static str, info: &'static str) -> Self {
        Self::new(
            label,
            EntryKind::Keyword,
            info,
            InsertionStrategy::AppendColonSpace,
        )
    }

    /// A literal value.
    pub const fn value(label: &'static str, info: &'static str) -> Self {
        Self::new(label, EntryKind::Value, info, InsertionStrategy::None)
    }

    /// A call such as `random()`.
    pub const fn function(label: &'static str, info: &'static str) -> Self {
        Self::new(
            label,
            EntryKind::Function,
            info,
            InsertionStrategy::AppendColonParens,
        )
    }

    /// A reference to a reusable resource (personality presets and the like).
    pub const fn variable(label: &'static str, info: &'static str) -> Self {
        Self::new(label, EntryKind::Variable, info, InsertionStrategy::None)
    }

    /// Ranking boost for this candidate.
    pub fn boost(&self) -> i32 {
        self.kind.boost()
    }
}
