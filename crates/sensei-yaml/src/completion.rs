//! Schema-driven completion.

use sensei_schema::{SchemaEntry, SchemaRegistry};
use serde::Serialize;
use tracing::trace;

use crate::context::{clamp_offset, indent_str, resolve_context};

/// One ranked candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub entry: &'static SchemaEntry,
    /// Higher sorts first. The editor's own fuzzy matcher does the filtering.
    pub boost: i32,
}

/// Candidates for one cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    /// Start of the word being replaced.
    pub from: usize,
    /// End of the word being replaced (the cursor).
    pub to: usize,
    /// Context path the cursor resolved to.
    pub context: String,
    pub options: Vec<Completion>,
}

/// A buffer rewrite: replace `from..to` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub from: usize,
    pub to: usize,
    pub insert: String,
    /// Where the caret ends up, as an absolute offset into the edited text.
    pub cursor: usize,
}

impl TextEdit {
    /// Apply the edit to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.insert.len());
        out.push_str(&text[..self.from]);
        out.push_str(&self.insert);
        out.push_str(&text[self.to..]);
        out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The `[A-Za-z0-9_]*` run ending at `offset`, as a byte range.
pub fn word_before(text: &str, offset: usize) -> (usize, usize) {
    let offset = clamp_offset(text, offset).unwrap_or(text.len());
    let before = &text[..offset];
    let from = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(offset);
    (from, offset)
}

/// Ranked candidates for the context at `offset`.
///
/// Unregistered paths fall back to their closest registered ancestor and
/// ultimately to the root, so this never fails; an empty list is a valid
/// answer.
pub fn complete(registry: &SchemaRegistry, text: &str, offset: usize) -> Vec<Completion> {
    let context = resolve_context(text, offset);
    let (matched, entries) = registry.lookup(&context);
    trace!(%context, matched, count = entries.len(), "completion lookup");
    rank(entries)
}

fn rank(entries: &'static [SchemaEntry]) -> Vec<Completion> {
    entries
        .iter()
        .map(|entry| Completion {
            entry,
            boost: entry.boost(),
        })
        .collect()
}

/// Completions against the built-in profile schema.
pub fn get_completions(text: &str, offset: usize, explicit: bool) -> CompletionResult {
    get_completions_in(sensei_schema::builtin(), text, offset, explicit)
}

/// Completions against `registry`.
///
/// With nothing typed before the cursor, candidates are only produced when
/// the user asked for them (`explicit`).
pub fn get_completions_in(
    registry: &SchemaRegistry,
    text: &str,
    offset: usize,
    explicit: bool,
) -> CompletionResult {
    let Some(offset) = clamp_offset(text, offset) else {
        return CompletionResult {
            from: text.len(),
            to: text.len(),
            context: String::new(),
            options: Vec::new(),
        };
    };

    let (from, to) = word_before(text, offset);
    let context = resolve_context(text, offset);

    let options = if from == to && !explicit {
        Vec::new()
    } else {
        rank(registry.lookup(&context).1)
    };

    CompletionResult {
        from,
        to,
        context,
        options,
    }
}

/// The edit produced by accepting `entry` over `from..to`.
///
/// Indentation for nested blocks comes from the line `from` sits on.
pub fn apply_completion(text: &str, from: usize, to: usize, entry: &SchemaEntry) -> TextEdit {
    let line_start = text[..from].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[from..].find('\n').map_or(text.len(), |i| from + i);
    let indent = indent_str(&text[line_start..line_end]);
    let insertion = entry.insertion.apply(entry.label, indent);

    TextEdit {
        from,
        to,
        cursor: from + insertion.cursor,
        insert: insertion.text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensei_schema::{EntryKind, InsertionStrategy};

    const ROOT: &[SchemaEntry] = &[SchemaEntry::block("a", "root key")];
    const AB: &[SchemaEntry] = &[
        SchemaEntry::value("v", "a value"),
        SchemaEntry::scalar("c", "a key"),
    ];

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new([("", ROOT), ("a.b", AB)])
    }

    fn labels(options: &[Completion]) -> Vec<&'static str> {
        options.iter().map(|c| c.entry.label).collect()
    }

    #[test]
    fn test_fallback_to_registered_ancestor() {
        // Cursor context is "a.b.c", which is not registered.
        let text = "a:\n  b:\n    c:";
        let options = complete(&registry(), text, text.len());
        assert_eq!(labels(&options), ["v", "c"]);
    }

    #[test]
    fn test_fallback_to_root() {
        let text = "zzz:\n  ";
        let options = complete(&registry(), text, text.len());
        assert_eq!(labels(&options), ["a"]);
    }

    #[test]
    fn test_keywords_are_boosted() {
        let text = "a:\n  b:\n    ";
        let options = complete(&registry(), text, text.len());
        let boosts: Vec<_> = options.iter().map(|c| (c.entry.label, c.boost)).collect();
        assert_eq!(boosts, [("v", 0), ("c", 1)]);
    }

    #[test]
    fn test_no_options_without_prefix_unless_explicit() {
        let text = "llm:\n  ";
        let implicit = get_completions(text, text.len(), false);
        assert!(implicit.options.is_empty());
        assert_eq!(implicit.context, "llm");

        let explicit = get_completions(text, text.len(), true);
        assert!(labels(&explicit.options).contains(&"format"));
    }

    #[test]
    fn test_prefix_range() {
        let text = "llm:\n  form";
        let result = get_completions(text, text.len(), false);
        assert_eq!(&text[result.from..result.to], "form");
        assert_eq!(result.context, "llm");
        // Not narrowed by the prefix.
        assert_eq!(labels(&result.options), ["temperature", "model", "format"]);
    }

    #[test]
    fn test_goal_function_values() {
        let text = "user:\n  goals:\n    - function: ";
        let result = get_completions(text, text.len(), true);
        // "function: " has a trailing space but no value, so it still counts
        // as a bare key.
        assert_eq!(result.context, "user.goals.function");
        assert!(
            result
                .options
                .iter()
                .all(|c| c.entry.kind == EntryKind::Function)
        );
    }

    #[test]
    fn test_offset_past_end() {
        let result = get_completions("llm:", 99, true);
        assert!(result.options.is_empty());
        assert_eq!((result.from, result.to), (4, 4));
    }

    #[test]
    fn test_apply_block_on_empty_buffer() {
        let entry = SchemaEntry::block("llm", "");
        let edit = apply_completion("", 0, 0, &entry);
        assert_eq!(edit.insert, "llm: \n  ");
        assert_eq!(edit.cursor, edit.insert.len());
        assert_eq!(edit.apply(""), "llm: \n  ");
    }

    #[test]
    fn test_apply_uses_current_line_indent() {
        let text = "user:\n   go";
        let entry = SchemaEntry::list("goals", "");
        let (from, to) = word_before(text, text.len());
        let edit = apply_completion(text, from, to, &entry);
        assert_eq!(edit.apply(text), "user:\n   goals: \n     - ");
        assert_eq!(edit.cursor, edit.apply(text).len());
    }

    #[test]
    fn test_apply_block_on_blank_line_above_content() {
        let text = "llm:\n  \n  model: x\n";
        let entry = SchemaEntry::block("format", "");
        let edit = apply_completion(text, 7, 7, &entry);
        assert_eq!(edit.insert, "format: \n    ");
        assert_eq!(edit.apply(text), "llm:\n  format: \n    \n  model: x\n");
        assert_eq!(edit.cursor, 7 + edit.insert.len());
    }

    #[test]
    fn test_apply_block_on_empty_line_above_content() {
        let text = "llm:\n\nuser:\n";
        let entry = SchemaEntry::block("chatbot", "");
        let edit = apply_completion(text, 5, 5, &entry);
        assert_eq!(edit.insert, "chatbot: \n  ");
    }

    #[test]
    fn test_apply_list_on_indented_line_above_content() {
        let text = "user:\n  go\n    role: x\nchatbot:\n";
        let entry = SchemaEntry::list("goals", "");
        let (from, to) = word_before(text, 10);
        assert_eq!((from, to), (8, 10));
        let edit = apply_completion(text, from, to, &entry);
        assert_eq!(edit.insert, "goals: \n    - ");
        assert_eq!(
            edit.apply(text),
            "user:\n  goals: \n    - \n    role: x\nchatbot:\n"
        );
    }

    #[test]
    fn test_apply_parens_cursor() {
        let text = "function: ran";
        let entry = SchemaEntry::new(
            "random",
            EntryKind::Function,
            "",
            InsertionStrategy::AppendColonParens,
        );
        let (from, to) = word_before(text, text.len());
        let edit = apply_completion(text, from, to, &entry);
        let applied = edit.apply(text);
        assert_eq!(applied, "function: random()");
        assert_eq!(&applied[edit.cursor..], ")");
    }

    #[test]
    fn test_word_before() {
        assert_eq!(word_before("abc def_1", 9), (4, 9));
        assert_eq!(word_before("abc ", 4), (4, 4));
        assert_eq!(word_before("", 0), (0, 0));
        assert_eq!(word_before("- fo", 4), (2, 4));
    }
}
