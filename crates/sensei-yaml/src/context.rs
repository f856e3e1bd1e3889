//! Cursor context resolution.
//!
//! The document is never parsed. Instead, lines before the cursor are walked
//! upwards and every key that sits at a shallower indentation than the line
//! below it becomes one segment of the path. This keeps working on YAML that a
//! real parser would reject, which is the normal state of a buffer mid-edit.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

/// A key alone on its line, waiting for a value or a nested block: `role:`.
/// List items are matched by [`list_key_re`] instead.
fn bare_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([^:]+):\s*$").expect("valid regex"))
}

/// A list item that opens with a bare key: `- function:`. Matched against the
/// line with its indentation removed.
fn list_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*]\s*([^:]+):\s*$").expect("valid regex"))
}

/// Any line that starts with a key, with or without a value after the colon.
fn key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:]+):").expect("valid regex"))
}

/// Number of leading whitespace characters. Tabs count as one, like spaces.
pub(crate) fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// The leading whitespace of `line`, verbatim.
pub(crate) fn indent_str(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

pub(crate) fn is_list_item(line: &str) -> bool {
    let mut chars = line.trim_start().chars();
    matches!(chars.next(), Some('-' | '*')) && chars.next().is_some_and(char::is_whitespace)
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Clamp `offset` down to a char boundary. Offsets past the end are rejected.
pub(crate) fn clamp_offset(text: &str, offset: usize) -> Option<usize> {
    if offset > text.len() {
        return None;
    }
    let mut offset = offset;
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    Some(offset)
}

/// The keys enclosing a line indented by `indent`, outermost first.
///
/// `preceding` holds the lines above it, top to bottom. List items at or
/// above the tracked level belong to a sibling sequence and are skipped.
pub(crate) fn parent_context<'a>(preceding: &[&'a str], indent: usize) -> Vec<&'a str> {
    let mut level = indent;
    let mut keys = Vec::new();

    for &line in preceding.iter().rev() {
        if level == 0 {
            break;
        }
        if is_blank_or_comment(line) {
            continue;
        }
        let line_indent = indentation(line);
        if is_list_item(line) && line_indent <= level {
            continue;
        }
        if line_indent < level
            && let Some(key) = key_re().captures(line).and_then(|caps| caps.get(1))
        {
            keys.push(key.as_str().trim());
            level = line_indent;
        }
    }

    keys.reverse();
    keys
}

/// Compute the dotted context path at `offset`.
///
/// Returns `""` for the document root, and also for an offset past the end
/// of `text`.
pub fn resolve_context(text: &str, offset: usize) -> String {
    let Some(offset) = clamp_offset(text, offset) else {
        return String::new();
    };

    let lines: Vec<&str> = text[..offset].split('\n').collect();
    let Some((current, preceding)) = lines.split_last() else {
        return String::new();
    };

    let mut path = parent_context(preceding, indentation(current));

    let caps = if is_list_item(current) {
        list_key_re().captures(current.trim_start())
    } else {
        bare_key_re().captures(current)
    };
    if let Some(key) = caps.and_then(|caps| caps.get(1)) {
        path.push(key.as_str().trim());
    }

    let context = path.join(".");
    trace!(offset, %context, "resolved cursor context");
    context
}
