//! Required-key hints.
//!
//! Same line-oriented approach as the typo linter: each `key:` line gets its
//! full path from the indentation walk, and the set of paths present is
//! checked against the required keys.

use std::collections::HashMap;

use sensei_schema::RequiredFieldSpec;
use tracing::trace;

use crate::context::{indentation, parent_context};
use crate::lint::{Diagnostic, Severity, key_span, lines_with_offsets};

/// Full dotted path of every key in `text`, with the byte range of the first
/// occurrence of its key token.
pub fn key_paths(text: &str) -> HashMap<String, (usize, usize)> {
    let lines: Vec<(usize, &str)> = lines_with_offsets(text).collect();
    let raw: Vec<&str> = lines.iter().map(|(_, line)| *line).collect();
    let mut paths = HashMap::new();

    for (i, (line_start, line)) in lines.iter().enumerate() {
        let Some((start, end)) = key_span(line) else {
            continue;
        };
        let mut path = parent_context(&raw[..i], indentation(line));
        path.push(&line[start..end]);
        paths
            .entry(path.join("."))
            .or_insert((line_start + start, line_start + end));
    }

    paths
}

/// A key token and the path of the mapping it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAt {
    /// Context path of the enclosing mapping (`""` at the root).
    pub parent: String,
    pub key: String,
    pub from: usize,
    pub to: usize,
}

/// The key token under `offset`, if the cursor is on one.
pub fn key_at(text: &str, offset: usize) -> Option<KeyAt> {
    let lines: Vec<(usize, &str)> = lines_with_offsets(text).collect();
    let raw: Vec<&str> = lines.iter().map(|(_, line)| *line).collect();

    let i = lines
        .iter()
        .rposition(|(line_start, _)| *line_start <= offset)?;
    let (line_start, line) = lines[i];
    let (start, end) = key_span(line)?;
    if !(line_start + start..=line_start + end).contains(&offset) {
        return None;
    }

    Some(KeyAt {
        parent: parent_context(&raw[..i], indentation(line)).join("."),
        key: line[start..end].to_string(),
        from: line_start + start,
        to: line_start + end,
    })
}

/// Hints for required keys of the SENSEI profile that are missing.
pub fn required_hints(text: &str) -> Vec<Diagnostic> {
    required_hints_with(sensei_schema::required(), text)
}

/// Hints for keys `spec` requires but `text` does not define.
///
/// Nested requirements only apply once their parent key exists. An empty
/// document yields nothing.
pub fn required_hints_with(spec: &RequiredFieldSpec, text: &str) -> Vec<Diagnostic> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let present = key_paths(text);
    let mut hints = Vec::new();

    for parent in spec.paths() {
        let (from, to) = if parent.is_empty() {
            (0, 0)
        } else {
            match present.get(parent) {
                Some(span) => *span,
                None => continue,
            }
        };

        for key in spec.required_at(parent) {
            let full = if parent.is_empty() {
                key.to_string()
            } else {
                format!("{parent}.{key}")
            };
            if present.contains_key(&full) {
                continue;
            }

            let message = if parent.is_empty() {
                format!("missing required key '{key}'")
            } else {
                format!("missing required key '{key}' under '{parent}'")
            };
            hints.push(Diagnostic {
                from,
                to,
                severity: Severity::Hint,
                message,
                fixes: Vec::new(),
            });
        }
    }

    trace!(count = hints.len(), "required-key hints");
    hints
}
