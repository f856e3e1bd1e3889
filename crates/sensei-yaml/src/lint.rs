//! Typo detection for mapping keys.
//!
//! Every `key:` in the document is compared against every label the schema
//! knows, regardless of where the key sits. A key that is close to a label
//! without being one is flagged, with one fix per candidate.

use std::sync::OnceLock;

use regex::Regex;
use sensei_schema::SchemaRegistry;
use serde::Serialize;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Hint,
}

/// A replacement for the span a diagnostic covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedFix {
    pub label: String,
    pub replacement: String,
}

/// A finding over the byte range `from..to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub from: usize,
    pub to: usize,
    pub severity: Severity,
    pub message: String,
    pub fixes: Vec<SuggestedFix>,
}

/// Knobs for [`lint_typos_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintOptions {
    /// Keys shorter than this are never checked.
    pub min_key_len: usize,
    /// Largest edit distance still reported as a typo.
    pub max_distance: usize,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            min_key_len: 4,
            max_distance: 2,
        }
    }
}

fn mapping_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([a-zA-Z_][a-zA-Z0-9_]*):").expect("valid regex"))
}

fn list_item_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*-\s+([a-zA-Z_][a-zA-Z0-9_]*):").expect("valid regex"))
}

/// Lines of `text` with the byte offset each one starts at.
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n').scan(0, |start, line| {
        let here = *start;
        *start += line.len() + 1;
        Some((here, line))
    })
}

/// The key token of a `key:` or `- key:` line, as a range within the line.
pub(crate) fn key_span(line: &str) -> Option<(usize, usize)> {
    let caps = mapping_key_re()
        .captures(line)
        .or_else(|| list_item_key_re().captures(line))?;
    let key = caps.get(1)?;
    Some((key.start(), key.end()))
}

/// Typo diagnostics against the built-in profile schema.
pub fn lint_typos(text: &str) -> Vec<Diagnostic> {
    lint_typos_with(sensei_schema::builtin(), text, &LintOptions::default())
}

/// Typo diagnostics against `registry`.
pub fn lint_typos_with(
    registry: &SchemaRegistry,
    text: &str,
    options: &LintOptions,
) -> Vec<Diagnostic> {
    let labels = registry.labels();
    let mut diagnostics = Vec::new();

    for (line_start, line) in lines_with_offsets(text) {
        let Some((start, end)) = key_span(line) else {
            continue;
        };
        let key = &line[start..end];

        if key.chars().count() < options.min_key_len {
            continue;
        }
        if labels.iter().any(|label| *label == key) {
            continue;
        }

        let mut candidates: Vec<(usize, &str)> = labels
            .iter()
            .map(|label| (levenshtein(key, label), *label))
            .filter(|(dist, _)| (1..=options.max_distance).contains(dist))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        // Stable, so equally distant labels keep registry order.
        candidates.sort_by_key(|(dist, _)| *dist);

        trace!(key, candidates = candidates.len(), "possible typo");
        diagnostics.push(Diagnostic {
            from: line_start + start,
            to: line_start + end,
            severity: Severity::Warning,
            message: typo_message(key, &candidates),
            fixes: candidates
                .iter()
                .map(|(_, label)| SuggestedFix {
                    label: format!("Replace with '{label}'"),
                    replacement: label.to_string(),
                })
                .collect(),
        });
    }

    diagnostics
}

fn typo_message(key: &str, candidates: &[(usize, &str)]) -> String {
    let names: Vec<String> = candidates
        .iter()
        .map(|(_, label)| format!("'{label}'"))
        .collect();
    match names.as_slice() {
        [one] => format!("unknown key '{key}', did you mean {one}?"),
        _ => format!(
            "unknown key '{key}', did you mean one of {}?",
            names.join(", ")
        ),
    }
}

/// Compute Levenshtein distance between two strings
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
