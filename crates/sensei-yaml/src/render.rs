//! Terminal rendering of diagnostics.

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::lint::{Diagnostic, Severity};

/// Get ariadne config, respecting NO_COLOR env var.
fn ariadne_config() -> Config {
    let no_color = std::env::var("NO_COLOR").is_ok();
    if no_color {
        Config::default().with_color(false)
    } else {
        Config::default()
    }
}

impl Diagnostic {
    /// Render this diagnostic with ariadne.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.message.clone())
    }

    /// Write the report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let _ = self
            .build_report(filename)
            .with_config(ariadne_config())
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = self.from..self.to.max(self.from + 1);

        let (kind, color) = match self.severity {
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
            Severity::Hint => (ReportKind::Advice, Color::Blue),
        };

        let label = match self.fixes.as_slice() {
            [] => "here".to_string(),
            [fix] => format!("did you mean '{}'?", fix.replacement),
            _ => "unknown key".to_string(),
        };

        let mut report = Report::build(kind, (filename, range.clone()))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, range))
                    .with_message(label)
                    .with_color(color),
            );

        if self.fixes.len() > 1 {
            let options: Vec<&str> = self.fixes.iter().map(|f| f.replacement.as_str()).collect();
            report = report.with_help(format!("known keys: {}", options.join(", ")));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use crate::lint::{SuggestedFix, lint_typos};

    use super::*;

    fn render_plain(diag: &Diagnostic, source: &str) -> String {
        let rendered = diag.render("profile.yaml", source);
        String::from_utf8(strip_ansi_escapes::strip(rendered.as_bytes())).unwrap()
    }

    #[test]
    fn test_typo_report() {
        let source = "user:\n  languege: \"fr\"\n";
        let diagnostics = lint_typos(source);
        let rendered = render_plain(&diagnostics[0], source);

        assert!(rendered.contains("Warning"), "{rendered}");
        assert!(rendered.contains("profile.yaml"), "{rendered}");
        assert!(rendered.contains("did you mean 'language'?"), "{rendered}");
        assert!(rendered.contains("languege: \"fr\""), "{rendered}");
    }

    #[test]
    fn test_multiple_fixes_get_help() {
        let source = "stepz: 1\n";
        let diag = Diagnostic {
            from: 0,
            to: 5,
            severity: Severity::Warning,
            message: "unknown key 'stepz'".to_string(),
            fixes: ["steps", "step"]
                .into_iter()
                .map(|r| SuggestedFix {
                    label: format!("Replace with '{r}'"),
                    replacement: r.to_string(),
                })
                .collect(),
        };
        let rendered = render_plain(&diag, source);
        assert!(rendered.contains("known keys: steps, step"), "{rendered}");
    }

    #[test]
    fn test_empty_span_at_document_start() {
        let source = "llm:\n";
        let diag = Diagnostic {
            from: 0,
            to: 0,
            severity: Severity::Hint,
            message: "missing required key 'user'".to_string(),
            fixes: Vec::new(),
        };
        let rendered = render_plain(&diag, source);
        assert!(rendered.contains("Advice"), "{rendered}");
        assert!(rendered.contains("missing required key 'user'"), "{rendered}");
    }
}
