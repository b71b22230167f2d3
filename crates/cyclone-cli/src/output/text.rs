//! Plain text formatter, one `file:line:column` line per finding

use colored::{ColoredString, Colorize};
use cyclone_core::diagnostic::Diagnostic;
use cyclone_core::rules::Severity;
use std::fmt::Write;

pub struct TextFormatter {
    color: bool,
}

impl TextFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();

        for diag in diagnostics {
            let _ = writeln!(
                out,
                "{}:{}:{}: {} [{}]: {}",
                diag.file,
                diag.line,
                diag.column,
                self.severity_label(diag.severity),
                self.paint(&diag.rule_id, |s| s.dimmed()),
                diag.message
            );

            if let Some(suggestion) = &diag.suggestion {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    self.paint("suggestion:", |s| s.green()),
                    suggestion
                );
            }
        }

        if !diagnostics.is_empty() {
            let errors = count(diagnostics, Severity::Error);
            let warnings = count(diagnostics, Severity::Warning);
            let _ = writeln!(out);
            let _ = writeln!(out, "Found {} error(s) and {} warning(s)", errors, warnings);
        }

        out
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = severity.as_str();
        match severity {
            Severity::Error => self.paint(label, |s| s.red().bold()),
            Severity::Warning => self.paint(label, |s| s.yellow().bold()),
            Severity::Info => self.paint(label, |s| s.blue().bold()),
            Severity::Hint => self.paint(label, |s| s.cyan().bold()),
        }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

pub fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn finding(member: &str, file: &str, line: usize, column: usize) -> Diagnostic {
        Diagnostic::new(
            "S001",
            Severity::Warning,
            format!("'{member}' may participate in a reference cycle during deserialization"),
            file,
            line,
            column,
        )
        .with_message_args([member])
    }

    #[test]
    fn renders_findings_with_summary() {
        let diagnostics = vec![
            finding("staff", "Department.cs", 5, 31),
            finding("department", "Employee.cs", 5, 27).with_suggestion(
                "Exclude the member from serialization or replace the reference with an identifier",
            ),
        ];

        let output = TextFormatter::new(false).format(&diagnostics);

        assert_snapshot!(output, @r"
        Department.cs:5:31: warning [S001]: 'staff' may participate in a reference cycle during deserialization
        Employee.cs:5:27: warning [S001]: 'department' may participate in a reference cycle during deserialization
          suggestion: Exclude the member from serialization or replace the reference with an identifier

        Found 0 error(s) and 2 warning(s)
        ");
    }

    #[test]
    fn empty_report_prints_nothing() {
        assert!(TextFormatter::new(false).format(&[]).is_empty());
    }

    #[test]
    fn counts_by_severity() {
        let diagnostics = vec![
            Diagnostic::new("S001", Severity::Error, "e", "A.cs", 1, 1),
            finding("next", "A.cs", 2, 1),
            finding("prev", "A.cs", 3, 1),
        ];

        assert_eq!(count(&diagnostics, Severity::Error), 1);
        assert_eq!(count(&diagnostics, Severity::Warning), 2);
        assert_eq!(count(&diagnostics, Severity::Hint), 0);
    }

    #[test]
    fn uncolored_output_has_no_escape_codes() {
        let output = TextFormatter::new(false).format(&[finding("next", "Node.cs", 6, 21)]);

        assert!(!output.contains('\u{1b}'));
    }
}
