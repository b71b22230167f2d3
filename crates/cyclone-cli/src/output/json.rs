//! JSON output formatter for diagnostic display
//!
//! Provides structured JSON and NDJSON output formats for programmatic integration.

use cyclone_core::diagnostic::Diagnostic;
use cyclone_core::rules::{RuleRegistry, Severity};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, Write};

#[derive(Serialize)]
pub struct JsonOutput {
    pub version: &'static str,
    pub metadata: JsonMetadata,
    pub summary: JsonSummary,
    pub diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Serialize)]
pub struct JsonMetadata {
    pub cyclone_version: &'static str,
    pub working_directory: String,
    pub analyzed_path: String,
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub total_snapshots: usize,
    pub files_with_issues: usize,
    pub total_diagnostics: usize,
    pub by_severity: SeverityCounts,
}

#[derive(Serialize, Default)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub hint: usize,
}

#[derive(Serialize)]
pub struct JsonDiagnostic {
    pub rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub severity: String,
    pub message: String,
    pub message_args: Vec<String>,
    pub location: JsonLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Serialize)]
pub struct JsonLocation {
    pub file: String,
    pub start: JsonPosition,
    pub end: JsonPosition,
}

#[derive(Serialize)]
pub struct JsonPosition {
    pub line: usize,
    pub column: usize,
}

#[derive(Serialize)]
#[serde(tag = "type")]
pub enum NdjsonRecord {
    #[serde(rename = "metadata")]
    Metadata(JsonMetadata),
    #[serde(rename = "diagnostic")]
    Diagnostic(JsonDiagnostic),
    #[serde(rename = "summary")]
    Summary(JsonSummary),
}

pub struct JsonFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> JsonFormatter<'a> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(
        &self,
        diagnostics: &[Diagnostic],
        total_snapshots: usize,
        analyzed_path: &str,
    ) -> String {
        let output = JsonOutput {
            version: "1.0",
            metadata: self.build_metadata(analyzed_path),
            summary: self.build_summary(diagnostics, total_snapshots),
            diagnostics: diagnostics
                .iter()
                .map(|d| self.convert_diagnostic(d))
                .collect(),
        };
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_ndjson<W: Write>(
        &self,
        diagnostics: &[Diagnostic],
        total_snapshots: usize,
        analyzed_path: &str,
        writer: &mut W,
    ) -> io::Result<()> {
        let metadata = self.build_metadata(analyzed_path);
        writeln!(
            writer,
            "{}",
            serde_json::to_string(&NdjsonRecord::Metadata(metadata))?
        )?;

        for diag in diagnostics {
            let json_diag = self.convert_diagnostic(diag);
            writeln!(
                writer,
                "{}",
                serde_json::to_string(&NdjsonRecord::Diagnostic(json_diag))?
            )?;
        }

        let summary = self.build_summary(diagnostics, total_snapshots);
        writeln!(
            writer,
            "{}",
            serde_json::to_string(&NdjsonRecord::Summary(summary))?
        )?;

        Ok(())
    }

    fn build_metadata(&self, analyzed_path: &str) -> JsonMetadata {
        JsonMetadata {
            cyclone_version: env!("CARGO_PKG_VERSION"),
            working_directory: std::env::current_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            analyzed_path: analyzed_path.to_string(),
        }
    }

    fn build_summary(&self, diagnostics: &[Diagnostic], total_snapshots: usize) -> JsonSummary {
        let mut by_severity = SeverityCounts::default();
        let mut files_with_issues: HashSet<&str> = HashSet::new();

        for diag in diagnostics {
            match diag.severity {
                Severity::Error => by_severity.error += 1,
                Severity::Warning => by_severity.warning += 1,
                Severity::Info => by_severity.info += 1,
                Severity::Hint => by_severity.hint += 1,
            }
            files_with_issues.insert(diag.file.as_str());
        }

        JsonSummary {
            total_snapshots,
            files_with_issues: files_with_issues.len(),
            total_diagnostics: diagnostics.len(),
            by_severity,
        }
    }

    fn convert_diagnostic(&self, diag: &Diagnostic) -> JsonDiagnostic {
        let rule = self.registry.and_then(|r| r.get_rule(&diag.rule_id));

        JsonDiagnostic {
            rule_id: diag.rule_id.clone(),
            rule_name: rule.map(|r| r.metadata().name.to_string()),
            category: rule.map(|r| r.metadata().category.as_str().to_string()),
            severity: diag.severity.as_str().to_string(),
            message: diag.message.clone(),
            message_args: diag.message_args.clone(),
            location: JsonLocation {
                file: diag.file.clone(),
                start: JsonPosition {
                    line: diag.line,
                    column: diag.column,
                },
                end: JsonPosition {
                    line: diag.end_line,
                    column: diag.end_column,
                },
            },
            suggestion: diag.suggestion.clone(),
        }
    }
}

impl Default for JsonFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}
