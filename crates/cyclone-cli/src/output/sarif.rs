//! SARIF output formatter for code scanning integrations
//!
//! Emits SARIF 2.1.0 so reference-cycle findings can be uploaded to any
//! static analysis dashboard that understands the standard.

use cyclone_core::diagnostic::Diagnostic;
use cyclone_core::rules::{RuleCategory, RuleRegistry, Severity};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
const SRCROOT: &str = "%SRCROOT%";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifOutput {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub version: &'static str,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<SarifArtifact>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: &'static str,
    pub semantic_version: &'static str,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub short_description: SarifMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_description: Option<SarifMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_uri: Option<String>,
    pub default_configuration: SarifRuleConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SarifRuleProperties>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRuleConfiguration {
    pub level: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRuleProperties {
    #[serde(rename = "security-severity")]
    pub security_severity: &'static str,
    pub precision: &'static str,
    pub tags: Vec<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: &'static str,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub partial_fingerprints: SarifPartialFingerprints,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SarifResultProperties>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    pub uri: String,
    pub uri_base_id: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
    pub start_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

#[derive(Serialize)]
pub struct SarifPartialFingerprints {
    #[serde(rename = "primaryLocationLineHash")]
    pub primary_location_line_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifact {
    pub location: SarifArtifactLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResultProperties {
    pub member: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

pub struct SarifFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> SarifFormatter<'a> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        let output = self.build_output(diagnostics);
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn build_output(&self, diagnostics: &[Diagnostic]) -> SarifOutput {
        let rule_ids: BTreeSet<&str> = diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        let rules = rule_ids.into_iter().map(|id| self.build_rule(id)).collect();
        let results = diagnostics.iter().map(|d| self.convert_result(d)).collect();

        SarifOutput {
            schema: SARIF_SCHEMA,
            version: SARIF_VERSION,
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "Cyclone",
                        semantic_version: env!("CARGO_PKG_VERSION"),
                        rules,
                    },
                },
                results,
                artifacts: build_artifacts(diagnostics),
            }],
        }
    }

    fn build_rule(&self, rule_id: &str) -> SarifRule {
        let Some(rule) = self.registry.and_then(|r| r.get_rule(rule_id)) else {
            return SarifRule {
                id: rule_id.to_string(),
                name: None,
                short_description: SarifMessage {
                    text: rule_id.to_string(),
                },
                full_description: None,
                help_uri: None,
                default_configuration: SarifRuleConfiguration {
                    level: sarif_level(Severity::Warning),
                },
                properties: None,
            };
        };

        let metadata = rule.metadata();
        let tags = match metadata.category {
            RuleCategory::Security => vec!["security", "external/cwe/cwe-674"],
        };

        SarifRule {
            id: metadata.id.to_string(),
            name: Some(metadata.name.to_string()),
            short_description: SarifMessage {
                text: metadata.name.to_string(),
            },
            full_description: Some(SarifMessage {
                text: metadata.description.to_string(),
            }),
            help_uri: metadata.docs_url.map(str::to_string),
            default_configuration: SarifRuleConfiguration {
                level: sarif_level(metadata.severity),
            },
            properties: Some(SarifRuleProperties {
                security_severity: security_severity(metadata.severity),
                precision: "high",
                tags,
            }),
        }
    }

    fn convert_result(&self, diag: &Diagnostic) -> SarifResult {
        let multiline = diag.end_line != diag.line;
        let region = SarifRegion {
            start_line: diag.line,
            start_column: diag.column,
            end_line: multiline.then_some(diag.end_line),
            end_column: (multiline || diag.end_column != diag.column).then_some(diag.end_column),
        };

        let properties = diag.message_args.first().map(|member| SarifResultProperties {
            member: member.clone(),
            suggestion: diag.suggestion.clone(),
        });

        SarifResult {
            rule_id: diag.rule_id.clone(),
            level: sarif_level(diag.severity),
            message: SarifMessage {
                text: diag.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: artifact_location(&diag.file),
                    region,
                },
            }],
            partial_fingerprints: SarifPartialFingerprints {
                primary_location_line_hash: generate_fingerprint(diag),
            },
            properties,
        }
    }
}

impl Default for SarifFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn build_artifacts(diagnostics: &[Diagnostic]) -> Vec<SarifArtifact> {
    let mut seen = HashSet::new();
    diagnostics
        .iter()
        .filter(|d| seen.insert(d.file.as_str()))
        .map(|d| SarifArtifact {
            location: artifact_location(&d.file),
        })
        .collect()
}

fn artifact_location(file: &str) -> SarifArtifactLocation {
    SarifArtifactLocation {
        uri: normalize_path(file),
        uri_base_id: SRCROOT,
    }
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Hint => "note",
    }
}

fn security_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "8.0",
        Severity::Warning => "6.0",
        Severity::Info => "3.0",
        Severity::Hint => "1.0",
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

// Member name is part of the hash so two findings on one line stay distinct.
fn generate_fingerprint(diag: &Diagnostic) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    diag.rule_id.hash(&mut hasher);
    diag.file.hash(&mut hasher);
    diag.line.hash(&mut hasher);
    diag.message_args.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
