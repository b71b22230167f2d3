//! Check command - analyzes symbol snapshots for reference cycles

use crate::output::json::JsonFormatter;
use crate::output::sarif::SarifFormatter;
use crate::output::text::{TextFormatter, count};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cyclone_core::analysis::AnalysisEngine;
use cyclone_core::config::load_config_or_default_with_warnings;
use cyclone_core::diagnostic::Diagnostic;
use cyclone_core::model::{SnapshotError, is_snapshot_file};
use cyclone_core::rules::Severity;
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const SKIPPED_DIRECTORIES: &[&str] = &["node_modules", "bin", "obj"];

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Snapshot file or directory containing `*.symbols.json` snapshots
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Output format for diagnostics (text, json, ndjson, sarif)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Fail on warnings (exit code 1)
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Filter diagnostics by minimum severity level (error, warning, info, hint)
    #[arg(long, value_name = "LEVEL")]
    pub severity: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Result of analyzing every discovered snapshot.
struct CheckReport {
    diagnostics: Vec<Diagnostic>,
    failures: Vec<SnapshotError>,
    total_snapshots: usize,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();
        let color = self.color_enabled();

        let config_result = load_config_or_default_with_warnings(&self.path);
        for warning in &config_result.warnings {
            eprintln!("{} {}", self.paint_warning(color), warning);
        }
        let engine = AnalysisEngine::with_config(&config_result.config);

        let snapshots = discover_snapshots(&self.path)?;
        if snapshots.is_empty() {
            println!("No symbol snapshots found.");
            return Ok(());
        }

        let min_severity = self.parse_severity()?;
        let report = self.analyze(&engine, &snapshots, min_severity);

        for failure in &report.failures {
            if color {
                eprintln!("{} {}", "error:".red().bold(), failure);
            } else {
                eprintln!("error: {}", failure);
            }
        }

        let analyzed_path = self.path.to_string_lossy();
        match self.format.as_str() {
            "json" => {
                let formatter = JsonFormatter::with_registry(engine.registry());
                println!(
                    "{}",
                    formatter.format(&report.diagnostics, report.total_snapshots, &analyzed_path)
                );
            }
            "ndjson" => {
                let formatter = JsonFormatter::with_registry(engine.registry());
                let mut stdout = io::stdout().lock();
                formatter.format_ndjson(
                    &report.diagnostics,
                    report.total_snapshots,
                    &analyzed_path,
                    &mut stdout,
                )?;
            }
            "sarif" => {
                let formatter = SarifFormatter::with_registry(engine.registry());
                println!("{}", formatter.format(&report.diagnostics));
            }
            "text" => print!("{}", TextFormatter::new(color).format(&report.diagnostics)),
            other => anyhow::bail!(
                "Invalid format '{}'. Valid values: text, json, ndjson, sarif",
                other
            ),
        }

        if self.should_fail(&report) {
            process::exit(1);
        }

        Ok(())
    }

    fn analyze(
        &self,
        engine: &AnalysisEngine,
        snapshots: &[PathBuf],
        min_severity: Severity,
    ) -> CheckReport {
        info!(snapshots = snapshots.len(), "analyzing symbol snapshots");

        let results: Vec<Result<Vec<Diagnostic>, SnapshotError>> = snapshots
            .par_iter()
            .map(|path| {
                debug!(path = %path.display(), "analyzing snapshot");
                engine.analyze_snapshot(path)
            })
            .collect();

        let mut diagnostics = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(found) => diagnostics.extend(
                    found
                        .into_iter()
                        .filter(|d| d.severity <= min_severity),
                ),
                Err(err) => {
                    warn!(error = %err, "skipping snapshot");
                    failures.push(err);
                }
            }
        }

        CheckReport {
            diagnostics,
            failures,
            total_snapshots: snapshots.len(),
        }
    }

    fn should_fail(&self, report: &CheckReport) -> bool {
        let has_errors = count(&report.diagnostics, Severity::Error) > 0;
        let has_warnings =
            self.fail_on_warnings && count(&report.diagnostics, Severity::Warning) > 0;

        has_errors || has_warnings || !report.failures.is_empty()
    }

    fn parse_severity(&self) -> Result<Severity> {
        match self.severity.as_deref() {
            Some("error") => Ok(Severity::Error),
            Some("warning") => Ok(Severity::Warning),
            Some("info") => Ok(Severity::Info),
            Some("hint") => Ok(Severity::Hint),
            Some(other) => anyhow::bail!(
                "Invalid severity '{}'. Valid values: error, warning, info, hint",
                other
            ),
            None => Ok(Severity::Hint),
        }
    }

    fn configure_colors(&self) {
        if !self.color_enabled() {
            colored::control::set_override(false);
        }
    }

    fn color_enabled(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }

    fn paint_warning(&self, color: bool) -> String {
        if color {
            "warning:".yellow().bold().to_string()
        } else {
            "warning:".to_string()
        }
    }
}

fn discover_snapshots(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        return Ok(if is_snapshot_file(path) {
            vec![path.to_path_buf()]
        } else {
            vec![]
        });
    }

    let mut snapshots: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_snapshot_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    snapshots.sort();

    Ok(snapshots)
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || SKIPPED_DIRECTORIES.contains(&name))
        .unwrap_or(false)
}
