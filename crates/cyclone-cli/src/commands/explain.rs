//! Explain command - provides detailed explanation of a rule

use clap::Args;
use colored::Colorize;
use cyclone_core::analysis::AnalysisEngine;
use cyclone_core::config::load_config_or_default_with_warnings;
use cyclone_core::rules::{Rule, RuleRegistry, Severity};
use std::env;
use std::fmt::Write;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    #[arg(
        value_name = "RULE_ID",
        help = "Rule ID or name to explain (e.g., \"S001\", \"no-deserialization-reference-cycle\")"
    )]
    pub rule_id: String,
}

impl ExplainArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let cwd = env::current_dir()?;
        let config_result = load_config_or_default_with_warnings(&cwd);
        let engine = AnalysisEngine::with_config(&config_result.config);
        let registry = engine.registry();

        match find_rule(registry, &self.rule_id) {
            Some(rule) => {
                let enabled = registry.is_rule_enabled(rule.metadata().id);
                print!("{}", describe_rule(rule, enabled));
                Ok(())
            }
            None => {
                eprintln!(
                    "{} Unknown rule '{}'",
                    "error:".red().bold(),
                    self.rule_id
                );
                eprintln!();
                eprintln!("Available rules:");

                for rule in registry.rules() {
                    let meta = rule.metadata();
                    eprintln!("  {} ({})", meta.id, meta.name);
                }

                std::process::exit(1);
            }
        }
    }
}

fn find_rule<'r>(registry: &'r RuleRegistry, id_or_name: &str) -> Option<&'r dyn Rule> {
    registry
        .get_rule(id_or_name)
        .or_else(|| registry.get_rule_by_name(id_or_name))
}

fn describe_rule(rule: &dyn Rule, enabled: bool) -> String {
    let metadata = rule.metadata();
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", format!("Rule {}", metadata.id).bold());
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}: {}", "Name".cyan(), metadata.name);
    let _ = writeln!(out, "  {}: {}", "Description".cyan(), metadata.description);
    let _ = writeln!(out, "  {}: {}", "Category".cyan(), metadata.category.as_str());
    let _ = writeln!(
        out,
        "  {}: {}",
        "Severity".cyan(),
        format_severity(metadata.severity)
    );
    let _ = writeln!(out, "  {}: {}", "Message".cyan(), metadata.message_template);

    if let Some(url) = metadata.docs_url {
        let _ = writeln!(out, "  {}: {}", "Documentation".cyan(), url);
    }

    if let Some(examples) = metadata.examples {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}:", "Examples".cyan());
        for line in examples.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }

    let _ = writeln!(out);
    let status = if enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    let _ = writeln!(out, "  {}: {}", "Status".cyan(), status);
    let _ = writeln!(out);

    out
}

fn format_severity(severity: Severity) -> String {
    let label = severity.as_str();
    match severity {
        Severity::Error => label.red().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Info => label.blue().to_string(),
        Severity::Hint => label.cyan().to_string(),
    }
}
