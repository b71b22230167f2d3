//! Rule system for symbol-model analysis
//!
//! Rules inspect one compilation's [`SymbolModel`] and report diagnostics.

pub mod security;

use crate::config::RulesConfig;
use crate::cycles::AnalysisOptions;
use crate::diagnostic::Diagnostic;
use crate::model::SymbolModel;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Security,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Security => "security",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Message with `{0}`-style placeholders filled from `message_args`.
    pub message_template: &'static str,
    pub docs_url: Option<&'static str>,
    pub examples: Option<&'static str>,
}

/// What a rule sees during one run.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub model: &'a SymbolModel,
    pub options: AnalysisOptions,
}

impl<'a> RuleContext<'a> {
    pub fn new(model: &'a SymbolModel) -> Self {
        Self {
            model,
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}

pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;
    fn check(&self, ctx: &RuleContext) -> Vec<Diagnostic>;
}

pub fn format_message(template: &str, args: &[String]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |message, (i, arg)| {
            message.replace(&format!("{{{i}}}"), arg)
        })
}

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    disabled_rules: HashSet<String>,
    severity_overrides: HashMap<String, Severity>,
    security_enabled: bool,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
            security_enabled: true,
        }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn configure(&mut self, config: &RulesConfig) {
        self.disabled_rules.clear();
        self.severity_overrides.clear();

        for rule_ref in &config.disabled {
            self.disabled_rules.insert(rule_ref.clone());
        }

        for (rule_ref, severity_value) in &config.severity {
            self.severity_overrides
                .insert(rule_ref.clone(), (*severity_value).into());
        }

        self.security_enabled = config.security.unwrap_or(true);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn run_all(&self, ctx: &RuleContext) -> Vec<Diagnostic> {
        self.rules
            .iter()
            .filter(|rule| self.should_run_rule(rule.as_ref()))
            .flat_map(|rule| {
                let mut diagnostics = rule.check(ctx);
                self.apply_severity_overrides(rule.as_ref(), &mut diagnostics);
                diagnostics
            })
            .collect()
    }

    fn should_run_rule(&self, rule: &dyn Rule) -> bool {
        let metadata = rule.metadata();

        if !self.security_enabled && metadata.category == RuleCategory::Security {
            return false;
        }

        !self.is_rule_disabled(metadata)
    }

    fn is_rule_disabled(&self, metadata: &RuleMetadata) -> bool {
        self.disabled_rules.contains(metadata.id) || self.disabled_rules.contains(metadata.name)
    }

    fn apply_severity_overrides(&self, rule: &dyn Rule, diagnostics: &mut [Diagnostic]) {
        let metadata = rule.metadata();

        let override_severity = self
            .severity_overrides
            .get(metadata.id)
            .or_else(|| self.severity_overrides.get(metadata.name));

        if let Some(severity) = override_severity {
            for diag in diagnostics.iter_mut() {
                diag.severity = *severity;
            }
        }
    }

    pub fn is_rule_enabled(&self, id_or_name: &str) -> bool {
        if let Some(rule) = self
            .get_rule(id_or_name)
            .or_else(|| self.get_rule_by_name(id_or_name))
        {
            self.should_run_rule(rule)
        } else {
            false
        }
    }

    pub fn get_rule(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().id == id)
            .map(|r| r.as_ref())
    }

    pub fn get_rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().name == name)
            .map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        id = $id:literal,
        name = $rule_name:literal,
        description = $desc:literal,
        category = $cat:ident,
        severity = $sev:ident,
        message = $message:literal
        $(, docs_url = $url:literal)?
        $(, examples = $examples:literal)?
    ) => {
        pub struct $name {
            metadata: $crate::rules::RuleMetadata,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    metadata: $crate::rules::RuleMetadata {
                        id: $id,
                        name: $rule_name,
                        description: $desc,
                        category: $crate::rules::RuleCategory::$cat,
                        severity: $crate::rules::Severity::$sev,
                        message_template: $message,
                        docs_url: declare_rule!(@docs_url $($url)?),
                        examples: declare_rule!(@examples $($examples)?),
                    },
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@docs_url $url:literal) => { Some($url) };
    (@docs_url) => { None };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}
