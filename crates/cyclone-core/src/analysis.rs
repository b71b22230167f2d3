//! Analysis engine for symbol snapshots
//!
//! Provides the core analysis functionality for the CLI and other hosts.

use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::cycles::AnalysisOptions;
use crate::diagnostic::Diagnostic;
use crate::model::{SnapshotError, SymbolModel, load_snapshot};
use crate::rules::security::ReferenceCycle;
use crate::rules::{RuleContext, RuleRegistry};

pub struct AnalysisEngine {
    registry: RuleRegistry,
    options: AnalysisOptions,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            registry: create_default_registry(),
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        let mut registry = create_default_registry();
        registry.configure(&config.rules);
        Self {
            registry,
            options: AnalysisOptions::from(&config.analysis),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn options(&self) -> AnalysisOptions {
        self.options
    }

    pub fn analyze(&self, model: &SymbolModel) -> Vec<Diagnostic> {
        let ctx = RuleContext::new(model).with_options(self.options);
        let diagnostics = self.registry.run_all(&ctx);

        debug!(
            compilation = model.compilation(),
            types = model.type_count(),
            members = model.member_count(),
            diagnostics = diagnostics.len(),
            "analysis finished"
        );

        diagnostics
    }

    pub fn analyze_snapshot(&self, path: &Path) -> Result<Vec<Diagnostic>, SnapshotError> {
        let model = load_snapshot(path)?;
        Ok(self.analyze(&model))
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn create_default_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    registry.register(Box::new(ReferenceCycle::new()));

    registry
}
