//! no-deserialization-reference-cycle rule (S001): Detects data members of
//! serializable types that can lead back to the type carrying them

use crate::cycles::CycleAnalysis;
use crate::declare_rule;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext, RuleMetadata, format_message};

declare_rule!(
    ReferenceCycle,
    id = "S001",
    name = "no-deserialization-reference-cycle",
    description = "Disallow serializable object graphs whose members can form reference cycles",
    category = Security,
    severity = Warning,
    message = "'{0}' may participate in a reference cycle during deserialization",
    examples = "// Bad\n[Serializable]\nclass Node { Node next; }\n\n// Good\n[Serializable]\nclass Node { int nextId; }"
);

impl Rule for ReferenceCycle {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext) -> Vec<Diagnostic> {
        let analysis = CycleAnalysis::run(ctx.model, ctx.options);

        analysis
            .findings()
            .into_iter()
            .map(|finding| {
                let args = vec![finding.name];
                Diagnostic::new(
                    self.metadata.id,
                    self.metadata.severity,
                    format_message(self.metadata.message_template, &args),
                    finding.location.file,
                    finding.location.line,
                    finding.location.column,
                )
                .with_message_args(args)
                .with_suggestion(
                    "Exclude the member from serialization or replace the reference with an identifier",
                )
            })
            .collect()
    }
}
