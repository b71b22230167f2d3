//! Data members of a type, folded over its serializable base chain

use std::collections::HashSet;

use tracing::trace;

use crate::model::{MemberId, MemberKind, MemberSymbol, SymbolModel, TypeId};

#[derive(Debug, Clone, Copy, Default)]
pub struct MemberCollector {
    include_computed: bool,
}

impl MemberCollector {
    pub fn new(include_computed: bool) -> Self {
        Self { include_computed }
    }

    /// Whether the member holds serialized state.
    pub fn qualifies(&self, member: &MemberSymbol) -> bool {
        if member.is_static || member.is_excluded() {
            return false;
        }
        match member.kind {
            MemberKind::Field | MemberKind::AutoProperty => true,
            MemberKind::ComputedProperty => self.include_computed,
        }
    }

    /// Own qualifying members of `ty`, then those of each serializable
    /// ancestor, each reported once under its declaring identity.
    pub fn collect(&self, model: &SymbolModel, ty: TypeId) -> Vec<MemberId> {
        let mut collected = Vec::new();
        let mut seen = HashSet::new();
        let mut chain = HashSet::new();
        let mut current = Some(ty);

        while let Some(owner) = current {
            if !chain.insert(owner) {
                trace!(
                    type_name = %model.get_type(ty).name,
                    "base chain revisits a type, folding stops"
                );
                break;
            }

            for member in model.members_of(owner) {
                if self.qualifies(member) && seen.insert(member.id) {
                    collected.push(member.id);
                }
            }

            current = model
                .base_type(owner)
                .filter(|&base| model.is_serializable(base));
        }

        collected
    }
}
