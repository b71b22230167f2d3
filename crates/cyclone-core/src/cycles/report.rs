//! Members whose edge stays inside a cyclic component

use std::collections::HashSet;

use super::graph::TypeGraph;
use super::scc::Components;
use crate::model::{Location, MemberId, SymbolModel, TypeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFinding {
    pub member: MemberId,
    pub declaring_type: TypeId,
    pub name: String,
    pub location: Location,
}

/// Flags every member with at least one edge whose endpoints share a cyclic
/// component. Each member appears once, at its declaring location, ordered
/// by file, line, column and name.
pub fn find_cycle_members(
    model: &SymbolModel,
    graph: &TypeGraph,
    components: &Components,
) -> Vec<CycleFinding> {
    let mut flagged = HashSet::new();
    let mut findings = Vec::new();

    for edge in graph.edges() {
        if !components.share_cycle(edge.from, edge.to) {
            continue;
        }
        if !flagged.insert(edge.member) {
            continue;
        }

        let member = model.member(edge.member);
        findings.push(CycleFinding {
            member: member.id,
            declaring_type: member.declaring_type,
            name: member.name.clone(),
            location: member.location.clone(),
        });
    }

    findings.sort_by(|a, b| {
        (&a.location.file, a.location.line, a.location.column, &a.name).cmp(&(
            &b.location.file,
            b.location.line,
            b.location.column,
            &b.name,
        ))
    });
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles::graph::GraphBuilder;
    use crate::model::{MemberDecl, TypeDecl};

    fn findings(model: &SymbolModel) -> Vec<CycleFinding> {
        let graph = GraphBuilder::new(model).build();
        let components = Components::compute(&graph);
        find_cycle_members(model, &graph, &components)
    }

    #[test]
    fn member_leaving_the_cycle_is_not_flagged() {
        let mut model = SymbolModel::new("test");
        let a = model.add_type(TypeDecl::class("A").serializable());
        let b = model.add_type(TypeDecl::class("B").serializable());
        let d = model.add_type(TypeDecl::class("D").serializable());
        let a_ref = model.named(a);
        let b_ref = model.named(b);
        let d_ref = model.named(d);
        model.add_member(a, MemberDecl::field("toB", b_ref).at("a.cs", 3, 5));
        model.add_member(a, MemberDecl::field("toD", d_ref).at("a.cs", 4, 5));
        model.add_member(b, MemberDecl::field("toA", a_ref).at("b.cs", 3, 5));

        let names: Vec<_> = findings(&model).into_iter().map(|f| f.name).collect();

        assert_eq!(names, vec!["toB", "toA"]);
    }

    #[test]
    fn inherited_member_is_reported_once_at_declaration() {
        let mut model = SymbolModel::new("test");
        let base = model.add_type(TypeDecl::class("Base").serializable());
        let left = model.add_type(TypeDecl::class("Left").serializable());
        let right = model.add_type(TypeDecl::class("Right").serializable());
        model.set_base(left, base);
        model.set_base(right, base);
        let base_ref = model.named(base);
        let parent = model.add_member(base, MemberDecl::field("parent", base_ref).at("base.cs", 2, 9));

        let found = findings(&model);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].member, parent);
        assert_eq!(found[0].declaring_type, base);
        assert_eq!(found[0].location, Location::new("base.cs", 2, 9));
    }

    #[test]
    fn output_is_sorted_by_location_then_name() {
        let mut model = SymbolModel::new("test");
        let node = model.add_type(TypeDecl::class("Node").serializable());
        let node_ref = model.named(node);
        model.add_member(node, MemberDecl::field("z", node_ref).at("b.cs", 1, 1));
        model.add_member(node, MemberDecl::field("y", node_ref).at("a.cs", 9, 1));
        model.add_member(node, MemberDecl::field("x", node_ref).at("a.cs", 2, 4));
        model.add_member(node, MemberDecl::field("w", node_ref).at("a.cs", 2, 4));

        let names: Vec<_> = findings(&model).into_iter().map(|f| f.name).collect();

        assert_eq!(names, vec!["w", "x", "y", "z"]);
    }
}
