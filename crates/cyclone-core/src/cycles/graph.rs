//! Directed "follows" graph between serializable types

use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;

use super::members::MemberCollector;
use super::unwrap::Unwrapper;
use crate::model::{MemberId, SymbolModel, TypeId};

/// `from` is the type whose folded member set produced the edge, so an
/// inherited self-reference becomes a self-loop on the subclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: TypeId,
    pub member: MemberId,
    pub to: TypeId,
}

#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeId>,
    edges: Vec<Edge>,
    /// One node per serializable type, one edge per distinct (from, to) pair.
    graph: DiGraph<TypeId, ()>,
    /// Node of each type, indexed by `TypeId::index()`.
    node_of: Vec<Option<NodeIndex>>,
}

impl TypeGraph {
    pub fn from_edges(slots: usize, nodes: Vec<TypeId>, edges: Vec<Edge>) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut node_of = vec![None; slots];
        for &ty in &nodes {
            node_of[ty.index()] = Some(graph.add_node(ty));
        }

        let mut pairs: Vec<(NodeIndex, NodeIndex)> = edges
            .iter()
            .filter_map(|edge| Some((node_of[edge.from.index()]?, node_of[edge.to.index()]?)))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        for (from, to) in pairs {
            graph.add_edge(from, to, ());
        }

        Self {
            nodes,
            edges,
            graph,
            node_of,
        }
    }

    /// Number of dense type slots, one per type in the model.
    pub fn slots(&self) -> usize {
        self.node_of.len()
    }

    pub fn nodes(&self) -> &[TypeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn digraph(&self) -> &DiGraph<TypeId, ()> {
        &self.graph
    }

    pub fn node(&self, ty: TypeId) -> Option<NodeIndex> {
        self.node_of.get(ty.index()).copied().flatten()
    }

    /// Distinct successor types, sorted by identity.
    pub fn successors(&self, ty: TypeId) -> Vec<TypeId> {
        let Some(node) = self.node(ty) else {
            return Vec::new();
        };
        let mut targets: Vec<TypeId> = self.graph.neighbors(node).map(|n| self.graph[n]).collect();
        targets.sort_by_key(|t| t.index());
        targets
    }

    pub fn has_self_loop(&self, ty: TypeId) -> bool {
        self.node(ty)
            .is_some_and(|node| self.graph.contains_edge(node, node))
    }
}

pub struct GraphBuilder<'m> {
    model: &'m SymbolModel,
    collector: MemberCollector,
    parallel: bool,
}

impl<'m> GraphBuilder<'m> {
    pub fn new(model: &'m SymbolModel) -> Self {
        Self {
            model,
            collector: MemberCollector::default(),
            parallel: true,
        }
    }

    pub fn with_collector(mut self, collector: MemberCollector) -> Self {
        self.collector = collector;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(&self) -> TypeGraph {
        let nodes: Vec<TypeId> = self.model.serializable_types().collect();

        let per_type: Vec<Vec<Edge>> = if self.parallel {
            nodes
                .par_iter()
                .map_init(Unwrapper::new, |unwrapper, &ty| self.edges_from(unwrapper, ty))
                .collect()
        } else {
            let mut unwrapper = Unwrapper::new();
            nodes
                .iter()
                .map(|&ty| self.edges_from(&mut unwrapper, ty))
                .collect()
        };

        let edges = per_type.into_iter().flatten().collect();
        TypeGraph::from_edges(self.model.type_count(), nodes, edges)
    }

    fn edges_from(&self, unwrapper: &mut Unwrapper, from: TypeId) -> Vec<Edge> {
        let mut edges = Vec::new();
        for member in self.collector.collect(self.model, from) {
            let declared = self.model.member(member).declared_type;
            for &to in unwrapper.targets(self.model, declared) {
                edges.push(Edge { from, member, to });
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberDecl, TypeDecl};

    fn chain_model() -> (SymbolModel, TypeId, TypeId, TypeId) {
        let mut model = SymbolModel::new("test");
        let a = model.add_type(TypeDecl::class("A").serializable());
        let b = model.add_type(TypeDecl::class("B").serializable());
        let plain = model.add_type(TypeDecl::class("Plain"));
        let b_ref = model.named(b);
        let a_ref = model.named(a);
        let plain_ref = model.named(plain);
        model.add_member(a, MemberDecl::field("b", b_ref));
        model.add_member(a, MemberDecl::field("other", b_ref));
        model.add_member(b, MemberDecl::field("a", a_ref));
        model.add_member(b, MemberDecl::field("plain", plain_ref));
        (model, a, b, plain)
    }

    #[test]
    fn builds_edges_for_serializable_types_only() {
        let (model, a, b, plain) = chain_model();

        let graph = GraphBuilder::new(&model).build();

        assert_eq!(graph.nodes(), &[a, b]);
        assert_eq!(graph.edges().len(), 3);
        assert!(graph.edges().iter().all(|e| e.to != plain));
    }

    #[test]
    fn successors_ignore_multiplicity() {
        let (model, a, b, _) = chain_model();

        let graph = GraphBuilder::new(&model).build();

        assert_eq!(graph.successors(a), vec![b]);
        assert_eq!(graph.successors(b), vec![a]);
        assert_eq!(graph.digraph().edge_count(), 2);
        assert!(!graph.has_self_loop(a));
    }

    #[test]
    fn non_serializable_types_have_no_node() {
        let (model, a, _, plain) = chain_model();

        let graph = GraphBuilder::new(&model).build();

        assert!(graph.node(a).is_some());
        assert!(graph.node(plain).is_none());
        assert!(graph.successors(plain).is_empty());
        assert_eq!(graph.slots(), model.type_count());
    }

    #[test]
    fn inherited_self_reference_is_self_loop_on_subclass() {
        let mut model = SymbolModel::new("test");
        let base = model.add_type(TypeDecl::class("Base").serializable());
        let derived = model.add_type(TypeDecl::class("Derived").serializable());
        model.set_base(derived, base);
        let derived_ref = model.named(derived);
        let field = model.add_member(base, MemberDecl::field("child", derived_ref));

        let graph = GraphBuilder::new(&model).build();

        assert!(graph.has_self_loop(derived));
        assert!(!graph.has_self_loop(base));
        assert!(graph.edges().contains(&Edge {
            from: derived,
            member: field,
            to: derived
        }));
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let (model, ..) = chain_model();

        let parallel = GraphBuilder::new(&model).parallel(true).build();
        let sequential = GraphBuilder::new(&model).parallel(false).build();

        assert_eq!(parallel.edges(), sequential.edges());
        assert_eq!(parallel.nodes(), sequential.nodes());
    }
}
