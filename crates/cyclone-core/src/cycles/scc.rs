//! Strongly connected components over a [`TypeGraph`]
//!
//! Components come from petgraph's Tarjan, which keeps its own work stack,
//! so arbitrarily deep type chains cannot overflow the call stack.

use petgraph::algo::tarjan_scc;

use super::graph::TypeGraph;
use crate::model::TypeId;

#[derive(Debug, Default)]
pub struct Components {
    component_of: Vec<Option<usize>>,
    sizes: Vec<usize>,
    cyclic: Vec<bool>,
}

impl Components {
    pub fn compute(graph: &TypeGraph) -> Self {
        let digraph = graph.digraph();
        let mut components = Components {
            component_of: vec![None; graph.slots()],
            sizes: Vec::new(),
            cyclic: Vec::new(),
        };

        for scc in tarjan_scc(digraph) {
            let component = components.sizes.len();
            for &node in &scc {
                components.component_of[digraph[node].index()] = Some(component);
            }

            let self_loop = scc.len() == 1 && digraph.contains_edge(scc[0], scc[0]);
            components.sizes.push(scc.len());
            components.cyclic.push(scc.len() > 1 || self_loop);
        }

        components
    }

    pub fn component(&self, ty: TypeId) -> Option<usize> {
        self.component_of.get(ty.index()).copied().flatten()
    }

    pub fn size(&self, component: usize) -> usize {
        self.sizes[component]
    }

    /// More than one member, or a single member with a self-loop.
    pub fn is_cyclic(&self, component: usize) -> bool {
        self.cyclic[component]
    }

    pub fn share_cycle(&self, a: TypeId, b: TypeId) -> bool {
        match (self.component(a), self.component(b)) {
            (Some(x), Some(y)) => x == y && self.is_cyclic(x),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn cyclic_count(&self) -> usize {
        self.cyclic.iter().filter(|&&c| c).count()
    }
}
