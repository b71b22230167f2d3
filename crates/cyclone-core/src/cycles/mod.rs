//! Reference-cycle detection over a symbol model
//!
//! A run goes through five stages in order: unwrap member types, collect
//! folded members, build the type graph, compute strongly connected
//! components, then report members whose edge stays inside a cyclic
//! component. All run-scoped state lives in [`CycleAnalysis`].

pub mod graph;
pub mod members;
pub mod report;
pub mod scc;
pub mod unwrap;

pub use graph::{Edge, GraphBuilder, TypeGraph};
pub use members::MemberCollector;
pub use report::{CycleFinding, find_cycle_members};
pub use scc::Components;
pub use unwrap::{Unwrapper, unwrap_shape};

use tracing::{debug, debug_span};

use crate::model::SymbolModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Build the graph on the rayon pool.
    pub parallel: bool,
    /// Treat computed (storage-less) properties as data members.
    pub computed_properties: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            computed_properties: false,
        }
    }
}

pub struct CycleAnalysis<'m> {
    model: &'m SymbolModel,
    graph: TypeGraph,
    components: Components,
}

impl<'m> CycleAnalysis<'m> {
    pub fn run(model: &'m SymbolModel, options: AnalysisOptions) -> Self {
        let _span = debug_span!("cycle_analysis", compilation = model.compilation()).entered();

        let graph = GraphBuilder::new(model)
            .with_collector(MemberCollector::new(options.computed_properties))
            .parallel(options.parallel)
            .build();
        let components = Components::compute(&graph);

        debug!(
            types = graph.nodes().len(),
            edges = graph.edges().len(),
            components = components.len(),
            cyclic = components.cyclic_count(),
            "type graph analyzed"
        );

        Self {
            model,
            graph,
            components,
        }
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn findings(&self) -> Vec<CycleFinding> {
        find_cycle_members(self.model, &self.graph, &self.components)
    }
}

pub fn find_reference_cycles(model: &SymbolModel, options: AnalysisOptions) -> Vec<CycleFinding> {
    CycleAnalysis::run(model, options).findings()
}
