use super::{ArcLabel, Network};
use crate::ids::NodeId;
use petgraph::algo::is_cyclic_directed;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt::{Debug, Display};

/// petgraph view of a [`Network`], for callers that want graph algorithms
/// the core does not run itself.
pub struct NetworkDag<N, T> {
    pub graph: DiGraph<N, ArcLabel<T>>,
    pub id_to_index: HashMap<N, NodeIndex>,
}

impl<N: NodeId, T: Clone> NetworkDag<N, T> {
    pub fn build(network: &Network<N, T>) -> Self {
        let mut graph = DiGraph::new();
        let mut id_to_index = HashMap::new();

        // Add nodes first
        for &event in network.events() {
            let node_ix = graph.add_node(event);
            id_to_index.insert(event, node_ix);
        }

        // Add edges: arcs whose endpoints left the chain are skipped
        for (from, to, label) in network.arcs() {
            if let (Some(&u), Some(&v)) = (id_to_index.get(&from), id_to_index.get(&to)) {
                graph.add_edge(u, v, label.clone());
            }
        }

        Self { graph, id_to_index }
    }

    /// The critical path search does not terminate on a cyclic network.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }
}

impl<N: NodeId + Display, T: Clone + Debug + Display> NetworkDag<N, T> {
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, edge| match edge.weight() {
                ArcLabel::Task(id) => format!("label = \"{id}\""),
                ArcLabel::Empty => "style = dashed".to_string(),
            },
            &|_, (_, event)| format!("label = \"{event}\""),
        );
        format!("{dot:?}")
    }
}
