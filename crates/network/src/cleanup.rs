use std::collections::HashMap;
use std::hash::Hash;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::NodeIndexable;
use serde::Serialize;
use tracing::{debug, info};

use crate::graph::{Edge, HeterogeneousGraph, Node, NodeKey};
use crate::metrics;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub components: usize,
    pub removed_nodes: Vec<NodeKey>,
    pub self_loops: Vec<NodeKey>,
}

/// Ties between equally large components go to the first in node order.
pub fn clean(mut graph: HeterogeneousGraph) -> (HeterogeneousGraph, CleanupReport) {
    let mut report = CleanupReport::default();
    if graph.is_empty() {
        return (graph, report);
    }

    let components = weak_components(graph.inner());
    report.components = components.len();
    if components.len() > 1 {
        let mut largest = 0;
        for (i, component) in components.iter().enumerate() {
            if component.len() > components[largest].len() {
                largest = i;
            }
        }
        let outside: Vec<NodeIndex> = components
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != largest)
            .flat_map(|(_, component)| component)
            .collect();
        report.removed_nodes = graph.remove_nodes(outside);
        for node in &report.removed_nodes {
            debug!(node = %node, "removing node outside the largest component");
        }
        metrics::NODES_REMOVED_TOTAL
            .with_label_values(&["cleanup"])
            .inc_by(report.removed_nodes.len() as u64);
        info!(
            components = report.components,
            removed_nodes = report.removed_nodes.len(),
            "restricted graph to largest weak component"
        );
    }

    let loops = graph.self_loops();
    if !loops.is_empty() {
        report.self_loops = loops
            .iter()
            .filter_map(|idx| graph.inner().edge_endpoints(*idx))
            .filter_map(|(node, _)| graph.key_of(node).cloned())
            .collect();
        for node in &report.self_loops {
            debug!(node = %node, "removing self-loop");
        }
        let removed = graph.remove_edges(loops);
        metrics::EDGES_REMOVED_TOTAL
            .with_label_values(&["cleanup"])
            .inc_by(removed as u64);
        info!(removed, "removed self-loop edges");
    }

    (graph, report)
}

pub(crate) fn weak_components<K>(graph: &StableDiGraph<Node<K>, Edge>) -> Vec<Vec<NodeIndex>> {
    let mut sets = UnionFind::<usize>::new(graph.node_bound());
    for edge in graph.edge_indices() {
        if let Some((source, target)) = graph.edge_endpoints(edge) {
            sets.union(source.index(), target.index());
        }
    }

    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();
    for node in graph.node_indices() {
        let slot = *slots.entry(sets.find(node.index())).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(node);
    }
    components
}

pub fn component_count<K: Clone + Eq + Hash>(graph: &HeterogeneousGraph<K>) -> usize {
    weak_components(graph.inner()).len()
}
