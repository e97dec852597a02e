use std::hash::Hash;

use serde::Serialize;
use tracing::info;

use crate::graph::{EdgeKind, HeterogeneousGraph};
use crate::homogeneous::HomogeneousGraph;
use crate::metrics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrimReport {
    pub considered_edges: usize,
    pub removed_edges: usize,
    pub removed_nodes: usize,
}

impl TrimReport {
    pub fn is_noop(&self) -> bool {
        self.removed_edges == 0 && self.removed_nodes == 0
    }
}

pub fn trim<K: Clone + Eq + Hash>(
    mut graph: HeterogeneousGraph<K>,
    kind: EdgeKind,
    max_edges: usize,
) -> (HeterogeneousGraph<K>, TrimReport) {
    let mut candidates = graph.edges_of_kind(kind);
    let mut report = TrimReport {
        considered_edges: candidates.len(),
        ..TrimReport::default()
    };
    if candidates.len() <= max_edges {
        return (graph, report);
    }

    // stable sort: ties stay in insertion order
    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    let dropped = candidates.split_off(max_edges);
    report.removed_edges = graph.remove_edges(dropped.into_iter().map(|(idx, _)| idx));
    report.removed_nodes = graph.remove_isolated_nodes().len();

    record("trim", &report);
    info!(
        kind = %kind,
        kept = max_edges,
        removed_edges = report.removed_edges,
        removed_nodes = report.removed_nodes,
        "graph trimmed"
    );
    (graph, report)
}

/// Removes edges lighter than the weight at zero-based rank `max_rank`; ties survive.
pub fn filter_top_edges(
    mut graph: HomogeneousGraph,
    max_rank: usize,
) -> (HomogeneousGraph, TrimReport) {
    let edges = graph.weighted_edges();
    let mut report = TrimReport {
        considered_edges: edges.len(),
        ..TrimReport::default()
    };

    let mut weights: Vec<f64> = edges.iter().map(|(_, weight)| *weight).collect();
    weights.sort_by(|a, b| b.total_cmp(a));
    let Some(threshold) = weights.get(max_rank).copied() else {
        return (graph, report);
    };

    let dropped = edges
        .into_iter()
        .filter(|(_, weight)| *weight < threshold)
        .map(|(idx, _)| idx);
    report.removed_edges = graph.remove_edges(dropped);
    report.removed_nodes = graph.remove_isolated_nodes();

    record(graph.kind().as_str(), &report);
    info!(
        graph = %graph.kind(),
        threshold,
        removed_edges = report.removed_edges,
        remaining = graph.edge_count(),
        "filtered to top edges"
    );
    (graph, report)
}

fn record(stage: &str, report: &TrimReport) {
    metrics::EDGES_REMOVED_TOTAL
        .with_label_values(&[stage])
        .inc_by(report.removed_edges as u64);
    metrics::NODES_REMOVED_TOTAL
        .with_label_values(&[stage])
        .inc_by(report.removed_nodes as u64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeAttrs, NodeKey};
    use crate::homogeneous::ProjectionKind;

    fn star(weights: &[u64]) -> HeterogeneousGraph {
        let mut graph = HeterogeneousGraph::new();
        let hub = NodeKey::repo("org/hub");
        graph.add_node(
            hub.clone(),
            NodeAttrs::Repo {
                name: "org/hub".into(),
                org_id: None,
                org_login: None,
            },
        );
        for (i, weight) in weights.iter().enumerate() {
            let login = format!("user{i}");
            let key = NodeKey::actor(login.clone());
            graph.add_node(key.clone(), NodeAttrs::Actor { login });
            graph.accumulate(&key, &hub, EdgeKind::Contribution, *weight);
        }
        graph
    }

    fn weights_of(graph: &HeterogeneousGraph) -> Vec<(String, u64)> {
        graph
            .edges()
            .map(|edge| (edge.source.to_string(), edge.weight))
            .collect()
    }

    #[test]
    fn keeps_heaviest_edges_and_drops_orphans() {
        let (graph, report) = trim(star(&[1, 5, 3, 4]), EdgeKind::Contribution, 2);
        assert_eq!(
            weights_of(&graph),
            vec![("user1".to_string(), 5), ("user3".to_string(), 4)]
        );
        assert_eq!(report.removed_edges, 2);
        assert_eq!(report.removed_nodes, 2);
        assert!(!graph.contains(&NodeKey::actor("user0")));
    }

    #[test]
    fn ties_keep_insertion_order() {
        let (graph, _) = trim(star(&[2, 2, 2]), EdgeKind::Contribution, 2);
        assert_eq!(
            weights_of(&graph),
            vec![("user0".to_string(), 2), ("user1".to_string(), 2)]
        );
    }

    #[test]
    fn other_kinds_are_not_counted_or_removed() {
        let mut graph = star(&[1, 9]);
        graph.accumulate(
            &NodeKey::actor("user0"),
            &NodeKey::actor("user1"),
            EdgeKind::Mention,
            2,
        );
        let (graph, report) = trim(graph, EdgeKind::Contribution, 1);
        assert_eq!(report.considered_edges, 2);
        assert_eq!(report.removed_edges, 1);
        // user0 keeps its mention edge and therefore stays
        assert_eq!(report.removed_nodes, 0);
        assert_eq!(graph.edge_count_of(EdgeKind::Mention), 1);
    }

    #[test]
    fn under_cap_is_a_noop() {
        let (graph, report) = trim(star(&[1, 2]), EdgeKind::Contribution, 2);
        assert!(report.is_noop());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn trimming_twice_matches_trimming_once() {
        let (once, _) = trim(star(&[3, 1, 4, 1, 5, 9, 2, 6]), EdgeKind::Contribution, 4);
        let snapshot = weights_of(&once);
        let (twice, report) = trim(once, EdgeKind::Contribution, 4);
        assert!(report.is_noop());
        assert_eq!(weights_of(&twice), snapshot);
    }

    fn chain(weights: &[f64]) -> HomogeneousGraph {
        let mut graph = HomogeneousGraph::new(ProjectionKind::ActorActor);
        for (i, weight) in weights.iter().enumerate() {
            graph.accumulate(&format!("a{i}"), &format!("b{i}"), *weight);
        }
        graph
    }

    #[test]
    fn filter_drops_edges_below_rank_threshold() {
        let (graph, report) = filter_top_edges(chain(&[0.5, 0.1, 0.9, 0.3]), 2);
        // threshold is the third-heaviest weight, 0.3
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(report.removed_edges, 1);
        assert_eq!(report.removed_nodes, 2);
        assert!(!graph.contains("a1"));
    }

    #[test]
    fn filter_keeps_ties_at_the_threshold() {
        let (graph, _) = filter_top_edges(chain(&[1.0, 1.0, 1.0, 0.5]), 1);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn filter_with_rank_beyond_edge_count_is_a_noop() {
        let (graph, report) = filter_top_edges(chain(&[0.5, 0.1]), 2);
        assert!(report.is_noop());
        assert_eq!(graph.edge_count(), 2);
        let (graph, report) = filter_top_edges(graph, 10);
        assert!(report.is_noop());
        assert_eq!(graph.edge_count(), 2);
        let (empty, report) = filter_top_edges(HomogeneousGraph::new(ProjectionKind::RepoRepo), 0);
        assert!(report.is_noop());
        assert_eq!(empty.node_count(), 0);
    }
}
