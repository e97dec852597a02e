use std::collections::HashMap;
use std::fmt;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    RepoRepo,
    ActorActor,
}

impl ProjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionKind::RepoRepo => "repo_repo",
            ProjectionKind::ActorActor => "actor_actor",
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomogeneousEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub weight: f64,
    pub kind: ProjectionKind,
}

#[derive(Debug, Clone)]
pub struct HomogeneousGraph {
    kind: ProjectionKind,
    graph: StableUnGraph<String, f64>,
    index: HashMap<String, NodeIndex>,
}

impl HomogeneousGraph {
    pub fn new(kind: ProjectionKind) -> Self {
        Self {
            kind,
            graph: StableUnGraph::default(),
            index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn accumulate(&mut self, a: &str, b: &str, weight: f64) {
        let a = self.ensure_node(a);
        let b = self.ensure_node(b);
        match self.graph.find_edge(a, b) {
            Some(existing) => self.graph[existing] += weight,
            None => {
                self.graph.add_edge(a, b, weight);
            }
        }
    }

    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge).copied())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| self.graph[idx].as_str())
    }

    pub fn edges(&self) -> impl Iterator<Item = HomogeneousEdge<'_>> + '_ {
        self.graph.edge_indices().filter_map(move |idx| {
            let (source, target) = self.graph.edge_endpoints(idx)?;
            Some(HomogeneousEdge {
                source: self.graph[source].as_str(),
                target: self.graph[target].as_str(),
                weight: self.graph[idx],
                kind: self.kind,
            })
        })
    }

    pub(crate) fn weighted_edges(&self) -> Vec<(EdgeIndex, f64)> {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx).map(|weight| (idx, *weight)))
            .collect()
    }

    pub(crate) fn remove_edges(&mut self, edges: impl IntoIterator<Item = EdgeIndex>) -> usize {
        edges
            .into_iter()
            .filter(|idx| self.graph.remove_edge(*idx).is_some())
            .count()
    }

    pub(crate) fn remove_isolated_nodes(&mut self) -> usize {
        let isolated: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| self.graph.neighbors(*idx).next().is_none())
            .collect();
        for idx in &isolated {
            if let Some(name) = self.graph.remove_node(*idx) {
                self.index.remove(&name);
            }
        }
        isolated.len()
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }
}
