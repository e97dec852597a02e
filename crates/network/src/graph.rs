use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Contribution,
    Mention,
    RepoReference,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contribution => "contribution",
            EdgeKind::Mention => "mention",
            EdgeKind::RepoReference => "repo_reference",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Actor(i64),
    Repo(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum NodeKey {
    Actor(String),
    Repo(String),
}

impl NodeKey {
    pub fn actor(login: impl Into<String>) -> Self {
        NodeKey::Actor(login.into())
    }

    pub fn repo(name: impl Into<String>) -> Self {
        NodeKey::Repo(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            NodeKey::Actor(name) | NodeKey::Repo(name) => name,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeAttrs {
    Actor {
        login: String,
    },
    Repo {
        name: String,
        org_id: Option<i64>,
        org_login: Option<String>,
    },
}

impl NodeAttrs {
    pub fn display_key(&self) -> NodeKey {
        match self {
            NodeAttrs::Actor { login } => NodeKey::Actor(login.clone()),
            NodeAttrs::Repo { name, .. } => NodeKey::Repo(name.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node<K> {
    pub key: K,
    pub attrs: NodeAttrs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub kind: EdgeKind,
    pub weight: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeView<'a, K> {
    pub source: &'a K,
    pub target: &'a K,
    pub kind: EdgeKind,
    pub weight: u64,
}

#[derive(Debug, Clone)]
pub struct HeterogeneousGraph<K = NodeKey> {
    graph: StableDiGraph<Node<K>, Edge>,
    index: HashMap<K, NodeIndex>,
}

impl<K: Clone + Eq + Hash> Default for HeterogeneousGraph<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> HeterogeneousGraph<K> {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            index: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, key: K, attrs: NodeAttrs) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let idx = self.graph.add_node(Node {
            key: key.clone(),
            attrs,
        });
        self.index.insert(key, idx);
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn attrs(&self, key: &K) -> Option<&NodeAttrs> {
        self.index.get(key).map(|idx| &self.graph[*idx].attrs)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edge_count_of(&self, kind: EdgeKind) -> usize {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
            .filter(|edge| edge.kind == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// `None` when either endpoint is unknown, otherwise whether the edge is new.
    pub fn accumulate(
        &mut self,
        source: &K,
        target: &K,
        kind: EdgeKind,
        weight: u64,
    ) -> Option<bool> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        match self.find_edge(from, to, kind) {
            Some(existing) => {
                self.graph[existing].weight += weight;
                Some(false)
            }
            None => {
                self.graph.add_edge(from, to, Edge { kind, weight });
                Some(true)
            }
        }
    }

    pub fn edge_weight(&self, source: &K, target: &K, kind: EdgeKind) -> Option<u64> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        self.find_edge(from, to, kind)
            .map(|edge| self.graph[edge].weight)
    }

    pub fn degree(&self, key: &K) -> usize {
        self.index
            .get(key)
            .map(|idx| {
                self.graph.edges_directed(*idx, Direction::Outgoing).count()
                    + self.graph.edges_directed(*idx, Direction::Incoming).count()
            })
            .unwrap_or(0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&K, &NodeAttrs)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (&self.graph[idx].key, &self.graph[idx].attrs))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_, K>> + '_ {
        self.graph.edge_indices().filter_map(move |idx| {
            let (source, target) = self.graph.edge_endpoints(idx)?;
            let edge = self.graph[idx];
            Some(EdgeView {
                source: &self.graph[source].key,
                target: &self.graph[target].key,
                kind: edge.kind,
                weight: edge.weight,
            })
        })
    }

    pub(crate) fn inner(&self) -> &StableDiGraph<Node<K>, Edge> {
        &self.graph
    }

    pub(crate) fn key_of(&self, idx: NodeIndex) -> Option<&K> {
        self.graph.node_weight(idx).map(|node| &node.key)
    }

    pub(crate) fn edges_of_kind(&self, kind: EdgeKind) -> Vec<(EdgeIndex, u64)> {
        self.graph
            .edge_indices()
            .filter_map(|idx| {
                let edge = self.graph.edge_weight(idx)?;
                (edge.kind == kind).then_some((idx, edge.weight))
            })
            .collect()
    }

    pub(crate) fn self_loops(&self) -> Vec<EdgeIndex> {
        self.graph
            .edge_indices()
            .filter(|idx| {
                self.graph
                    .edge_endpoints(*idx)
                    .map_or(false, |(source, target)| source == target)
            })
            .collect()
    }

    pub(crate) fn remove_edges(&mut self, edges: impl IntoIterator<Item = EdgeIndex>) -> usize {
        edges
            .into_iter()
            .filter(|idx| self.graph.remove_edge(*idx).is_some())
            .count()
    }

    pub(crate) fn remove_nodes(&mut self, nodes: impl IntoIterator<Item = NodeIndex>) -> Vec<K> {
        let mut removed = Vec::new();
        for idx in nodes {
            if let Some(node) = self.graph.remove_node(idx) {
                self.index.remove(&node.key);
                removed.push(node.key);
            }
        }
        removed
    }

    pub(crate) fn remove_isolated_nodes(&mut self) -> Vec<K> {
        let isolated: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| self.graph.neighbors_undirected(*idx).next().is_none())
            .collect();
        self.remove_nodes(isolated)
    }

    /// Ids sharing a display name collapse into one node with summed edge weights.
    pub fn rekey(self) -> (HeterogeneousGraph<NodeKey>, Vec<NodeKey>) {
        let mut rekeyed = HeterogeneousGraph::new();
        let mut merged = Vec::new();
        let mut mapping: HashMap<NodeIndex, NodeKey> = HashMap::with_capacity(self.index.len());

        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let key = node.attrs.display_key();
            if !rekeyed.add_node(key.clone(), node.attrs.clone()) {
                merged.push(key.clone());
            }
            mapping.insert(idx, key);
        }

        for idx in self.graph.edge_indices() {
            let Some((source, target)) = self.graph.edge_endpoints(idx) else {
                continue;
            };
            if let (Some(source), Some(target)) = (mapping.get(&source), mapping.get(&target)) {
                let edge = self.graph[idx];
                rekeyed.accumulate(source, target, edge.kind, edge.weight);
            }
        }

        (rekeyed, merged)
    }

    fn find_edge(&self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) -> Option<EdgeIndex> {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .find(|edge| edge.target() == to && edge.weight().kind == kind)
            .map(|edge| edge.id())
    }
}
