use std::collections::hash_map::Entry;
use std::collections::HashMap;

use common::GraphConfig;
use serde::Serialize;
use tracing::info;

use crate::graph::{EdgeKind, HeterogeneousGraph};
use crate::homogeneous::{HomogeneousGraph, ProjectionKind};
use crate::trim::{filter_top_edges, TrimReport};

/// Damped harmonic mean: `ratio * n / sum(1 / w)`. A single weight yields `ratio`.
pub fn harmonic_mean(weights: &[f64], ratio: f64) -> f64 {
    match weights {
        [] => 0.0,
        [_] => ratio,
        _ => {
            let reciprocal_sum: f64 = weights.iter().map(|weight| 1.0 / weight).sum();
            ratio * weights.len() as f64 / reciprocal_sum
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionReport {
    pub contributors: usize,
    pub direct_reference_edges: usize,
    pub direct_mention_edges: usize,
    pub shared_repo_pairs: usize,
    pub shared_actor_pairs: usize,
    pub repo_repo_nodes: usize,
    pub repo_repo_edges: usize,
    pub actor_actor_nodes: usize,
    pub actor_actor_edges: usize,
    pub repo_repo_trim: Option<TrimReport>,
    pub actor_actor_trim: TrimReport,
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub repo_repo: HomogeneousGraph,
    pub actor_actor: HomogeneousGraph,
    pub report: ProjectionReport,
}

pub fn project(graph: &HeterogeneousGraph, config: &GraphConfig) -> Projection {
    let ratio = config.harmonic_ratio;
    let mut report = ProjectionReport::default();
    let mut repo_repo = HomogeneousGraph::new(ProjectionKind::RepoRepo);
    let mut actor_actor = HomogeneousGraph::new(ProjectionKind::ActorActor);

    let mut actors = Interner::default();
    let mut repos = Interner::default();
    // actor ordinal -> [(repo ordinal, weight)]
    let mut actor_repos: Vec<Vec<(usize, f64)>> = Vec::new();
    // repo ordinal -> [(actor ordinal, weight)]
    let mut repo_actors: Vec<Vec<(usize, f64)>> = Vec::new();
    let mut mentions: Vec<(&str, &str, f64)> = Vec::new();

    for edge in graph.edges() {
        let weight = edge.weight as f64;
        match edge.kind {
            EdgeKind::Contribution => {
                let actor = actors.intern(edge.source.name());
                let repo = repos.intern(edge.target.name());
                if actor == actor_repos.len() {
                    actor_repos.push(Vec::new());
                }
                if repo == repo_actors.len() {
                    repo_actors.push(Vec::new());
                }
                actor_repos[actor].push((repo, weight));
                repo_actors[repo].push((actor, weight));
            }
            EdgeKind::RepoReference => {
                report.direct_reference_edges += 1;
                repo_repo.accumulate(edge.source.name(), edge.target.name(), weight);
            }
            EdgeKind::Mention => {
                report.direct_mention_edges += 1;
                mentions.push((edge.source.name(), edge.target.name(), weight));
            }
        }
    }
    report.contributors = actor_repos.len();

    for contributed in &actor_repos {
        for (i, &(first, w1)) in contributed.iter().enumerate() {
            for &(second, w2) in &contributed[i + 1..] {
                let weight = harmonic_mean(&[w1, w2], ratio);
                if weight > 0.0 {
                    report.shared_repo_pairs += 1;
                    repo_repo.accumulate(repos.name(first), repos.name(second), weight);
                }
            }
        }
    }

    let mut pair_weights: HashMap<(usize, usize), f64> = HashMap::new();
    let mut pair_order: Vec<(usize, usize)> = Vec::new();
    for contributors in &repo_actors {
        for (i, &(a, w1)) in contributors.iter().enumerate() {
            for &(b, w2) in &contributors[i + 1..] {
                let pair = if a < b { (a, b) } else { (b, a) };
                let weight = harmonic_mean(&[w1, w2], ratio);
                match pair_weights.entry(pair) {
                    Entry::Occupied(mut slot) => *slot.get_mut() += weight,
                    Entry::Vacant(slot) => {
                        pair_order.push(pair);
                        slot.insert(weight);
                    }
                }
            }
        }
    }
    report.shared_actor_pairs = pair_order.len();
    for pair in pair_order {
        let weight = pair_weights.get(&pair).copied().unwrap_or(0.0);
        if weight > 0.0 {
            actor_actor.accumulate(actors.name(pair.0), actors.name(pair.1), weight);
        }
    }
    for (source, target, weight) in mentions {
        actor_actor.accumulate(source, target, weight);
    }

    if let Some(cap) = config.max_repo_repo_edges {
        let (trimmed, trim) = filter_top_edges(repo_repo, cap);
        repo_repo = trimmed;
        report.repo_repo_trim = Some(trim);
    }
    let (actor_actor, trim) = filter_top_edges(actor_actor, config.max_actor_actor_edges);
    report.actor_actor_trim = trim;

    report.repo_repo_nodes = repo_repo.node_count();
    report.repo_repo_edges = repo_repo.edge_count();
    report.actor_actor_nodes = actor_actor.node_count();
    report.actor_actor_edges = actor_actor.edge_count();
    info!(
        repo_repo_edges = report.repo_repo_edges,
        actor_actor_edges = report.actor_actor_edges,
        shared_actor_pairs = report.shared_actor_pairs,
        "homogeneous projections built"
    );

    Projection {
        repo_repo,
        actor_actor,
        report,
    }
}

#[derive(Default)]
struct Interner<'a> {
    ids: HashMap<&'a str, usize>,
    names: Vec<&'a str>,
}

impl<'a> Interner<'a> {
    fn intern(&mut self, name: &'a str) -> usize {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.names.len();
        self.ids.insert(name, id);
        self.names.push(name);
        id
    }

    fn name(&self, id: usize) -> &'a str {
        self.names[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeAttrs, NodeKey};

    const EPS: f64 = 1e-12;

    fn hetero(contributions: &[(&str, &str, u64)]) -> HeterogeneousGraph {
        let mut graph = HeterogeneousGraph::new();
        for (login, repo, weight) in contributions {
            graph.add_node(
                NodeKey::actor(*login),
                NodeAttrs::Actor {
                    login: login.to_string(),
                },
            );
            graph.add_node(
                NodeKey::repo(*repo),
                NodeAttrs::Repo {
                    name: repo.to_string(),
                    org_id: None,
                    org_login: None,
                },
            );
            graph.accumulate(
                &NodeKey::actor(*login),
                &NodeKey::repo(*repo),
                EdgeKind::Contribution,
                *weight,
            );
        }
        graph
    }

    #[test]
    fn harmonic_mean_edge_cases() {
        assert_eq!(harmonic_mean(&[], 0.01), 0.0);
        assert_eq!(harmonic_mean(&[7.0], 0.01), 0.01);
        assert!((harmonic_mean(&[4.0, 4.0], 0.01) - 0.04).abs() < EPS);
        // favors balanced pairs over skewed ones with the same total
        assert!(harmonic_mean(&[4.0, 4.0], 1.0) > harmonic_mean(&[1.0, 7.0], 1.0));
    }

    #[test]
    fn harmonic_mean_grows_with_ratio() {
        let weights = [2.0, 5.0];
        let mut previous = 0.0;
        for ratio in [0.0, 0.01, 0.1, 1.0, 10.0] {
            let value = harmonic_mean(&weights, ratio);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn shared_contributors_link_repos() {
        let graph = hetero(&[("alice", "org/a", 4), ("alice", "org/b", 1), ("bob", "org/b", 2)]);
        let projection = project(&graph, &GraphConfig::default());

        let expected = 0.01 * 2.0 / (1.0 / 4.0 + 1.0 / 1.0);
        let weight = projection.repo_repo.edge_weight("org/a", "org/b").unwrap();
        assert!((weight - expected).abs() < EPS);
        assert_eq!(projection.repo_repo.edge_count(), 1);

        let expected = 0.01 * 2.0 / (1.0 / 1.0 + 1.0 / 2.0);
        let weight = projection.actor_actor.edge_weight("alice", "bob").unwrap();
        assert!((weight - expected).abs() < EPS);
    }

    #[test]
    fn actor_pairs_sum_over_every_shared_repo() {
        let graph = hetero(&[
            ("alice", "org/a", 2),
            ("bob", "org/a", 2),
            ("alice", "org/b", 3),
            ("bob", "org/b", 6),
            ("carol", "org/c", 1),
        ]);
        let projection = project(&graph, &GraphConfig::default());
        let expected = harmonic_mean(&[2.0, 2.0], 0.01) + harmonic_mean(&[3.0, 6.0], 0.01);
        let weight = projection.actor_actor.edge_weight("bob", "alice").unwrap();
        assert!((weight - expected).abs() < EPS);
        assert_eq!(projection.actor_actor.edge_count(), 1);
        assert!(!projection.actor_actor.contains("carol"));
        assert_eq!(projection.report.shared_actor_pairs, 1);
    }

    #[test]
    fn direct_links_carry_over_in_both_directions() {
        let mut graph = hetero(&[("alice", "org/a", 1), ("bob", "org/b", 1)]);
        let (a, b) = (NodeKey::repo("org/a"), NodeKey::repo("org/b"));
        graph.accumulate(&a, &b, EdgeKind::RepoReference, 3);
        graph.accumulate(&b, &a, EdgeKind::RepoReference, 6);
        let (alice, bob) = (NodeKey::actor("alice"), NodeKey::actor("bob"));
        graph.accumulate(&alice, &bob, EdgeKind::Mention, 2);

        let projection = project(&graph, &GraphConfig::default());
        assert_eq!(projection.repo_repo.edge_weight("org/b", "org/a"), Some(9.0));
        assert_eq!(projection.actor_actor.edge_weight("bob", "alice"), Some(2.0));
        assert_eq!(projection.report.direct_reference_edges, 2);
        assert_eq!(projection.report.direct_mention_edges, 1);
    }

    #[test]
    fn zero_ratio_creates_no_derived_edges() {
        let graph = hetero(&[("alice", "org/a", 1), ("bob", "org/a", 1), ("alice", "org/b", 1)]);
        let config = GraphConfig {
            harmonic_ratio: 0.0,
            ..GraphConfig::default()
        };
        let projection = project(&graph, &config);
        assert_eq!(projection.actor_actor.edge_count(), 0);
        assert_eq!(projection.repo_repo.edge_count(), 0);
    }

    #[test]
    fn actor_edge_cap_applies_rank_filter() {
        let graph = hetero(&[
            ("a", "org/x", 9),
            ("b", "org/x", 9),
            ("c", "org/y", 1),
            ("d", "org/y", 1),
        ]);
        let config = GraphConfig {
            max_actor_actor_edges: 0,
            ..GraphConfig::default()
        };
        let projection = project(&graph, &config);
        assert_eq!(projection.actor_actor.edge_count(), 1);
        assert!(projection.actor_actor.edge_weight("a", "b").is_some());
        assert_eq!(projection.report.actor_actor_trim.removed_edges, 1);
    }

    #[test]
    fn empty_graph_projects_to_empty_graphs() {
        let projection = project(&HeterogeneousGraph::new(), &GraphConfig::default());
        assert_eq!(projection.repo_repo.node_count(), 0);
        assert_eq!(projection.actor_actor.node_count(), 0);
    }
}
