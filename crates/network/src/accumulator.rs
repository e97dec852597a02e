use normalizer::EventRecord;
use serde::Serialize;
use tracing::{info, warn};

use crate::graph::{EdgeKind, EntityId, HeterogeneousGraph, NodeAttrs, NodeKey};
use crate::identity::IdentityTables;
use crate::metrics;
use crate::references::{extract_references, normalize_repo_ref};
use crate::weights::{contribution_weight, MENTION_WEIGHT, REPO_REFERENCE_WEIGHT};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccumulationReport {
    pub events: u64,
    pub contribution_edges: usize,
    pub mention_edges: usize,
    pub repo_reference_edges: usize,
    pub zero_weight_events: u64,
    pub unresolved_contributions: u64,
    pub unresolved_mentions: u64,
    pub unresolved_repo_refs: u64,
    pub self_mentions: u64,
    pub self_references: u64,
    pub merged_nodes: Vec<NodeKey>,
}

pub struct EdgeAccumulator<'a> {
    tables: &'a IdentityTables,
    graph: HeterogeneousGraph<EntityId>,
    report: AccumulationReport,
}

impl<'a> EdgeAccumulator<'a> {
    pub fn new(tables: &'a IdentityTables) -> Self {
        let mut graph = HeterogeneousGraph::new();
        for actor in tables.actors() {
            graph.add_node(
                EntityId::Actor(actor.id),
                NodeAttrs::Actor {
                    login: actor.login.clone(),
                },
            );
        }
        for repo in tables.repos() {
            graph.add_node(
                EntityId::Repo(repo.id),
                NodeAttrs::Repo {
                    name: repo.name.clone(),
                    org_id: repo.org_id,
                    org_login: repo.org_login.clone(),
                },
            );
        }
        Self {
            tables,
            graph,
            report: AccumulationReport::default(),
        }
    }

    pub fn observe(&mut self, event: &EventRecord) {
        self.report.events += 1;
        let author = EntityId::Actor(event.actor_id);
        let authoring_repo = EntityId::Repo(event.repo_id);

        let weight = contribution_weight(
            &event.event_type,
            event.action.as_deref(),
            event.pull_merged,
        );
        if weight == 0 {
            self.report.zero_weight_events += 1;
        } else {
            match self
                .graph
                .accumulate(&author, &authoring_repo, EdgeKind::Contribution, weight)
            {
                Some(created) => record_created(EdgeKind::Contribution, created),
                None => {
                    self.report.unresolved_contributions += 1;
                    record_dropped(EdgeKind::Contribution, "unresolved");
                }
            }
        }

        let references = extract_references(event.body.as_deref());

        for handle in &references.mentions {
            let Some(mentioned) = self.tables.actor_id_for_login(handle) else {
                self.report.unresolved_mentions += 1;
                record_dropped(EdgeKind::Mention, "unresolved");
                continue;
            };
            if mentioned == event.actor_id {
                self.report.self_mentions += 1;
                record_dropped(EdgeKind::Mention, "self");
                continue;
            }
            match self.graph.accumulate(
                &author,
                &EntityId::Actor(mentioned),
                EdgeKind::Mention,
                MENTION_WEIGHT,
            ) {
                Some(created) => record_created(EdgeKind::Mention, created),
                None => {
                    self.report.unresolved_mentions += 1;
                    record_dropped(EdgeKind::Mention, "unresolved");
                }
            }
        }

        for reference in &references.repo_refs {
            let name = normalize_repo_ref(reference);
            let Some(referenced) = self.tables.repo_id_for_name(&name) else {
                self.report.unresolved_repo_refs += 1;
                record_dropped(EdgeKind::RepoReference, "unresolved");
                continue;
            };
            if referenced == event.repo_id {
                self.report.self_references += 1;
                record_dropped(EdgeKind::RepoReference, "self");
                continue;
            }
            match self.graph.accumulate(
                &authoring_repo,
                &EntityId::Repo(referenced),
                EdgeKind::RepoReference,
                REPO_REFERENCE_WEIGHT,
            ) {
                Some(created) => record_created(EdgeKind::RepoReference, created),
                None => {
                    self.report.unresolved_repo_refs += 1;
                    record_dropped(EdgeKind::RepoReference, "unresolved");
                }
            }
        }
    }

    pub fn observe_chunk(&mut self, events: &[EventRecord]) {
        for event in events {
            self.observe(event);
        }
    }

    pub fn finish(self) -> (HeterogeneousGraph, AccumulationReport) {
        let mut report = self.report;
        let (graph, merged) = self.graph.rekey();
        if !merged.is_empty() {
            warn!(
                merged = merged.len(),
                "distinct ids shared a display name; their nodes were merged"
            );
        }
        report.merged_nodes = merged;
        report.contribution_edges = graph.edge_count_of(EdgeKind::Contribution);
        report.mention_edges = graph.edge_count_of(EdgeKind::Mention);
        report.repo_reference_edges = graph.edge_count_of(EdgeKind::RepoReference);

        info!(
            events = report.events,
            contribution = report.contribution_edges,
            mention = report.mention_edges,
            repo_reference = report.repo_reference_edges,
            unresolved_mentions = report.unresolved_mentions,
            unresolved_repo_refs = report.unresolved_repo_refs,
            "edges accumulated"
        );
        (graph, report)
    }
}

fn record_created(kind: EdgeKind, created: bool) {
    if created {
        metrics::EDGES_CREATED_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc();
    }
}

fn record_dropped(kind: EdgeKind, reason: &str) {
    metrics::REFERENCES_DROPPED_TOTAL
        .with_label_values(&[kind.as_str(), reason])
        .inc();
}
