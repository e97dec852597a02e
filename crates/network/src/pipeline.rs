use common::{GraphConfig, Result};
use normalizer::{normalize_event, EventRecord, EventSource};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::accumulator::{AccumulationReport, EdgeAccumulator};
use crate::cleanup::{clean, CleanupReport};
use crate::graph::{EdgeKind, HeterogeneousGraph};
use crate::homogeneous::HomogeneousGraph;
use crate::identity::{IdentityResolver, IdentityTables};
use crate::metrics;
use crate::projection::{project, Projection, ProjectionReport};
use crate::trim::{trim, TrimReport};

const DEFAULT_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub records: u64,
    pub malformed: u64,
    pub chunks: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub trim: TrimReport,
    pub cleanup: CleanupReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub identity_pass: IngestStats,
    pub edge_pass: IngestStats,
    pub actors: usize,
    pub repos: usize,
    pub ambiguous_logins: usize,
    pub ambiguous_repo_names: usize,
    pub accumulation: AccumulationReport,
    pub sanitize: SanitizeReport,
    pub heterogeneous_nodes: usize,
    pub heterogeneous_edges: usize,
    pub projection: ProjectionReport,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub heterogeneous: HeterogeneousGraph,
    pub repo_repo: HomogeneousGraph,
    pub actor_actor: HomogeneousGraph,
    pub report: PipelineReport,
}

#[derive(Debug, Clone)]
pub struct GraphPipeline {
    config: GraphConfig,
    chunk_size: usize,
}

impl GraphPipeline {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[instrument(skip_all)]
    pub fn resolve_identities<S: EventSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(IdentityTables, IngestStats)> {
        let _timer = metrics::STAGE_DURATION
            .with_label_values(&["identity"])
            .start_timer();
        let mut resolver = IdentityResolver::new();
        let stats = self.scan_chunks(source, "identity", |chunk| resolver.observe_chunk(chunk))?;
        let tables = resolver.finish();
        info!(
            actors = tables.actor_count(),
            repos = tables.repo_count(),
            records = stats.records,
            malformed = stats.malformed,
            "identities resolved"
        );
        Ok((tables, stats))
    }

    #[instrument(skip_all)]
    pub fn build_heterogeneous<S: EventSource + ?Sized>(
        &self,
        source: &S,
        tables: &IdentityTables,
    ) -> Result<(HeterogeneousGraph, AccumulationReport, IngestStats)> {
        let _timer = metrics::STAGE_DURATION
            .with_label_values(&["edges"])
            .start_timer();
        let mut accumulator = EdgeAccumulator::new(tables);
        let stats = self.scan_chunks(source, "edges", |chunk| accumulator.observe_chunk(chunk))?;
        let (graph, report) = accumulator.finish();
        Ok((graph, report, stats))
    }

    pub fn sanitize(&self, graph: HeterogeneousGraph) -> (HeterogeneousGraph, SanitizeReport) {
        let _timer = metrics::STAGE_DURATION
            .with_label_values(&["sanitize"])
            .start_timer();
        let (graph, trim) = trim(graph, EdgeKind::Contribution, self.config.max_contribution_edges);
        let (graph, cleanup) = clean(graph);
        (graph, SanitizeReport { trim, cleanup })
    }

    pub fn project(&self, graph: &HeterogeneousGraph) -> Projection {
        let _timer = metrics::STAGE_DURATION
            .with_label_values(&["projection"])
            .start_timer();
        project(graph, &self.config)
    }

    #[instrument(skip_all)]
    pub fn run<S: EventSource + ?Sized>(&self, source: &S) -> Result<PipelineOutput> {
        let (tables, identity_pass) = self.resolve_identities(source)?;
        let (graph, accumulation, edge_pass) = self.build_heterogeneous(source, &tables)?;
        let (graph, sanitize) = self.sanitize(graph);
        let projection = self.project(&graph);

        let report = PipelineReport {
            identity_pass,
            edge_pass,
            actors: tables.actor_count(),
            repos: tables.repo_count(),
            ambiguous_logins: tables.ambiguous_logins(),
            ambiguous_repo_names: tables.ambiguous_repo_names(),
            accumulation,
            sanitize,
            heterogeneous_nodes: graph.node_count(),
            heterogeneous_edges: graph.edge_count(),
            projection: projection.report,
        };
        Ok(PipelineOutput {
            heterogeneous: graph,
            repo_repo: projection.repo_repo,
            actor_actor: projection.actor_actor,
            report,
        })
    }

    fn scan_chunks<S, F>(
        &self,
        source: &S,
        pass: &'static str,
        mut on_chunk: F,
    ) -> Result<IngestStats>
    where
        S: EventSource + ?Sized,
        F: FnMut(&[EventRecord]),
    {
        let mut stats = IngestStats::default();
        let mut chunk: Vec<EventRecord> =
            Vec::with_capacity(self.chunk_size.min(DEFAULT_CHUNK_SIZE));

        for item in source.scan()? {
            stats.records += 1;
            match item?.and_then(|raw| normalize_event(&raw)) {
                Ok(event) => chunk.push(event),
                Err(err) => {
                    stats.malformed += 1;
                    metrics::RECORDS_SKIPPED_TOTAL
                        .with_label_values(&[pass, err.reason()])
                        .inc();
                    debug!(pass, error = %err, "skipping malformed record");
                }
            }
            if chunk.len() >= self.chunk_size {
                stats.chunks += 1;
                on_chunk(&chunk);
                chunk.clear();
                debug!(pass, records = stats.records, "processed chunk");
            }
        }
        if !chunk.is_empty() {
            stats.chunks += 1;
            on_chunk(&chunk);
        }

        metrics::RECORDS_INGESTED_TOTAL
            .with_label_values(&[pass])
            .inc_by(stats.records);
        Ok(stats)
    }
}
