pub mod accumulator;
pub mod cleanup;
pub mod graph;
pub mod homogeneous;
pub mod identity;
pub mod metrics;
pub mod pipeline;
pub mod projection;
pub mod references;
pub mod trim;
pub mod weights;

pub use accumulator::{AccumulationReport, EdgeAccumulator};
pub use cleanup::{clean, component_count, CleanupReport};
pub use graph::{EdgeKind, EdgeView, EntityId, HeterogeneousGraph, NodeAttrs, NodeKey};
pub use homogeneous::{HomogeneousEdge, HomogeneousGraph, ProjectionKind};
pub use identity::{ActorIdentity, IdentityResolver, IdentityTables, RepoIdentity};
pub use pipeline::{GraphPipeline, IngestStats, PipelineOutput, PipelineReport, SanitizeReport};
pub use projection::{harmonic_mean, project, Projection, ProjectionReport};
pub use references::{extract_references, References};
pub use trim::{filter_top_edges, trim, TrimReport};
pub use weights::contribution_weight;
