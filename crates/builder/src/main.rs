use anyhow::{anyhow, Context, Result};
use common::{config::AppConfig, logging};
use network::{metrics, GraphPipeline};
use normalizer::JsonLinesSource;
use tracing::{debug, info};

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init_logging(&config.logging.level);

    // a path on the command line wins over ingest.input_path
    let input = std::env::args()
        .nth(1)
        .or_else(|| config.ingest.input_path.clone())
        .ok_or_else(|| anyhow!("no input path configured (set INGEST__INPUT_PATH or pass one)"))?;
    let source = JsonLinesSource::new(input.as_str());

    info!(input = %input, chunk_size = config.ingest.chunk_size, "building collaboration network");
    let output = GraphPipeline::new(config.graph.clone())
        .chunk_size(config.ingest.chunk_size)
        .run(&source)
        .with_context(|| format!("building network from {input}"))?;

    info!(
        nodes = output.heterogeneous.node_count(),
        edges = output.heterogeneous.edge_count(),
        repo_repo_edges = output.repo_repo.edge_count(),
        actor_actor_edges = output.actor_actor.edge_count(),
        "network built"
    );
    println!("{}", serde_json::to_string_pretty(&output.report)?);

    match metrics::render() {
        Ok(text) => debug!(metrics = %text, "pipeline metrics"),
        Err(err) => debug!(error = %err, "failed to render metrics"),
    }
    Ok(())
}
