use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

pub static RECORDS_INGESTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "network_records_ingested_total",
        "Event records read from the source, grouped by pipeline pass",
        &["pass"]
    )
    .expect("records ingested")
});

pub static RECORDS_SKIPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "network_records_skipped_total",
        "Malformed event records skipped, grouped by pass and reason",
        &["pass", "reason"]
    )
    .expect("records skipped")
});

pub static EDGES_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "network_edges_created_total",
        "Distinct heterogeneous edges created during accumulation, grouped by kind",
        &["kind"]
    )
    .expect("edges created")
});

pub static REFERENCES_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "network_references_dropped_total",
        "Contributions, mentions and repo references that produced no edge",
        &["kind", "reason"]
    )
    .expect("references dropped")
});

pub static NODES_REMOVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "network_nodes_removed_total",
        "Nodes removed by trimming and cleanup stages",
        &["stage"]
    )
    .expect("nodes removed")
});

pub static EDGES_REMOVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "network_edges_removed_total",
        "Edges removed by trimming and cleanup stages",
        &["stage"]
    )
    .expect("edges removed")
});

pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "network_stage_duration_seconds",
        "Wall time spent in each pipeline stage",
        &["stage"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]
    )
    .expect("stage duration histogram")
});

pub fn render() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
