use anyhow::Result;
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_int_counter, CounterVec, Encoder, IntCounter, TextEncoder,
};

use crate::parser::ParsedReasoning;

lazy_static! {
    static ref PARSES_TOTAL: CounterVec = register_counter_vec!(
        "reasoning_split_parses_total",
        "Total number of parsed responses per detected reasoning format",
        &["format"]
    )
    .unwrap();

    static ref STREAM_TOKENS_TOTAL: IntCounter = register_int_counter!(
        "reasoning_split_stream_tokens_total",
        "Total number of tokens fed to streaming parsers"
    )
    .unwrap();
}

/// Count one finished parse under its format label (`none` when nothing
/// matched).
pub fn record_parse(parsed: &ParsedReasoning) {
    let label = parsed.format.map_or("none", |format| format.as_str());
    PARSES_TOTAL.with_label_values(&[label]).inc();
}

pub fn record_stream_token() {
    STREAM_TOKENS_TOTAL.inc();
}

pub fn parses_total(label: &str) -> f64 {
    PARSES_TOTAL.with_label_values(&[label]).get()
}

/// Render every registered metric in the Prometheus text format.
pub fn gather_text() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
