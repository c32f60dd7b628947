use prometheus::{Encoder, TextEncoder};

/// Renders the default Prometheus registry in text exposition format.
/// Lifecycle counters register themselves there via `register_int_counter!`
/// in the command modules.
pub fn render() -> Result<String, prometheus::Error> {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("metrics are not valid UTF-8: {}", e)))
}
