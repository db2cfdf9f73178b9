use cancer_classification::Label;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider},
    KeyValue,
};
use prometheus::{Encoder, Registry, TextEncoder};

/// Buckets for a single CPU classification, preprocessing included.
const CLASSIFICATION_BOUNDARIES_MS: [f64; 10] = [
    5.0, 10.0, 25.0, 50.0, 100.0, 150.0, 250.0, 500.0, 1000.0, 2500.0,
];

pub struct Metrics {
    request_counter: Counter<u64>,
    classification_counter: Counter<u64>,
    classification_duration: Histogram<u64>,
    pub registry: Registry,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        // TODO: opentelemetry-prometheus is deprecated, move to an OTLP exporter
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()?;

        let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
            .with_reader(exporter)
            .build();

        let meter = provider.meter("classification_server");
        global::set_meter_provider(provider);

        let request_counter = meter
            .u64_counter("requests_total")
            .with_description("Total number of requests")
            .build();

        let classification_counter = meter
            .u64_counter("classifications_total")
            .with_description("Successful classifications by predicted label")
            .build();

        let classification_duration = meter
            .u64_histogram("classification_duration_ms")
            .with_boundaries(CLASSIFICATION_BOUNDARIES_MS.to_vec())
            .with_description("Duration of classification calls in milliseconds")
            .build();

        Ok(Metrics {
            request_counter,
            classification_counter,
            classification_duration,
            registry,
        })
    }

    pub fn record_request(&self, route: &str) {
        let attributes = [KeyValue::new("route", route.to_string())];
        self.request_counter.add(1, &attributes);
    }

    pub fn record_classification_duration(&self, duration_ms: u64, route: &str) {
        let attributes = [KeyValue::new("route", route.to_string())];
        self.classification_duration.record(duration_ms, &attributes);
    }

    pub fn record_label(&self, label: Label) {
        let attributes = [KeyValue::new("label", label.as_str())];
        self.classification_counter.add(1, &attributes);
    }

    /// Prometheus text exposition of everything in `registry`.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_metrics() {
        let metrics = Metrics::new().unwrap();

        metrics.record_request("/classify");
        metrics.record_classification_duration(42, "/classify");
        metrics.record_label(Label::Cancer);

        let text = metrics.render().unwrap();
        assert!(text.contains("requests_total"));
        assert!(text.contains("classification_duration_ms"));
        assert!(text.contains("classifications_total"));
        assert!(text.contains("label=\"Cancer\""));
    }

    #[test]
    fn test_boundaries_are_increasing() {
        assert!(CLASSIFICATION_BOUNDARIES_MS
            .windows(2)
            .all(|pair| pair[0] < pair[1]));
    }
}
