//! Prometheus HTTP metrics.
//!
//! Request rate and latency, labelled by method, matched route and status,
//! exported in the Prometheus text format on `GET /metrics`.

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

/// Latency buckets in seconds
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Route label for requests that matched no route
pub const UNMATCHED_PATH: &str = "unmatched";

pub struct Metrics {
    http_requests_total: CounterVec,
    http_request_duration: HistogramVec,
    registry: Registry,
}

impl Metrics {
    /// Create a private registry with the HTTP metrics registered.
    /// `service_name` becomes the constant `service` label.
    pub fn new(service_name: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests")
                .const_label("service", service_name),
            &["method", "path", "status"],
        )?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Histogram of HTTP request latency",
            )
            .const_label("service", service_name)
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "path"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            http_requests_total,
            http_request_duration,
            registry,
        })
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        self.http_requests_total
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Encode every registered metric in the text exposition format.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_requests_by_route_and_status() {
        let metrics = Metrics::new("coffee-service").unwrap();
        metrics.record_http_request("GET", "/health", 200, 0.012);
        metrics.record_http_request("GET", "/health", 200, 0.020);
        metrics.record_http_request("GET", "/api/v1/coffee/recommend", 503, 0.3);

        let text = metrics.gather().unwrap();
        assert!(text.contains(
            r#"http_requests_total{method="GET",path="/health",service="coffee-service",status="200"} 2"#
        ));
        assert!(text.contains(r#"status="503""#));
        assert!(text.contains("http_request_duration_seconds_bucket"));
    }

    #[test]
    fn test_empty_registry_gathers() {
        let metrics = Metrics::new("coffee-service").unwrap();
        assert!(metrics.gather().is_ok());
    }
}
