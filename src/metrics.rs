//! Prometheus metrics collection for message-service.
//!
//! Exposed on a separate HTTP listener (see [`crate::http::run_metrics_server`]).
//!
//! - `message_service_http_requests_total{route}` - Requests handled by route
//! - `message_service_http_request_duration_seconds{route}` - Handler latency histogram
//! - `message_service_http_errors_total{error}` - Failed requests by error kind
//! - `message_service_messages_saved_total` - Successful inserts

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Requests handled, by route.
pub static REQUEST_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler latency, by route.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Failed requests, by error kind.
pub static REQUEST_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages successfully inserted.
pub static MESSAGES_SAVED: OnceLock<IntCounter> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded; until
/// then every `record_*` function is a no-op.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(REQUEST_COUNTER, IntCounterVec::new(
        Opts::new("message_service_http_requests_total", "HTTP requests handled by route"),
        &["route"]));
    register!(REQUEST_LATENCY, HistogramVec::new(
        HistogramOpts::new("message_service_http_request_duration_seconds", "HTTP handler latency by route")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["route"]));
    register!(REQUEST_ERRORS, IntCounterVec::new(
        Opts::new("message_service_http_errors_total", "Failed HTTP requests by error kind"),
        &["error"]));
    register!(MESSAGES_SAVED, IntCounter::new(
        "message_service_messages_saved_total", "Messages inserted"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a handled request with latency.
#[inline]
pub fn record_request(route: &str, duration_secs: f64) {
    if let Some(c) = REQUEST_COUNTER.get() {
        c.with_label_values(&[route]).inc();
    }
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[route]).observe(duration_secs);
    }
}

/// Record a failed request.
#[inline]
pub fn record_error(error: &str) {
    if let Some(c) = REQUEST_ERRORS.get() {
        c.with_label_values(&[error]).inc();
    }
}

/// Record a successful insert.
#[inline]
pub fn record_saved() {
    if let Some(c) = MESSAGES_SAVED.get() {
        c.inc();
    }
}
