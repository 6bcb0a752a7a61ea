//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::Once;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("echogram_http_requests_total", "Total number of API requests served"),
        &["endpoint", "status"]
    ).expect("metric can be created");

    // Graph API Metrics
    pub static ref GRAPH_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("echogram_graph_requests_total", "Total number of Graph API requests"),
        &["method", "status"]
    ).expect("metric can be created");
    pub static ref GRAPH_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "echogram_graph_request_duration_seconds",
            "Graph API request duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["method"]
    ).expect("metric can be created");

    // OAuth Metrics
    pub static ref OAUTH_EXCHANGES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("echogram_oauth_exchanges_total", "Total number of authorization code exchanges"),
        &["outcome"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("echogram_errors_total", "Total number of errors returned to callers"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; registration only happens on the first call.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
            .expect("HTTP_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(GRAPH_REQUESTS_TOTAL.clone()))
            .expect("GRAPH_REQUESTS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(GRAPH_REQUEST_DURATION_SECONDS.clone()))
            .expect("GRAPH_REQUEST_DURATION_SECONDS can be registered");
        REGISTRY
            .register(Box::new(OAUTH_EXCHANGES_TOTAL.clone()))
            .expect("OAUTH_EXCHANGES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}
