//! Prometheus metrics setup and metric definitions

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "tenantgate_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tenantgate_http_request_duration_seconds";
pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tenantgate_http_requests_in_flight";
pub const GATE_REJECTIONS_TOTAL: &str = "tenantgate_gate_rejections_total";
pub const BEST_EFFORT_FAILURES_TOTAL: &str = "tenantgate_best_effort_failures_total";

/// Gate names used as the `gate` label.
pub const GATES: &[&str] = &["api_key", "session", "tenant", "bound_tenant", "admin_only"];

/// Secondary steps whose failures do not fail the request.
pub const BEST_EFFORT_STEPS: &[&str] = &["claims_mirror", "user_profile"];

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let buckets = [
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets(&buckets)?
        .install_recorder()?;
    Ok(handle)
}

/// Register metric descriptions and emit initial zero values so Prometheus
/// output includes HELP/TYPE lines for all metrics from startup.
pub fn describe_metrics() {
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        HTTP_REQUESTS_IN_FLIGHT,
        "Number of HTTP requests currently being processed"
    );
    describe_counter!(
        GATE_REJECTIONS_TOTAL,
        "Requests rejected by an authorization gate"
    );
    describe_counter!(
        BEST_EFFORT_FAILURES_TOTAL,
        "Secondary writes that failed without failing the request"
    );

    gauge!(HTTP_REQUESTS_IN_FLIGHT).set(0.0);
    for gate in GATES {
        counter!(GATE_REJECTIONS_TOTAL, "gate" => *gate).absolute(0);
    }
    for step in BEST_EFFORT_STEPS {
        counter!(BEST_EFFORT_FAILURES_TOTAL, "step" => *step).absolute(0);
    }
}

pub fn record_gate_rejection(gate: &'static str) {
    counter!(GATE_REJECTIONS_TOTAL, "gate" => gate).increment(1);
}

pub fn record_best_effort_failure(step: &'static str) {
    counter!(BEST_EFFORT_FAILURES_TOTAL, "step" => step).increment(1);
}
