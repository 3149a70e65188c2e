//! Observability infrastructure for the MCP server
//!
//! Provides:
//! - Prometheus metrics (request counts, trial counts, recommendation latency, best scores)
//! - Structured JSON logging with tracing

use crate::error::HpoError;
use crate::models::{Recommendation, WorkloadRequest};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, GaugeVec, Histogram,
    IntCounter,
};
use std::sync::OnceLock;
use tracing::{error, info};

/// Histogram buckets for recommendation latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
];

/// Histogram buckets for best scores. Synthetic scores span roughly 10 to 10000.
const SCORE_BUCKETS: &[f64] = &[
    10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    requests_total: IntCounter,
    request_errors_total: IntCounter,
    trials_total: IntCounter,
    recommendation_latency_seconds: Histogram,
    best_score: Histogram,
    build_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            requests_total: register_int_counter!(
                "kruize_mcp_requests_total",
                "Total number of workload recommendation requests"
            )
            .expect("Failed to register requests_total"),

            request_errors_total: register_int_counter!(
                "kruize_mcp_request_errors_total",
                "Total number of recommendation requests that failed"
            )
            .expect("Failed to register request_errors_total"),

            trials_total: register_int_counter!(
                "kruize_mcp_trials_total",
                "Total number of simulated trials executed"
            )
            .expect("Failed to register trials_total"),

            recommendation_latency_seconds: register_histogram!(
                "kruize_mcp_recommendation_latency_seconds",
                "Time spent running the simulated HPO loop",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register recommendation_latency_seconds"),

            best_score: register_histogram!(
                "kruize_mcp_best_score",
                "Best objective score of each recommendation",
                SCORE_BUCKETS.to_vec()
            )
            .expect("Failed to register best_score"),

            build_info: register_gauge_vec!(
                "kruize_mcp_build_info",
                "Build information of the running server",
                &["version"]
            )
            .expect("Failed to register build_info"),
        }
    }
}

/// Handle to the process-wide Prometheus metrics.
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a handle, registering the metrics on first use
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    pub fn inc_requests(&self) {
        self.inner().requests_total.inc();
    }

    pub fn inc_request_errors(&self) {
        self.inner().request_errors_total.inc();
    }

    /// Record a finished recommendation
    pub fn observe_recommendation(&self, rec: &Recommendation, duration_secs: f64) {
        let inner = self.inner();
        inner.trials_total.inc_by(rec.trials.len() as u64);
        inner.recommendation_latency_seconds.observe(duration_secs);
        inner.best_score.observe(rec.final_best_score);
    }

    pub fn set_build_info(&self, version: &str) {
        self.inner().build_info.reset();
        self.inner()
            .build_info
            .with_label_values(&[version])
            .set(1.0);
    }
}

/// Emits the server's domain events as structured log records
#[derive(Clone)]
pub struct StructuredLogger {
    node_name: String,
}

impl StructuredLogger {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, addr: &str) {
        info!(
            event = "server_started",
            node = %self.node_name,
            version = %version,
            addr = %addr,
            "Kruize MCP server started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            node = %self.node_name,
            reason = %reason,
            "Kruize MCP server shutting down"
        );
    }

    pub fn log_workload_received(&self, req: &WorkloadRequest) {
        info!(
            event = "workload_received",
            node = %self.node_name,
            namespace = %req.namespace,
            deployment = %req.deployment,
            container = %req.container,
            observed_issue = ?req.observed_issue,
            env_vars = req.env_vars.len(),
            "Received workload for tuning"
        );
    }

    pub fn log_recommendation(&self, rec: &Recommendation, duration_secs: f64) {
        info!(
            event = "recommendation_generated",
            node = %self.node_name,
            experiment_id = %rec.experiment_id,
            namespace = %rec.workload.namespace,
            deployment = %rec.workload.deployment,
            trials = rec.trials.len(),
            best_score = rec.final_best_score,
            java_options = %rec.agent_patch_action.update_env_var.java_options,
            duration_secs = duration_secs,
            "Generated JVM tuning recommendation"
        );
    }

    pub fn log_recommendation_failed(&self, req: &WorkloadRequest, err: &HpoError) {
        error!(
            event = "recommendation_failed",
            node = %self.node_name,
            namespace = %req.namespace,
            deployment = %req.deployment,
            error = %err,
            "Failed to generate recommendation"
        );
    }
}
