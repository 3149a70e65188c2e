//! Core data models for the MCP recommendation endpoint

use crate::experiment::ExperimentDescriptor;
use crate::tunables::TunableConfig;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Issue reported when the caller does not name one
pub const DEFAULT_OBSERVED_ISSUE: &str = "latency_increase";

/// Fixed rationale attached to every recommendation
pub const EXPLANATION: &str = "Recommended configuration improves throughput while reducing power consumption, optimizing the given objective function.";

/// Guidance for applying the patch to a Kubernetes container spec
pub const YAML_PATCH_HINT: &str = "Update the container spec's env section with new JAVA_OPTIONS";

/// Workload description submitted by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRequest {
    pub namespace: String,
    pub deployment: String,
    pub container: String,
    pub env_vars: BTreeMap<String, String>,
    /// Optional `repo` / `image` overrides
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_info: BTreeMap<String, String>,
    #[serde(default = "default_observed_issue")]
    pub observed_issue: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics_snapshot: BTreeMap<String, serde_json::Value>,
}

fn default_observed_issue() -> Option<String> {
    Some(DEFAULT_OBSERVED_ISSUE.to_string())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl WorkloadRequest {
    pub fn new(
        namespace: impl Into<String>,
        deployment: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            deployment: deployment.into(),
            container: container.into(),
            env_vars: BTreeMap::new(),
            source_info: BTreeMap::new(),
            observed_issue: default_observed_issue(),
            metrics_snapshot: BTreeMap::new(),
        }
    }

    /// Source repository, falling back to the demo organisation
    pub fn source_repo(&self) -> String {
        self.source_info
            .get("repo")
            .cloned()
            .unwrap_or_else(|| format!("https://github.com/demo-org/{}", self.deployment))
    }

    /// Container image, falling back to the demo registry
    pub fn image(&self) -> String {
        self.source_info
            .get("image")
            .cloned()
            .unwrap_or_else(|| format!("ghcr.io/demo-org/{}:latest", self.deployment))
    }
}

/// Synthetic measurements reported for a trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialMetrics {
    #[serde(rename = "Throughput")]
    pub throughput: f64,
    #[serde(rename = "Avg_Watts")]
    pub avg_watts: f64,
}

impl TrialMetrics {
    /// Objective value: `1000 * Throughput / Avg_Watts^2`
    pub fn score(&self) -> f64 {
        1000.0 * self.throughput / self.avg_watts.powi(2)
    }
}

/// Outcome of a single trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// 1-based trial number
    pub trial: usize,
    pub config: TunableConfig,
    /// Objective value rounded to two decimals
    pub score: f64,
    pub metrics: TrialMetrics,
}

/// Echo of the workload the recommendation applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub namespace: String,
    pub deployment: String,
    pub container: String,
    pub original_env: BTreeMap<String, String>,
    pub observed_issue: Option<String>,
    pub source_repo: String,
    pub image: String,
}

impl From<&WorkloadRequest> for WorkloadSummary {
    fn from(req: &WorkloadRequest) -> Self {
        Self {
            namespace: req.namespace.clone(),
            deployment: req.deployment.clone(),
            container: req.container.clone(),
            original_env: req.env_vars.clone(),
            observed_issue: req.observed_issue.clone(),
            source_repo: req.source_repo(),
            image: req.image(),
        }
    }
}

/// Environment variables the agent should set on the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVarUpdate {
    #[serde(rename = "JAVA_OPTIONS")]
    pub java_options: String,
}

/// Action the calling agent should take to apply the recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchAction {
    pub update_env_var: EnvVarUpdate,
    pub yaml_patch_hint: String,
}

impl PatchAction {
    pub fn java_options(java_options: String) -> Self {
        Self {
            update_env_var: EnvVarUpdate { java_options },
            yaml_patch_hint: YAML_PATCH_HINT.to_string(),
        }
    }
}

/// Response body of the `/mcp` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub experiment_id: String,
    pub workload: WorkloadSummary,
    pub hpo_experiment_config: ExperimentDescriptor,
    pub final_best_score: f64,
    pub best_config: TunableConfig,
    pub agent_patch_action: PatchAction,
    pub trials: Vec<TrialResult>,
    pub explanation: String,
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
