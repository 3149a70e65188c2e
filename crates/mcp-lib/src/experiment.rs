//! HPO experiment descriptor
//!
//! Describes the shape of the simulated optimization run in the format a
//! Kruize HPO backend accepts. The objective function is descriptive only;
//! scores are computed by [`TrialMetrics::score`](crate::models::TrialMetrics::score).

use crate::tunables::{catalog, Tunable};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const OBJECTIVE_FUNCTION: &str = "1000 * (Throughput **1) / (Avg_Watts **2)";
pub const HPO_ALGO_IMPL: &str = "optuna_tpe";
pub const DIRECTION: &str = "maximize";
pub const PARALLEL_TRIALS: usize = 1;

/// Hex digits in the random experiment id suffix
const ID_SUFFIX_LEN: usize = 6;

/// A variable referenced by the objective function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionVariable {
    pub name: String,
    pub value_type: String,
}

impl FunctionVariable {
    fn float(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value_type: "float".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDescriptor {
    pub experiment_name: String,
    pub experiment_id: String,
    pub total_trials: usize,
    pub parallel_trials: usize,
    pub objective_function: String,
    pub value_type: String,
    pub hpo_algo_impl: String,
    pub direction: String,
    pub function_variables: Vec<FunctionVariable>,
    pub tunables: Vec<Tunable>,
}

impl ExperimentDescriptor {
    pub fn new(experiment_id: &str, total_trials: usize) -> Self {
        Self {
            experiment_name: experiment_id.to_string(),
            experiment_id: experiment_id.to_string(),
            total_trials,
            parallel_trials: PARALLEL_TRIALS,
            objective_function: OBJECTIVE_FUNCTION.to_string(),
            value_type: "float".to_string(),
            hpo_algo_impl: HPO_ALGO_IMPL.to_string(),
            direction: DIRECTION.to_string(),
            function_variables: vec![
                FunctionVariable::float("Throughput"),
                FunctionVariable::float("Avg_Watts"),
            ],
            tunables: catalog().to_vec(),
        }
    }
}

/// Build `{namespace}_{deployment}_{suffix}` with a 6 hex digit suffix.
///
/// Ids are not stored anywhere, so collisions are tolerated.
pub fn experiment_id<R: Rng + ?Sized>(namespace: &str, deployment: &str, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..(1u32 << (4 * ID_SUFFIX_LEN)));
    format!(
        "{namespace}_{deployment}_{suffix:0width$x}",
        width = ID_SUFFIX_LEN
    )
}
