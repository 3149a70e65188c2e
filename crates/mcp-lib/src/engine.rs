//! Mock HPO loop
//!
//! Samples random JVM configurations, attaches fabricated Throughput and
//! Avg_Watts measurements to each, and recommends the best scoring one.
//! Measurements are drawn independently of the sampled configuration.

use crate::error::{HpoError, Result};
use crate::experiment::{experiment_id, ExperimentDescriptor};
use crate::models::{
    round2, PatchAction, Recommendation, TrialMetrics, TrialResult, WorkloadRequest,
    WorkloadSummary, EXPLANATION,
};
use crate::tunables::{catalog, Tunable, TunableConfig};
use rand::Rng;
use std::ops::Range;
use tracing::debug;

/// Trials run per recommendation
pub const TRIALS: usize = 5;

/// Range synthetic Throughput is drawn from
pub const THROUGHPUT_RANGE: Range<f64> = 100.0..1000.0;

/// Range synthetic Avg_Watts is drawn from
pub const AVG_WATTS_RANGE: Range<f64> = 10.0..100.0;

/// Fabricate a metrics snapshot for one trial
pub fn synthesize_metrics<R: Rng + ?Sized>(rng: &mut R) -> TrialMetrics {
    TrialMetrics {
        throughput: rng.gen_range(THROUGHPUT_RANGE),
        avg_watts: rng.gen_range(AVG_WATTS_RANGE),
    }
}

/// Best trial seen so far. Only a strictly higher score replaces it, so the
/// earliest of equally scoring trials wins.
#[derive(Debug, Clone)]
struct BestTrial {
    score: f64,
    config: Option<TunableConfig>,
}

impl BestTrial {
    fn new() -> Self {
        Self {
            score: -1.0,
            config: None,
        }
    }

    fn offer(&mut self, score: f64, config: &TunableConfig) {
        if score > self.score {
            self.score = score;
            self.config = Some(config.clone());
        }
    }
}

/// Runs the simulated experiment for a workload
#[derive(Debug, Clone)]
pub struct HpoEngine {
    trials: usize,
    tunables: &'static [Tunable],
}

impl Default for HpoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HpoEngine {
    pub fn new() -> Self {
        Self::with_trials(TRIALS)
    }

    /// Engine with a non-default trial count. The same count feeds the
    /// experiment descriptor and the trial loop.
    pub fn with_trials(trials: usize) -> Self {
        Self {
            trials,
            tunables: catalog(),
        }
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Run all trials and assemble the recommendation payload
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        req: &WorkloadRequest,
        rng: &mut R,
    ) -> Result<Recommendation> {
        if self.trials == 0 {
            return Err(HpoError::NoTrials);
        }

        let experiment_id = experiment_id(&req.namespace, &req.deployment, rng);
        let descriptor = ExperimentDescriptor::new(&experiment_id, self.trials);

        let mut trials = Vec::with_capacity(self.trials);
        let mut best = BestTrial::new();

        for i in 0..self.trials {
            let config = TunableConfig::sample(self.tunables, rng);
            let metrics = synthesize_metrics(rng);
            let score = metrics.score();

            debug!(
                event = "trial_completed",
                experiment_id = %experiment_id,
                trial = i + 1,
                score = score,
                throughput = metrics.throughput,
                avg_watts = metrics.avg_watts,
                "Trial completed"
            );

            best.offer(score, &config);

            trials.push(TrialResult {
                trial: i + 1,
                config,
                score: round2(score),
                metrics,
            });
        }

        // Scores are positive, so the first trial always replaces the initial -1
        let best_config = best.config.ok_or(HpoError::NoTrials)?;
        let java_options = best_config.to_java_options();

        Ok(Recommendation {
            experiment_id,
            workload: WorkloadSummary::from(req),
            hpo_experiment_config: descriptor,
            final_best_score: round2(best.score),
            best_config,
            agent_patch_action: PatchAction::java_options(java_options),
            trials,
            explanation: EXPLANATION.to_string(),
        })
    }
}
