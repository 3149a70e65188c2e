//! Submit a workload for tuning and show the recommendation

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mcp_lib::{Recommendation, WorkloadRequest};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{format_config, format_score, print_info, print_success, OutputFormat};

/// Workload to tune
#[derive(Debug, Args)]
pub struct TuneArgs {
    /// Kubernetes namespace of the workload
    #[arg(long, short)]
    pub namespace: String,

    /// Deployment name
    #[arg(long, short)]
    pub deployment: String,

    /// Container running the JVM
    #[arg(long, short)]
    pub container: String,

    /// Current container environment variable (KEY=VALUE, repeatable)
    #[arg(long = "env", short, value_parser = parse_env_var)]
    pub env: Vec<(String, String)>,

    /// Source repository URL
    #[arg(long)]
    pub repo: Option<String>,

    /// Container image reference
    #[arg(long)]
    pub image: Option<String>,

    /// Observed performance issue
    #[arg(long)]
    pub issue: Option<String>,
}

impl TuneArgs {
    pub fn to_request(&self) -> WorkloadRequest {
        let mut req = WorkloadRequest::new(&self.namespace, &self.deployment, &self.container);
        req.env_vars.extend(self.env.iter().cloned());
        if let Some(repo) = &self.repo {
            req.source_info.insert("repo".to_string(), repo.clone());
        }
        if let Some(image) = &self.image {
            req.source_info.insert("image".to_string(), image.clone());
        }
        if let Some(issue) = &self.issue {
            req.observed_issue = Some(issue.clone());
        }
        req
    }
}

/// Parse `KEY=VALUE`; the value may itself contain `=`
pub fn parse_env_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        Some(_) => Err(format!("empty variable name in `{s}`")),
        None => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

#[derive(Tabled)]
struct TrialRow {
    #[tabled(rename = "Trial")]
    trial: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Throughput")]
    throughput: String,
    #[tabled(rename = "Avg Watts")]
    avg_watts: String,
    #[tabled(rename = "Config")]
    config: String,
}

/// Index of the trial the server picked as best
fn best_trial_index(rec: &Recommendation) -> Option<usize> {
    rec.trials
        .iter()
        .position(|t| t.score == rec.final_best_score && t.config == rec.best_config)
}

pub async fn run(client: &ApiClient, args: &TuneArgs, format: OutputFormat) -> Result<()> {
    let rec = client.tune(&args.to_request()).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rec)?;
            println!("{}", json);
        }
        OutputFormat::Table => print_recommendation(&rec),
    }

    Ok(())
}

fn print_recommendation(rec: &Recommendation) {
    print_success(&format!(
        "Experiment {} finished {} trials",
        rec.experiment_id,
        rec.trials.len()
    ));

    let best = best_trial_index(rec);
    let rows: Vec<TrialRow> = rec
        .trials
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let is_best = Some(i) == best;
            TrialRow {
                trial: if is_best {
                    format!("{} ★", t.trial)
                } else {
                    t.trial.to_string()
                },
                score: if is_best {
                    format_score(t.score).green().bold().to_string()
                } else {
                    format_score(t.score)
                },
                throughput: format!("{:.1}", t.metrics.throughput),
                avg_watts: format!("{:.1}", t.metrics.avg_watts),
                config: format_config(&t.config),
            }
        })
        .collect();

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    println!(
        "\nWorkload:   {}/{} ({})",
        rec.workload.namespace, rec.workload.deployment, rec.workload.container
    );
    println!("Image:      {}", rec.workload.image);
    println!(
        "Best score: {}",
        format_score(rec.final_best_score).green().bold()
    );
    println!(
        "\nJAVA_OPTIONS={}",
        rec.agent_patch_action.update_env_var.java_options
    );
    print_info(&rec.agent_patch_action.yaml_patch_hint);
    println!("\n{}", rec.explanation);
}
