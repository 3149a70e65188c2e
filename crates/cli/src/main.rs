//! Kruize MCP CLI
//!
//! Submits workloads to the Kruize MCP server and shows the resulting
//! JVM tuning recommendations.

mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::{status, tune};

/// Kruize MCP CLI
#[derive(Parser)]
#[command(name = "kmcp")]
#[command(author, version, about = "CLI for the Kruize MCP tuning server", long_about = None)]
pub struct Cli {
    /// Server URL (can also be set via KMCP_API_URL env var)
    #[arg(long, env = "KMCP_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a simulated tuning experiment for a workload
    Tune(tune::TuneArgs),

    /// Show server health and readiness
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = client::ApiClient::new(&cli.api_url)?;

    match &cli.command {
        Commands::Tune(args) => tune::run(&client, args, cli.format).await,
        Commands::Status => status::run(&client, cli.format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tune_parses_repeated_env() {
        let cli = Cli::try_parse_from([
            "kmcp", "tune", "-n", "prod", "-d", "orders", "-c", "jvm", "-e", "A=1", "--env",
            "B=x=y",
        ])
        .unwrap();

        match cli.command {
            Commands::Tune(args) => {
                assert_eq!(args.namespace, "prod");
                assert_eq!(
                    args.env,
                    vec![
                        ("A".to_string(), "1".to_string()),
                        ("B".to_string(), "x=y".to_string())
                    ]
                );
            }
            Commands::Status => panic!("expected tune"),
        }
    }

    #[test]
    fn test_tune_requires_workload_identity() {
        assert!(Cli::try_parse_from(["kmcp", "tune", "-n", "prod"]).is_err());
        assert!(Cli::try_parse_from(["kmcp", "tune", "-n", "p", "-d", "d", "-c", "c", "-e", "BAD"]).is_err());
    }
}
