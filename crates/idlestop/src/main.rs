mod commands;

use clap::{Parser, Subcommand};
use idlestop_config::TriggerTime;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "idlestop")]
#[command(about = "Stop idle tagged EC2 instances on a schedule", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the schedule gate once, as a timer invocation would
    Invoke {
        /// Skip the clock check and stop idle instances now
        #[arg(short, long)]
        manual: bool,
        /// Pretend the current UTC time is HH:MM (today)
        #[arg(long, value_name = "HH:MM")]
        at: Option<TriggerTime>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stop idle instances now (same as `invoke --manual`)
    StopIdle {
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send the pre-stop warning now
    Warn,
    /// List running instances carrying the target tag
    Instances {
        /// List every running instance regardless of tags
        #[arg(short, long)]
        all: bool,
    },
    /// List storage buckets
    Buckets,
    /// Print the effective settings
    Config,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("idlestop {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings = idlestop_config::load_settings()?;

    if matches!(cli.command, Commands::Config) {
        return commands::config::handle(&settings);
    }

    tracing::debug!("Using AWS region {}", settings.region);
    let provider = idlestop_cloud_aws::AwsProvider::from_region(&settings.region).await;

    match cli.command {
        Commands::Invoke { manual, at, json } => {
            commands::invoke::handle(&provider, &settings, manual, at, json).await?;
        }
        Commands::StopIdle { json } => {
            commands::invoke::handle(&provider, &settings, true, None, json).await?;
        }
        Commands::Warn => {
            commands::invoke::handle_warn(&provider, &settings).await?;
        }
        Commands::Instances { all } => {
            commands::inventory::handle_instances(&provider, &settings, all).await?;
        }
        Commands::Buckets => {
            commands::inventory::handle_buckets(&provider).await?;
        }
        Commands::Config | Commands::Version => {
            unreachable!("handled before provider setup");
        }
    }

    Ok(())
}
