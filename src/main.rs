//! # Snapshot Gatherer - Main Entry Point
//!
//! 1. Loads the layered configuration (bundled defaults, config file, CLI)
//! 2. Creates one collector per enabled role over a shared HTTP client
//! 3. Gathers every `--interval` (or once with `--once`)
//! 4. Prints a table per cycle and optionally exports it as JSON

use clap::{
    Parser,
    Subcommand,
};
use color_eyre::Result;
use eyre::eyre;
use snapshot_gatherer::{
    logging::log_init,
    Orchestrator,
    Role,
};
use snapshot_gatherer_config::{
    Args,
    Config,
};
use std::{
    future::Future,
    str::FromStr as _,
};
use tracing::{
    error,
    info,
};

#[derive(Parser, Debug)]
#[command(name = "snapshot-gatherer")]
#[command(about = "Gathers metrics snapshots from Mesos masters and slaves")]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[clap(flatten)]
    args: Args,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sample configuration of a role (or of all roles).
    SampleConfig { role: Option<String> },
    /// List the metric groups of a role (or of all roles).
    Groups { role: Option<String> },
    /// Print the effective configuration and exit.
    Config,
}

fn selected_roles(role: Option<&str>) -> Result<Vec<Role>> {
    match role {
        Some(name) => Ok(vec![Role::from_str(name).map_err(|_| eyre!("Unknown role '{name}'"))?]),
        None => Ok(Role::all().collect()),
    }
}

fn print_sample_config(role: Option<&str>) -> Result<()> {
    for role in selected_roles(role)? {
        let descriptor = role.descriptor();
        println!("# {}\n{}", descriptor.description, descriptor.sample_config);
    }
    Ok(())
}

fn print_groups(role: Option<&str>) -> Result<()> {
    for role in selected_roles(role)? {
        println!("{role} (default port {}):", role.descriptor().default_port);
        for group in role.descriptor().groups {
            println!("  {}", group.name);
            for metric in group.metrics {
                println!("    {metric}");
            }
        }
    }
    Ok(())
}

/// Gathers until `shutdown` resolves, or after one cycle with `once`.
async fn run<F: Future>(config: Config, once: bool, shutdown: F) -> Result<()> {
    let interval = config.interval()?;
    let output_file = config.output_file.clone();
    let mut orchestrator = Orchestrator::new(&config)?;

    for collector in orchestrator.collectors() {
        info!(role = %collector.role(), endpoints = ?collector.endpoints(), "Collector ready");
    }

    let mut ticker = tokio::time::interval(interval);
    tokio::pin!(shutdown);

    loop {
        let outcome = tokio::select! {
            outcome = async {
                ticker.tick().await;
                orchestrator.collect().await
            } => outcome,
            _ = &mut shutdown => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
        };
        println!("{}", orchestrator.format());

        if let Some(output_file) = &output_file {
            let json_string = serde_json::to_string_pretty(&orchestrator.summary())?;
            tokio::fs::write(output_file, json_string).await?;
            info!("Data exported successfully to {}", output_file.display());
        }

        match outcome {
            Err(err) if once => return Err(err),
            Err(err) => error!("Gather cycle failed:\n{err}"),
            Ok(()) => {}
        }

        if once {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    log_init(cli.args.verbose)?;

    match cli.command {
        Some(Command::SampleConfig { role }) => print_sample_config(role.as_deref()),
        Some(Command::Groups { role }) => print_groups(role.as_deref()),
        Some(Command::Config) => {
            let config = Config::new(cli.args)?;
            print!("{}", config.to_yaml()?);
            Ok(())
        }
        None => {
            let once = cli.args.once;
            let config = Config::new(cli.args)?;
            info!("Starting snapshot gatherer");
            run(config, once, tokio::signal::ctrl_c()).await
        }
    }
}
