mod cli;
mod config;
mod domain;
mod error;
mod infra;
mod workflows;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;
use infra::activity_log::ActivityLog;
use infra::feed::RssFeedGateway;
use infra::ledger::Ledger;
use infra::magnet_output::MagnetOutput;
use workflows::orchestrator::{self, RunOutputs};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(count) => println!("{count} files downloaded."),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<usize> {
    let config_path = cli.config.unwrap_or_else(config::get_config_path);
    let config = Config::load_or_create(&config_path).context("Failed to load configuration")?;

    if config.shows.is_empty() {
        println!(
            "No shows configured. Add [[shows]] entries to {}",
            config_path.display()
        );
    }

    let database_path = cli.database.unwrap_or_else(|| config.database_path());
    let mut ledger = Ledger::open(&database_path)?;

    let gateway = RssFeedGateway::new(config.feed_url.clone(), config.fetch_timeout())
        .context("Failed to build HTTP client")?;

    // Opened last so a startup failure leaves the previous run's output intact.
    let log = ActivityLog::open(&config.log_path)?;
    let magnets = MagnetOutput::create(&config.magnet_output_path)?;
    let mut outputs = RunOutputs { magnets, log };

    let count = orchestrator::run(&config.shows, &mut ledger, &gateway, &mut outputs);
    Ok(count)
}
