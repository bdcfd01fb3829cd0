use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use bonk_deploy::cli::{Cli, Command};
use bonk_deploy::commands;

#[tokio::main]
async fn main() -> Result<()> {
	// Keys may live in a local .env, as with the hardhat scripts.
	dotenvy::dotenv().ok();
	init_tracing();

	let cli = Cli::parse();

	match &cli.command {
		Command::Run { plan } => commands::run::run(&cli, plan).await,
		Command::Check { plan } => commands::check::run(&cli, plan).await,
		Command::Networks { command } => commands::networks::run(command).await,
		Command::Addresses { chain_id, network } => {
			commands::addresses::run(*chain_id, network.as_deref()).await
		}
		Command::Tx { command } => commands::tx::run(&cli, command).await,
	}
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (warnings by default).
fn init_tracing() {
	let filter = EnvFilter::builder()
		.with_default_directive(LevelFilter::WARN.into())
		.from_env_lossy();
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
