pub mod addresses;
pub mod check;
pub mod networks;
pub mod run;
pub mod tx;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::artifacts::Artifacts;
use crate::cli::Cli;
use crate::config::Config;
use crate::networks::{self as registry, Network};
use crate::plan::Plan;

/// Resolve a network by name, applying config and the `--rpc-url` flag.
pub fn resolve_network(cli: &Cli, config: &Config, name: &str) -> Result<Network> {
	let mut network = registry::resolve(name, config)?;
	if let Some(url) = &cli.rpc_url {
		network.rpc_url = Some(url.clone());
	}
	Ok(network)
}

/// Artifacts directory from CLI flag or config.
pub fn resolve_artifacts_dir(cli: &Cli, config: &Config) -> PathBuf {
	cli.artifacts
		.clone()
		.unwrap_or_else(|| config.artifacts_dir.clone())
}

/// Load the compiled contracts `plan` deploys. Calls are encoded from
/// their signatures alone, so a plan without deployments needs none.
pub fn load_artifacts(cli: &Cli, config: &Config, plan: &Plan) -> Result<Artifacts> {
	if plan.deploy.is_empty() {
		return Ok(Artifacts::new());
	}

	let dir = resolve_artifacts_dir(cli, config);
	let artifacts = Artifacts::load_dir(&dir).with_context(|| {
		format!(
			"loading artifacts from {} (run `npx hardhat compile` first?)",
			dir.display()
		)
	})?;
	tracing::debug!(count = artifacts.len(), dir = %dir.display(), "artifacts loaded");
	Ok(artifacts)
}
