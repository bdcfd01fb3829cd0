use std::path::Path;

use anyhow::Result;

use crate::cli::Cli;
use crate::commands::{load_artifacts, resolve_network};
use crate::config::Config;
use crate::plan::Plan;

/// Validate a plan offline and print what it would do.
pub async fn run(cli: &Cli, plan_path: &Path) -> Result<()> {
	let config = Config::load()?;
	let plan = Plan::load(plan_path)?;
	let network = resolve_network(cli, &config, &plan.network)?;
	let artifacts = load_artifacts(cli, &config, &plan)?;

	let table = plan.seed_table(network.chain_id)?;
	plan.check(&table, &artifacts)?;

	println!("Network: {} (chain {})", network.name, network.chain_id);
	println!(
		"RPC:     {}",
		network.rpc_url.as_deref().unwrap_or("not configured")
	);
	println!("Known addresses:");
	for (name, address) in table.iter() {
		println!("  {name:<16} {address}");
	}

	println!("Deployments ({} confirmations each):", plan.deploy_confirmations);
	for (i, step) in plan.deploy.iter().enumerate() {
		let args: Vec<String> = step.args.iter().map(ToString::to_string).collect();
		println!(
			"  {}. {} <- {}({})",
			i + 1,
			step.name,
			step.artifact_name(),
			args.join(", ")
		);
	}

	println!("Configuration calls:");
	for (i, call) in plan.calls.iter().enumerate() {
		let args: Vec<String> = call.args.iter().map(ToString::to_string).collect();
		let confirmations = call.confirmations.unwrap_or(plan.confirmations);
		println!(
			"  {}. {}.{} [{}] ({confirmations} confirmations)",
			i + 1,
			call.target,
			call.method,
			args.join(", ")
		);
	}

	println!("Plan OK.");
	Ok(())
}
