use std::path::Path;

use anyhow::Result;

use crate::chain::RpcChain;
use crate::cli::Cli;
use crate::commands::{load_artifacts, resolve_network};
use crate::config::Config;
use crate::deployer::{Deployer, Outcome};
use crate::plan::Plan;
use crate::verify::{ExplorerVerifier, NoExplorer, Verifier};

pub async fn run(cli: &Cli, plan_path: &Path) -> Result<()> {
	let config = Config::load()?;
	let plan = Plan::load(plan_path)?;
	let network = resolve_network(cli, &config, &plan.network)?;
	let artifacts = load_artifacts(cli, &config, &plan)?;

	let table = plan.seed_table(network.chain_id)?;
	plan.check(&table, &artifacts)?;

	let chain = RpcChain::from_env(network.rpc()?)?;
	let verifier: Box<dyn Verifier> = match &network.explorer {
		Some(explorer) => Box::new(ExplorerVerifier::new(explorer.clone())),
		None => Box::new(NoExplorer {
			network: network.name.clone(),
		}),
	};

	let deployer = Deployer::new(&chain, verifier.as_ref(), &artifacts, &network);
	let stdin = std::io::stdin();
	let outcome = deployer
		.run(&plan, table, stdin.lock(), std::io::stdout())
		.await?;

	if let Outcome::Completed(report) = outcome {
		println!();
		print!("{}", report.render());
	}
	Ok(())
}
