use anyhow::Result;

use crate::cli::NetworksCommand;
use crate::config::Config;
use crate::networks::{self, NETWORKS};

pub async fn run(cmd: &NetworksCommand) -> Result<()> {
	match cmd {
		NetworksCommand::List => list(),
		NetworksCommand::SetRpc { network, url } => set_rpc(network, url),
	}
}

fn list() -> Result<()> {
	let config = Config::load()?;

	for info in NETWORKS {
		let network = networks::resolve(info.name, &config)?;
		let marker = if info.name == networks::DEFAULT_NETWORK {
			" (default)"
		} else {
			""
		};
		println!("{}{marker}", network.name);
		println!("  Chain ID: {}", network.chain_id);
		println!(
			"  RPC:      {}",
			network.rpc_url.as_deref().unwrap_or("not configured")
		);
		if let Some(explorer) = &network.explorer {
			println!("  Explorer: {}", explorer.browser_url);
			let key = match &explorer.api_key_env {
				Some(var) if std::env::var(var).is_ok() => format!("{var} (set)"),
				Some(var) => format!("{var} (missing)"),
				None => "not required".into(),
			};
			println!("  API key:  {key}");
		}
	}
	Ok(())
}

fn set_rpc(network: &str, url: &str) -> Result<()> {
	// Reject names the registry does not know before touching the file.
	networks::find(network).ok_or_else(|| anyhow::anyhow!("unknown network `{network}`"))?;

	let mut config = Config::load()?;
	config.set_rpc(network, url);
	config.save()?;
	println!("RPC for {network} set to: {url}");
	Ok(())
}
