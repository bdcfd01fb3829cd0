use anyhow::Result;

use crate::chain::{parse_tx_hash, RpcChain};
use crate::cli::{Cli, TxCommand};
use crate::commands::resolve_network;
use crate::config::Config;

pub async fn run(cli: &Cli, cmd: &TxCommand) -> Result<()> {
	let config = Config::load()?;

	match cmd {
		TxCommand::Status { tx_hash, network } => {
			let network = resolve_network(cli, &config, network)?;
			let chain = RpcChain::connect(network.rpc()?, None)?;
			let hash = parse_tx_hash(tx_hash)?;

			match chain.status(hash).await? {
				Some(info) => {
					let status = if info.success { "success" } else { "reverted" };
					println!("Transaction:   {hash}");
					println!("Status:        {status}");
					if let Some(block) = info.block_number {
						println!("Block:         {block}");
					}
					println!("Confirmations: {}", info.confirmations);
					if let Some(address) = info.contract_address {
						println!("Created:       {address}");
					}
				}
				None => println!("Transaction not found on {}: {tx_hash}", network.name),
			}
			Ok(())
		}
	}
}
