use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::networks::DEFAULT_NETWORK;

#[derive(Parser)]
#[command(
	name = "bonk-deploy",
	about = "Deploy and configure the Bonk game contracts from a plan file.",
	version
)]
pub struct Cli {
	/// Override the RPC endpoint of the target network.
	#[arg(long, global = true)]
	pub rpc_url: Option<String>,

	/// Hardhat artifacts directory (default from config).
	#[arg(long, global = true)]
	pub artifacts: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Execute a deployment plan.
	Run {
		/// Plan file (TOML).
		plan: PathBuf,
	},

	/// Validate a deployment plan without touching the chain.
	Check {
		/// Plan file (TOML).
		plan: PathBuf,
	},

	/// List networks and manage endpoint overrides.
	Networks {
		#[command(subcommand)]
		command: NetworksCommand,
	},

	/// Show known Bonk contract addresses.
	Addresses {
		/// Only show this chain.
		#[arg(long, conflicts_with = "network")]
		chain_id: Option<u64>,

		/// Only show the chain of this network.
		#[arg(long)]
		network: Option<String>,
	},

	/// Check transaction status on-chain.
	Tx {
		#[command(subcommand)]
		command: TxCommand,
	},
}

// -- Networks subcommands --

#[derive(Subcommand)]
pub enum NetworksCommand {
	/// Show every known network with overrides applied.
	List,

	/// Store an RPC endpoint override in the config file.
	SetRpc {
		/// Network name, e.g. bscTestnet.
		network: String,

		/// RPC endpoint URL.
		url: String,
	},
}

// -- Tx subcommands --

#[derive(Subcommand)]
pub enum TxCommand {
	/// Check confirmation status of a transaction.
	Status {
		/// Transaction hash (0x-prefixed).
		tx_hash: String,

		/// Network the transaction was sent on.
		#[arg(long, default_value = DEFAULT_NETWORK)]
		network: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn command_tree_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn tx_status_defaults_network() {
		let cli = Cli::parse_from(["bonk-deploy", "tx", "status", "0xabc"]);
		match cli.command {
			Command::Tx {
				command: TxCommand::Status { network, .. },
			} => assert_eq!(network, DEFAULT_NETWORK),
			_ => panic!("expected tx status"),
		}
	}

	#[test]
	fn global_flags_follow_subcommand() {
		let cli = Cli::parse_from([
			"bonk-deploy",
			"run",
			"plans/packs.toml",
			"--rpc-url",
			"http://localhost:8545",
		]);
		assert_eq!(cli.rpc_url.as_deref(), Some("http://localhost:8545"));
		assert!(matches!(cli.command, Command::Run { .. }));
	}

	#[test]
	fn chain_id_conflicts_with_network() {
		let res = Cli::try_parse_from([
			"bonk-deploy",
			"addresses",
			"--chain-id",
			"97",
			"--network",
			"bscTestnet",
		]);
		assert!(res.is_err());
	}
}
