use crate::config::Config;
use crate::error::PlanError;

/// Network used when a plan does not name one.
pub const DEFAULT_NETWORK: &str = "opBNBTestnet";

/// Environment variable holding the deployer's private key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Block explorer endpoints for source verification.
pub struct ExplorerInfo {
	/// Etherscan-compatible API endpoint.
	pub api_url: &'static str,
	pub browser_url: &'static str,
	/// Environment variable holding the API key, if the explorer needs one.
	pub api_key_env: Option<&'static str>,
}

/// A built-in network entry.
pub struct NetworkInfo {
	pub name: &'static str,
	pub chain_id: u64,
	/// `None` for explorer-only entries; an RPC URL must come from config.
	pub rpc_url: Option<&'static str>,
	pub explorer: Option<ExplorerInfo>,
}

/// Every network the Bonk contracts have been deployed to or verified on.
pub static NETWORKS: &[NetworkInfo] = &[
	NetworkInfo {
		name: "goerli",
		chain_id: 5,
		rpc_url: Some("https://rpc.ankr.com/eth_goerli"),
		explorer: Some(ExplorerInfo {
			api_url: "https://api-goerli.etherscan.io/api",
			browser_url: "https://goerli.etherscan.io/",
			api_key_env: Some("API_KEY_GOERLI"),
		}),
	},
	NetworkInfo {
		name: "baseGoerli",
		chain_id: 84531,
		rpc_url: Some("https://goerli.base.org"),
		explorer: Some(ExplorerInfo {
			api_url: "https://api-goerli.basescan.org/api",
			browser_url: "https://goerli.basescan.org/",
			api_key_env: Some("API_KEY_GOERLI"),
		}),
	},
	NetworkInfo {
		name: "arbitrum",
		chain_id: 42161,
		rpc_url: Some("https://arb1.arbitrum.io/rpc"),
		explorer: Some(ExplorerInfo {
			api_url: "https://api.arbiscan.io/api",
			browser_url: "https://arbiscan.io/",
			api_key_env: Some("API_KEY_ARBITRUM"),
		}),
	},
	NetworkInfo {
		name: "bscMainnet",
		chain_id: 56,
		rpc_url: Some("https://bsc-dataseed1.binance.org"),
		explorer: Some(ExplorerInfo {
			api_url: "https://api.bscscan.com/api",
			browser_url: "https://bscscan.com/",
			api_key_env: Some("API_KEY_BSCMAINNET"),
		}),
	},
	NetworkInfo {
		name: "bscTestnet",
		chain_id: 97,
		rpc_url: Some("https://data-seed-prebsc-1-s1.bnbchain.org:8545"),
		explorer: Some(ExplorerInfo {
			api_url: "https://api-testnet.bscscan.com/api",
			browser_url: "https://testnet.bscscan.com/",
			api_key_env: Some("API_KEY_BSCTESTNET"),
		}),
	},
	NetworkInfo {
		name: "opBNBTestnet",
		chain_id: 5611,
		rpc_url: Some("https://opbnb-testnet-rpc.bnbchain.org"),
		explorer: Some(ExplorerInfo {
			api_url: "https://open-platform.nodereal.io/67f23031498d4a4cafbe7f4bb75bb590/op-bnb-testnet/contract/",
			browser_url: "https://testnet.opbnbscan.com/",
			api_key_env: None,
		}),
	},
	NetworkInfo {
		name: "lineaGoerli",
		chain_id: 59140,
		rpc_url: None,
		explorer: Some(ExplorerInfo {
			api_url: "https://api-testnet.lineascan.build/api",
			browser_url: "https://goerli.lineascan.build/",
			api_key_env: Some("API_KEY_LINEAGOERLI"),
		}),
	},
	NetworkInfo {
		name: "zkEVMtestnet",
		chain_id: 1442,
		rpc_url: None,
		explorer: Some(ExplorerInfo {
			api_url: "https://api-testnet-zkevm.polygonscan.com/api",
			browser_url: "https://testnet-zkevm.polygonscan.com/",
			api_key_env: Some("API_KEY_ZKEVM_TESTNET"),
		}),
	},
	NetworkInfo {
		name: "opGoerli",
		chain_id: 420,
		rpc_url: None,
		explorer: Some(ExplorerInfo {
			api_url: "https://api-goerli-optimistic.etherscan.io/api",
			browser_url: "https://goerli-optimism.etherscan.io/",
			api_key_env: Some("API_KEY_OPGOERLI"),
		}),
	},
];

pub fn find(name: &str) -> Option<&'static NetworkInfo> {
	NETWORKS.iter().find(|n| n.name == name)
}

pub fn by_chain_id(chain_id: u64) -> Option<&'static NetworkInfo> {
	NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Explorer endpoints after applying user overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Explorer {
	pub api_url: String,
	pub browser_url: String,
	pub api_key_env: Option<String>,
}

impl Explorer {
	/// Read the API key from the environment. An explorer that needs no
	/// key yields an empty string.
	pub fn api_key(&self) -> Option<String> {
		match &self.api_key_env {
			Some(var) => std::env::var(var).ok(),
			None => Some(String::new()),
		}
	}

	/// Link to a contract page on the explorer.
	pub fn address_url(&self, address: &str) -> String {
		format!("{}/address/{address}", self.browser_url.trim_end_matches('/'))
	}
}

/// The Network Identity a run targets: fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
	pub name: String,
	pub chain_id: u64,
	pub rpc_url: Option<String>,
	pub explorer: Option<Explorer>,
}

impl Network {
	/// The RPC endpoint, or an error for explorer-only networks.
	pub fn rpc(&self) -> Result<&str, PlanError> {
		self.rpc_url
			.as_deref()
			.ok_or_else(|| PlanError::NoRpcEndpoint(self.name.clone()))
	}
}

/// Look up a built-in network by name and apply config overrides.
pub fn resolve(name: &str, config: &Config) -> Result<Network, PlanError> {
	let info = find(name).ok_or_else(|| PlanError::UnknownNetwork(name.to_owned()))?;
	let overrides = config.networks.get(name);

	let rpc_url = overrides
		.and_then(|o| o.rpc_url.clone())
		.or_else(|| info.rpc_url.map(str::to_owned));

	let explorer = info.explorer.as_ref().map(|e| Explorer {
		api_url: overrides
			.and_then(|o| o.explorer_api_url.clone())
			.unwrap_or_else(|| e.api_url.to_owned()),
		browser_url: e.browser_url.to_owned(),
		api_key_env: e.api_key_env.map(str::to_owned),
	});

	Ok(Network {
		name: info.name.to_owned(),
		chain_id: info.chain_id,
		rpc_url,
		explorer,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::NetworkOverride;

	#[test]
	fn names_and_chain_ids_are_unique() {
		for (i, a) in NETWORKS.iter().enumerate() {
			for b in &NETWORKS[i + 1..] {
				assert_ne!(a.name, b.name);
				assert_ne!(a.chain_id, b.chain_id);
			}
		}
	}

	#[test]
	fn default_network_is_registered() {
		let n = find(DEFAULT_NETWORK).unwrap();
		assert_eq!(n.chain_id, 5611);
		assert!(n.explorer.as_ref().unwrap().api_key_env.is_none());
	}

	#[test]
	fn lookup_by_chain_id() {
		assert_eq!(by_chain_id(97).unwrap().name, "bscTestnet");
		assert!(by_chain_id(1).is_none());
	}

	#[test]
	fn overrides_win_over_builtin_endpoints() {
		let mut config = Config::default();
		config.networks.insert(
			"lineaGoerli".into(),
			NetworkOverride {
				rpc_url: Some("http://localhost:8545".into()),
				explorer_api_url: None,
			},
		);

		let n = resolve("lineaGoerli", &config).unwrap();
		assert_eq!(n.rpc().unwrap(), "http://localhost:8545");
		assert_eq!(
			n.explorer.unwrap().api_url,
			"https://api-testnet.lineascan.build/api"
		);
	}

	#[test]
	fn explorer_only_network_has_no_rpc() {
		let n = resolve("opGoerli", &Config::default()).unwrap();
		assert_eq!(n.rpc(), Err(PlanError::NoRpcEndpoint("opGoerli".into())));
	}

	#[test]
	fn unknown_network_is_rejected() {
		assert_eq!(
			resolve("sepolia", &Config::default()),
			Err(PlanError::UnknownNetwork("sepolia".into()))
		);
	}

	#[test]
	fn address_url_joins_cleanly() {
		let n = resolve("bscTestnet", &Config::default()).unwrap();
		assert_eq!(
			n.explorer.unwrap().address_url("0xabc"),
			"https://testnet.bscscan.com/address/0xabc"
		);
	}
}
