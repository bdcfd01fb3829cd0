use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	/// Hardhat artifacts directory, relative to the working directory.
	pub artifacts_dir: PathBuf,
	/// Per-network endpoint overrides, keyed by network name.
	#[serde(default)]
	pub networks: BTreeMap<String, NetworkOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkOverride {
	pub rpc_url: Option<String>,
	pub explorer_api_url: Option<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			artifacts_dir: PathBuf::from("artifacts"),
			networks: BTreeMap::new(),
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.bonk-deploy/).
	pub fn dir() -> anyhow::Result<PathBuf> {
		dirs::home_dir()
			.map(|home| home.join(".bonk-deploy"))
			.ok_or_else(|| anyhow::anyhow!("could not determine home directory"))
	}

	/// Path to the config file.
	pub fn path() -> anyhow::Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load config from disk, falling back to defaults if no file exists.
	pub fn load() -> anyhow::Result<Self> {
		let path = Self::path()?;
		if path.exists() {
			let content = std::fs::read_to_string(&path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the current config to disk, creating the directory if needed.
	pub fn save(&self) -> anyhow::Result<()> {
		let path = Self::path()?;
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, toml::to_string_pretty(self)?)?;
		Ok(())
	}

	/// Record an RPC endpoint override for a network.
	pub fn set_rpc(&mut self, network: &str, url: &str) {
		self.networks.entry(network.to_owned()).or_default().rpc_url = Some(url.to_owned());
	}
}
