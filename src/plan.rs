//! Deployment plan files.
//!
//! A plan replaces a hand-edited deployment script: it names the target
//! network, the addresses of contracts that already exist, the contracts to
//! deploy and the configuration calls to make afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use alloy::primitives::{keccak256, Address, B256};
use anyhow::Context;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::addresses::ADDRESS_BOOK;
use crate::artifacts::{self, Artifacts};
use crate::error::PlanError;
use crate::networks::DEFAULT_NETWORK;
use crate::table::AddressTable;

/// Name of the AccessControl admin role, whose identifier is all zeroes.
pub const DEFAULT_ADMIN_ROLE: &str = "DEFAULT_ADMIN_ROLE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Plan {
	#[serde(default = "default_network")]
	pub network: String,

	/// Confirmations awaited after each configuration call.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,

	/// Confirmations awaited after each deployment, before verification.
	#[serde(default = "default_deploy_confirmations")]
	pub deploy_confirmations: u64,

	/// Seed the address table from the built-in address book.
	#[serde(default)]
	pub use_address_book: bool,

	/// Addresses of contracts that already exist. An empty string removes
	/// the name, marking it as still to be deployed.
	#[serde(default)]
	pub addresses: BTreeMap<String, String>,

	#[serde(default)]
	pub deploy: Vec<DeployStep>,

	#[serde(default, rename = "call")]
	pub calls: Vec<CallStep>,
}

fn default_network() -> String {
	DEFAULT_NETWORK.to_owned()
}

fn default_confirmations() -> u64 {
	2
}

fn default_deploy_confirmations() -> u64 {
	3
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeployStep {
	/// Name the new address is recorded under.
	pub name: String,
	/// Artifact to deploy; defaults to `name`.
	pub artifact: Option<String>,
	#[serde(default)]
	pub args: Vec<Arg>,
}

impl DeployStep {
	pub fn artifact_name(&self) -> &str {
		self.artifact.as_deref().unwrap_or(&self.name)
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CallStep {
	/// Printed before the call is submitted.
	pub label: Option<String>,
	/// Address-table name of the contract to call.
	pub target: String,
	/// Solidity signature, e.g. `grantRole(bytes32,address)`.
	pub method: String,
	#[serde(default)]
	pub args: Vec<Arg>,
	/// Overrides the plan-wide confirmation count.
	pub confirmations: Option<u64>,
}

/// A constructor or method argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
	/// Coerced to the parameter's Solidity type at encoding time.
	Literal(String),
	/// `@Name`: an address-table entry.
	Ref(String),
	/// `role:NAME`: an AccessControl role identifier.
	Role(String),
}

impl Arg {
	pub fn parse(s: &str) -> Self {
		if let Some(name) = s.strip_prefix('@') {
			Self::Ref(name.to_owned())
		} else if let Some(role) = s.strip_prefix("role:") {
			Self::Role(role.to_owned())
		} else {
			Self::Literal(s.to_owned())
		}
	}

	/// Resolve to the text handed to the ABI encoder.
	pub fn resolve(&self, table: &AddressTable) -> Result<String, PlanError> {
		match self {
			Self::Literal(v) => Ok(v.clone()),
			Self::Ref(name) => Ok(table.get(name)?.to_string()),
			Self::Role(role) => Ok(role_id(role).to_string()),
		}
	}
}

impl fmt::Display for Arg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(v) => write!(f, "{v}"),
			Self::Ref(name) => write!(f, "@{name}"),
			Self::Role(role) => write!(f, "role:{role}"),
		}
	}
}

impl<'de> Deserialize<'de> for Arg {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Text(String),
			Int(i64),
			Bool(bool),
		}

		Ok(match Raw::deserialize(deserializer)? {
			Raw::Text(s) => Self::parse(&s),
			Raw::Int(n) => Self::Literal(n.to_string()),
			Raw::Bool(b) => Self::Literal(b.to_string()),
		})
	}
}

/// `keccak256(name)`, or zero for the default admin role.
pub fn role_id(name: &str) -> B256 {
	if name == DEFAULT_ADMIN_ROLE {
		B256::ZERO
	} else {
		keccak256(name.as_bytes())
	}
}

/// Resolve every argument against the current table.
pub fn resolve_args(args: &[Arg], table: &AddressTable) -> Result<Vec<String>, PlanError> {
	args.iter().map(|a| a.resolve(table)).collect()
}

impl Plan {
	pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(content)
	}

	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("reading plan {}", path.display()))?;
		Self::from_toml(&content).with_context(|| format!("parsing plan {}", path.display()))
	}

	/// Build the starting address table: the address book (if enabled)
	/// overlaid with the plan's own entries.
	pub fn seed_table(&self, chain_id: u64) -> Result<AddressTable, PlanError> {
		let mut table = AddressTable::new();

		if self.use_address_book {
			match ADDRESS_BOOK.for_chain(chain_id) {
				Some(book) => {
					for (name, address) in book.entries() {
						table.set(name, parse_address(name, address)?);
					}
				}
				None => warn!(chain_id, "address book has no entries for this chain"),
			}
		}

		for (name, address) in &self.addresses {
			if address.trim().is_empty() {
				table.remove(name);
			} else {
				table.set(name, parse_address(name, address)?);
			}
		}

		Ok(table)
	}

	/// Check that every name a step uses is known by the time the step
	/// runs, and that no step deploys over an existing entry.
	pub fn check_references(&self, table: &AddressTable) -> Result<(), PlanError> {
		let mut known: BTreeSet<&str> = table.names().collect();

		for step in &self.deploy {
			check_refs(&step.args, &known)?;
			if !known.insert(step.name.as_str()) {
				return Err(PlanError::AlreadyPresent(step.name.clone()));
			}
		}

		for call in &self.calls {
			if !known.contains(call.target.as_str()) {
				return Err(PlanError::UnknownContract(call.target.clone()));
			}
			check_refs(&call.args, &known)?;
		}

		Ok(())
	}

	/// Check that artifacts exist and that argument counts match the
	/// constructor and method signatures.
	pub fn check_artifacts(&self, artifacts: &Artifacts) -> Result<(), PlanError> {
		for step in &self.deploy {
			let artifact = artifacts.get(step.artifact_name())?;
			let expected = artifact.constructor_inputs().len();
			if expected != step.args.len() {
				return Err(PlanError::Arity {
					target: step.name.clone(),
					expected,
					given: step.args.len(),
				});
			}
		}

		for call in &self.calls {
			let function = artifacts::parse_method(&call.method)?;
			if function.inputs.len() != call.args.len() {
				return Err(PlanError::Arity {
					target: format!("{}.{}", call.target, function.signature()),
					expected: function.inputs.len(),
					given: call.args.len(),
				});
			}
		}

		Ok(())
	}

	/// Everything that can be checked without touching the chain.
	pub fn check(&self, table: &AddressTable, artifacts: &Artifacts) -> Result<(), PlanError> {
		self.check_references(table)?;
		self.check_artifacts(artifacts)
	}
}

fn check_refs(args: &[Arg], known: &BTreeSet<&str>) -> Result<(), PlanError> {
	for arg in args {
		if let Arg::Ref(name) = arg {
			if !known.contains(name.as_str()) {
				return Err(PlanError::UnknownContract(name.clone()));
			}
		}
	}
	Ok(())
}

fn parse_address(name: &str, address: &str) -> Result<Address, PlanError> {
	address.trim().parse().map_err(|e| PlanError::BadAddress {
		name: name.to_owned(),
		reason: format!("{e}"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const PACKS_PLAN: &str = r#"
		network = "bscTestnet"

		[addresses]
		Token = "0x90C7d31f29d553ea8029860A7952961eF14de1e4"
		StorageNFT = "0x80834f2f8c23Da835d4B1d9B076cC70Bf960EFc7"
		CARDNFT = "0x0C1AdEA6Bf597eb7385e090B2CC4815de1d76Bb6"
		PermanentNFT = "0xd11f16015a180294295b7F5c574f33d54c4ba988"
		ConsumableNFT = "0x5FfFB17f4ea39b28C696f75D18D407d2F55cB686"
		Packs = ""

		[[deploy]]
		name = "Packs"
		args = ["@CARDNFT", "@PermanentNFT", "@ConsumableNFT", "@StorageNFT"]

		[[call]]
		label = "grant Minter Role"
		target = "CARDNFT"
		method = "grantRole(bytes32,address)"
		args = ["role:MINTER_ROLE", "@Packs"]

		[[call]]
		target = "Packs"
		method = "setPriceInfo(uint256,uint256,address)"
		args = [1, "15000000000000", "@Token"]
		confirmations = 5
	"#;

	#[test]
	fn parses_plan_with_defaults() {
		let plan = Plan::from_toml(PACKS_PLAN).unwrap();
		assert_eq!(plan.network, "bscTestnet");
		assert_eq!(plan.confirmations, 2);
		assert_eq!(plan.deploy_confirmations, 3);
		assert!(!plan.use_address_book);
		assert_eq!(plan.deploy.len(), 1);
		assert_eq!(plan.deploy[0].artifact_name(), "Packs");
		assert_eq!(plan.calls.len(), 2);
		assert_eq!(plan.calls[1].confirmations, Some(5));
		assert_eq!(
			plan.calls[1].args,
			[
				Arg::Literal("1".into()),
				Arg::Literal("15000000000000".into()),
				Arg::Ref("Token".into()),
			]
		);
	}

	#[test]
	fn empty_plan_targets_default_network() {
		let plan = Plan::from_toml("").unwrap();
		assert_eq!(plan.network, DEFAULT_NETWORK);
		assert!(plan.deploy.is_empty() && plan.calls.is_empty());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(Plan::from_toml("netwrok = \"bscTestnet\"").is_err());
	}

	#[test]
	fn empty_address_marks_contract_as_pending() {
		let plan = Plan::from_toml(PACKS_PLAN).unwrap();
		let table = plan.seed_table(97).unwrap();
		assert_eq!(table.len(), 5);
		assert!(!table.contains("Packs"));
		plan.check_references(&table).unwrap();
	}

	#[test]
	fn plan_entries_override_address_book() {
		let plan = Plan::from_toml(
			r#"
			use-address-book = true
			[addresses]
			Token = "0x0000000000000000000000000000000000000001"
			Packs = ""
			"#,
		)
		.unwrap();
		let table = plan.seed_table(97).unwrap();

		assert_eq!(table.get("Token").unwrap(), Address::with_last_byte(1));
		assert!(!table.contains("Packs"));
		assert_eq!(
			table.get("CARDNFT").unwrap(),
			"0xa6E2262d4C5DDABaE02f9F155d3DfE5bad16C99D".parse::<Address>().unwrap()
		);
	}

	#[test]
	fn address_book_seeds_nothing_on_retired_chains() {
		let plan = Plan::from_toml(
			r#"
			network = "bscMainnet"
			use-address-book = true
			[addresses]
			Router = "0x10ED43C718714eb63d5aA57B78B54704E256024E"
			"#,
		)
		.unwrap();
		let table = plan.seed_table(56).unwrap();

		assert_eq!(table.names().collect::<Vec<_>>(), ["Router"]);
	}

	#[test]
	fn malformed_address_is_reported_by_name() {
		let plan = Plan::from_toml("[addresses]\nRouter = \"0x1234\"").unwrap();
		assert!(matches!(
			plan.seed_table(97),
			Err(PlanError::BadAddress { name, .. }) if name == "Router"
		));
	}

	#[test]
	fn reference_to_later_deployment_is_rejected() {
		let plan = Plan::from_toml(
			r#"
			[[deploy]]
			name = "BattleFactory"
			args = ["@Token"]

			[[deploy]]
			name = "Token"
			artifact = "MyToken"
			"#,
		)
		.unwrap();
		assert_eq!(
			plan.check_references(&AddressTable::new()),
			Err(PlanError::UnknownContract("Token".into()))
		);
	}

	#[test]
	fn redeploying_existing_name_is_rejected() {
		let plan = Plan::from_toml(
			r#"
			[addresses]
			Database = "0x0000000000000000000000000000000000000002"
			[[deploy]]
			name = "Database"
			"#,
		)
		.unwrap();
		let table = plan.seed_table(97).unwrap();
		assert_eq!(
			plan.check_references(&table),
			Err(PlanError::AlreadyPresent("Database".into()))
		);
	}

	#[test]
	fn call_on_unknown_target_is_rejected() {
		let plan = Plan::from_toml(
			r#"
			[[call]]
			target = "Router"
			method = "pause()"
			"#,
		)
		.unwrap();
		assert_eq!(
			plan.check_references(&AddressTable::new()),
			Err(PlanError::UnknownContract("Router".into()))
		);
	}

	#[test]
	fn method_arity_is_checked_offline() {
		let plan = Plan::from_toml(
			r#"
			[addresses]
			Packs = "0x0000000000000000000000000000000000000003"
			[[call]]
			target = "Packs"
			method = "setUniswapRouter(address)"
			args = []
			"#,
		)
		.unwrap();
		assert!(matches!(
			plan.check_artifacts(&Artifacts::new()),
			Err(PlanError::Arity { expected: 1, given: 0, .. })
		));
	}

	#[test]
	fn role_identifiers() {
		assert_eq!(
			role_id("MINTER_ROLE").to_string(),
			"0x9f2df0fed2c77648de5860a4cc508cd0818c85b8b8a1ab4ceeef8d981c8956a6"
		);
		assert_eq!(role_id(DEFAULT_ADMIN_ROLE), B256::ZERO);
	}

	#[test]
	fn args_resolve_against_table() {
		let mut table = AddressTable::new();
		table.set("Packs", Address::with_last_byte(0x42));

		let resolved = resolve_args(
			&[Arg::parse("@Packs"), Arg::parse("role:DEFAULT_ADMIN_ROLE"), Arg::parse("7")],
			&table,
		)
		.unwrap();
		assert_eq!(resolved[0], Address::with_last_byte(0x42).to_string());
		assert_eq!(resolved[1], B256::ZERO.to_string());
		assert_eq!(resolved[2], "7");

		assert_eq!(
			Arg::parse("@Router").resolve(&table),
			Err(PlanError::UnknownContract("Router".into()))
		);
	}
}
