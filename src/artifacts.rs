//! Hardhat artifacts and ABI encoding.
//!
//! Hardhat writes one `<Contract>.json` per compiled contract under
//! `artifacts/<sourceName>/`, next to a `<Contract>.dbg.json` that points at
//! the build-info file holding the standard-JSON compiler input. Explorer
//! verification needs that input; deployment only needs the ABI and the
//! creation bytecode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use alloy::dyn_abi::{DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::{Function, JsonAbi, Param};
use alloy::primitives::Bytes;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::PlanError;

/// A compiled contract ready to deploy.
#[derive(Debug, Clone)]
pub struct Artifact {
	pub contract_name: String,
	/// Solidity source path, e.g. `contracts/Packs.sol`.
	pub source_name: String,
	pub abi: JsonAbi,
	/// Creation bytecode, without constructor arguments.
	pub bytecode: Bytes,
	/// Build-info file with the compiler input, if hardhat wrote one.
	pub build_info: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
	contract_name: String,
	source_name: String,
	abi: JsonAbi,
	bytecode: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
	build_info: String,
}

impl Artifact {
	/// Load `<Contract>.json` and resolve its build-info through the
	/// sibling `.dbg.json`.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("reading {}", path.display()))?;
		let file: ArtifactFile = serde_json::from_str(&content)
			.with_context(|| format!("parsing {}", path.display()))?;

		let hex_code = file.bytecode.strip_prefix("0x").unwrap_or(&file.bytecode);
		let bytecode = hex::decode(hex_code).map_err(|e| {
			anyhow!(
				"{} bytecode is not plain hex (unlinked library?): {e}",
				file.contract_name
			)
		})?;

		let dbg_path = path.with_extension("dbg.json");
		let build_info = match std::fs::read_to_string(&dbg_path) {
			Ok(dbg) => {
				let dbg: DebugFile = serde_json::from_str(&dbg)
					.with_context(|| format!("parsing {}", dbg_path.display()))?;
				path.parent().map(|dir| dir.join(dbg.build_info))
			}
			Err(_) => None,
		};

		Ok(Self {
			contract_name: file.contract_name,
			source_name: file.source_name,
			abi: file.abi,
			bytecode: bytecode.into(),
			build_info,
		})
	}

	/// `sourceName:ContractName`, the form explorers expect.
	pub fn qualified_name(&self) -> String {
		format!("{}:{}", self.source_name, self.contract_name)
	}

	pub fn constructor_inputs(&self) -> &[Param] {
		self.abi
			.constructor
			.as_ref()
			.map(|c| c.inputs.as_slice())
			.unwrap_or_default()
	}

	/// ABI-encode constructor arguments (no selector).
	pub fn encode_constructor(&self, values: &[String]) -> Result<Bytes, PlanError> {
		let tokens = coerce_values(&self.contract_name, self.constructor_inputs(), values)?;
		let Some(constructor) = self.abi.constructor.as_ref() else {
			return Ok(Bytes::new());
		};
		constructor
			.abi_encode_input(&tokens)
			.map(Bytes::from)
			.map_err(|e| PlanError::BadArgument {
				target: self.contract_name.clone(),
				index: 0,
				reason: e.to_string(),
			})
	}

	/// Creation bytecode followed by encoded constructor arguments.
	pub fn deploy_code(&self, encoded_args: &[u8]) -> Bytes {
		let mut code = Vec::with_capacity(self.bytecode.len() + encoded_args.len());
		code.extend_from_slice(&self.bytecode);
		code.extend_from_slice(encoded_args);
		code.into()
	}
}

/// All artifacts found under a hardhat artifacts directory, by contract name.
#[derive(Debug, Default)]
pub struct Artifacts {
	by_name: HashMap<String, Artifact>,
}

impl Artifacts {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, artifact: Artifact) {
		if let Some(previous) = self.by_name.insert(artifact.contract_name.clone(), artifact) {
			warn!(
				contract = %previous.contract_name,
				shadowed = %previous.source_name,
				"duplicate contract name in artifacts"
			);
		}
	}

	pub fn get(&self, name: &str) -> Result<&Artifact, PlanError> {
		self.by_name
			.get(name)
			.ok_or_else(|| PlanError::MissingArtifact(name.to_owned()))
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}

	/// Walk `dir` and load every contract artifact. Build-info and debug
	/// files are skipped, as are artifacts that fail to load.
	pub fn load_dir(dir: &Path) -> Result<Self> {
		let mut artifacts = Self::new();
		let mut pending = vec![dir.to_path_buf()];

		while let Some(current) = pending.pop() {
			let entries = std::fs::read_dir(&current)
				.with_context(|| format!("reading artifacts in {}", current.display()))?;
			for entry in entries {
				let path = entry?.path();
				let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
				if path.is_dir() {
					if file_name != "build-info" {
						pending.push(path);
					}
					continue;
				}
				if !file_name.ends_with(".json") || file_name.ends_with(".dbg.json") {
					continue;
				}
				match Artifact::load(&path) {
					Ok(artifact) => artifacts.insert(artifact),
					Err(e) => debug!(path = %path.display(), error = %e, "skipping artifact"),
				}
			}
		}

		Ok(artifacts)
	}
}

/// Parse a human-readable method signature such as
/// `setPriceInfo(uint256,uint256,address)`.
pub fn parse_method(signature: &str) -> Result<Function, PlanError> {
	Function::parse(signature).map_err(|e| PlanError::BadSignature {
		signature: signature.to_owned(),
		reason: e.to_string(),
	})
}

/// Selector followed by the ABI-encoded arguments.
pub fn encode_call(function: &Function, values: &[String]) -> Result<Bytes, PlanError> {
	let target = function.signature();
	let tokens = coerce_values(&target, &function.inputs, values)?;
	function
		.abi_encode_input(&tokens)
		.map(Bytes::from)
		.map_err(|e| PlanError::BadArgument {
			target,
			index: 0,
			reason: e.to_string(),
		})
}

/// Coerce textual arguments to the Solidity types declared by `params`.
fn coerce_values(
	target: &str,
	params: &[Param],
	values: &[String],
) -> Result<Vec<DynSolValue>, PlanError> {
	if params.len() != values.len() {
		return Err(PlanError::Arity {
			target: target.to_owned(),
			expected: params.len(),
			given: values.len(),
		});
	}

	params
		.iter()
		.zip(values)
		.enumerate()
		.map(|(index, (param, value))| {
			let bad = |reason: String| PlanError::BadArgument {
				target: target.to_owned(),
				index,
				reason,
			};
			let ty = param.resolve().map_err(|e| bad(e.to_string()))?;
			ty.coerce_str(value)
				.map_err(|e| bad(format!("`{value}` as {}: {e}", param.ty)))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	const PACKS_ABI: &str = r#"[
		{
			"type": "constructor",
			"stateMutability": "nonpayable",
			"inputs": [
				{ "name": "cards", "type": "address", "internalType": "address" },
				{ "name": "permanent", "type": "address", "internalType": "address" },
				{ "name": "consumable", "type": "address", "internalType": "address" },
				{ "name": "storage", "type": "address", "internalType": "address" }
			]
		}
	]"#;

	fn packs() -> Artifact {
		Artifact {
			contract_name: "Packs".into(),
			source_name: "contracts/Packs.sol".into(),
			abi: serde_json::from_str(PACKS_ABI).unwrap(),
			bytecode: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
			build_info: None,
		}
	}

	fn addr(n: u8) -> String {
		let mut bytes = [0u8; 20];
		bytes[19] = n;
		format!("0x{}", hex::encode(bytes))
	}

	#[test]
	fn constructor_args_follow_bytecode() {
		let a = packs();
		let args = a
			.encode_constructor(&[addr(1), addr(2), addr(3), addr(4)])
			.unwrap();
		assert_eq!(args.len(), 4 * 32);
		assert_eq!(args[31], 1);
		assert_eq!(args[127], 4);

		let code = a.deploy_code(&args);
		assert_eq!(&code[..4], &[0x60, 0x80, 0x60, 0x40]);
		assert_eq!(code.len(), 4 + 128);
	}

	#[test]
	fn constructor_arity_is_checked() {
		let err = packs().encode_constructor(&[addr(1)]).unwrap_err();
		assert_eq!(
			err,
			PlanError::Arity {
				target: "Packs".into(),
				expected: 4,
				given: 1
			}
		);
	}

	#[test]
	fn no_constructor_means_no_args() {
		let mut a = packs();
		a.abi = JsonAbi::default();
		assert!(a.encode_constructor(&[]).unwrap().is_empty());
		assert!(a.encode_constructor(&[addr(1)]).is_err());
	}

	#[test]
	fn grant_role_calldata() {
		let f = parse_method("grantRole(bytes32,address)").unwrap();
		let role = format!("0x{}", "11".repeat(32));
		let data = encode_call(&f, &[role, addr(7)]).unwrap();

		assert_eq!(&data[..4], &[0x2f, 0x2f, 0xf1, 0x5d]);
		assert_eq!(data.len(), 4 + 64);
		assert_eq!(data[4], 0x11);
		assert_eq!(data[4 + 63], 7);
	}

	#[test]
	fn decimal_amounts_coerce_to_uint256() {
		let f = parse_method("setPriceInfo(uint256,uint256,address)").unwrap();
		let data = encode_call(&f, &["1".into(), "15000000000000".into(), addr(9)]).unwrap();

		let amount = alloy::primitives::U256::from_be_slice(&data[4 + 32..4 + 64]);
		assert_eq!(amount, alloy::primitives::U256::from(15_000_000_000_000u64));
	}

	#[test]
	fn bad_literal_names_its_position() {
		let f = parse_method("setUniswapRouter(address)").unwrap();
		match encode_call(&f, &["not-an-address".into()]) {
			Err(PlanError::BadArgument { index, .. }) => assert_eq!(index, 0),
			other => panic!("unexpected: {other:?}"),
		}
	}

	#[test]
	fn malformed_signature_is_rejected() {
		assert!(matches!(
			parse_method("grantRole(bytes32,"),
			Err(PlanError::BadSignature { .. })
		));
	}

	#[test]
	fn loads_hardhat_layout() {
		let dir = tempfile::tempdir().unwrap();
		let src = dir.path().join("contracts/Packs.sol");
		std::fs::create_dir_all(&src).unwrap();
		std::fs::create_dir_all(dir.path().join("build-info")).unwrap();

		let artifact = serde_json::json!({
			"_format": "hh-sol-artifact-1",
			"contractName": "Packs",
			"sourceName": "contracts/Packs.sol",
			"abi": serde_json::from_str::<serde_json::Value>(PACKS_ABI).unwrap(),
			"bytecode": "0x60806040",
			"deployedBytecode": "0x",
			"linkReferences": {},
			"deployedLinkReferences": {}
		});
		std::fs::write(src.join("Packs.json"), artifact.to_string()).unwrap();
		std::fs::write(
			src.join("Packs.dbg.json"),
			r#"{"_format":"hh-sol-dbg-1","buildInfo":"../../build-info/abc.json"}"#,
		)
		.unwrap();
		std::fs::write(dir.path().join("build-info/abc.json"), "{}").unwrap();

		let artifacts = Artifacts::load_dir(dir.path()).unwrap();
		assert_eq!(artifacts.len(), 1);

		let packs = artifacts.get("Packs").unwrap();
		assert_eq!(packs.qualified_name(), "contracts/Packs.sol:Packs");
		assert_eq!(packs.constructor_inputs().len(), 4);
		assert_eq!(packs.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40]);
		assert!(packs.build_info.as_ref().unwrap().ends_with("build-info/abc.json"));
		assert_eq!(
			artifacts.get("Storage").unwrap_err(),
			PlanError::MissingArtifact("Storage".into())
		);
	}
}
