use std::fmt::Write as _;
use std::io::{BufRead, Write};

use alloy::primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info, warn};

use crate::artifacts::{self, Artifacts};
use crate::chain::Chain;
use crate::networks::Network;
use crate::plan::{resolve_args, Plan};
use crate::prompt;
use crate::table::AddressTable;
use crate::verify::{Verifier, VerifyRequest};

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
	/// The operator did not confirm; nothing was submitted.
	Declined,
	Completed(Report),
}

/// Result of a completed plan.
#[derive(Debug, Clone)]
pub struct Report {
	pub network: String,
	/// Contracts deployed by this run, in deployment order.
	pub deployed: Vec<(String, Address)>,
	/// The final address table, pre-existing entries included.
	pub table: AddressTable,
}

impl Report {
	/// Console summary, formatted for pasting into the next plan.
	pub fn render(&self) -> String {
		let mut out = format!("// {}\n", self.network);
		for (name, address) in &self.deployed {
			let _ = writeln!(out, "// {name}: {address}");
		}
		out.push('\n');
		out.push_str(&self.table.to_toml());
		out
	}
}

/// Runs a deployment plan against one network: deployments first, then
/// configuration calls, strictly one after another.
pub struct Deployer<'a> {
	chain: &'a dyn Chain,
	verifier: &'a dyn Verifier,
	artifacts: &'a Artifacts,
	network: &'a Network,
}

impl<'a> Deployer<'a> {
	pub fn new(
		chain: &'a dyn Chain,
		verifier: &'a dyn Verifier,
		artifacts: &'a Artifacts,
		network: &'a Network,
	) -> Self {
		Self {
			chain,
			verifier,
			artifacts,
			network,
		}
	}

	/// Confirm the endpoint, ask the operator once, then execute.
	pub async fn run<R: BufRead, W: Write>(
		&self,
		plan: &Plan,
		table: AddressTable,
		input: R,
		output: W,
	) -> Result<Outcome> {
		let chain_id = self.chain.chain_id().await.context("querying chain id")?;
		if chain_id != self.network.chain_id {
			bail!(
				"RPC endpoint reports chain {chain_id}, but {} is chain {}",
				self.network.name,
				self.network.chain_id
			);
		}

		let account = self
			.chain
			.signer()
			.map(|a| a.to_string())
			.unwrap_or_else(|| "<no signing key>".into());
		println!(
			"Submit transactions with account: {account} on {}",
			self.network.name
		);
		println!(
			"{} deployment(s), {} configuration call(s)",
			plan.deploy.len(),
			plan.calls.len()
		);

		if !prompt::confirm(input, output)? {
			println!("end");
			return Ok(Outcome::Declined);
		}

		self.execute(plan, table).await.map(Outcome::Completed)
	}

	/// Execute every step of `plan` without prompting. The first failing
	/// deployment or call aborts the rest of the plan.
	pub async fn execute(&self, plan: &Plan, mut table: AddressTable) -> Result<Report> {
		let mut deployed = Vec::new();

		for step in &plan.deploy {
			let artifact = self.artifacts.get(step.artifact_name())?;
			let values = resolve_args(&step.args, &table)?;
			let encoded = artifact.encode_constructor(&values)?;

			println!("Deploying {}...", step.name);
			let receipt = self
				.chain
				.deploy(artifact.deploy_code(&encoded), plan.deploy_confirmations)
				.await
				.with_context(|| format!("deploying {}", step.name))?;
			let address = receipt
				.contract_address
				.ok_or_else(|| anyhow!("no contract address for {}", step.name))?;

			table.insert(&step.name, address)?;
			deployed.push((step.name.clone(), address));
			info!(contract = %step.name, %address, tx = %receipt.tx_hash, "deployed");
			println!("// {}: {address}", step.name);

			let request = VerifyRequest {
				address,
				artifact,
				constructor_args: &encoded,
			};
			match self.verifier.verify(&request).await {
				Ok(()) => match &self.network.explorer {
					Some(explorer) => {
						println!("Verified: {}", explorer.address_url(&address.to_string()))
					}
					None => println!("Verified {}", step.name),
				},
				Err(e) => warn!(
					contract = %step.name,
					error = %format!("{e:#}"),
					"verification failed, continuing"
				),
			}
		}

		for call in &plan.calls {
			if let Some(label) = &call.label {
				println!("{label}");
			}

			let to = table.get(&call.target)?;
			let function = artifacts::parse_method(&call.method)?;
			let values = resolve_args(&call.args, &table)?;
			let input = artifacts::encode_call(&function, &values)?;
			let confirmations = call.confirmations.unwrap_or(plan.confirmations);
			debug!(contract = %call.target, method = %call.method, calldata = ?input, "calling");

			let receipt = self
				.chain
				.send(to, input, confirmations)
				.await
				.with_context(|| format!("{}.{}", call.target, function.signature()))?;
			info!(
				contract = %call.target,
				method = %function.name,
				tx = %receipt.tx_hash,
				confirmations,
				"configured"
			);
		}

		Ok(Report {
			network: self.network.name.clone(),
			deployed,
			table,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn report_lists_new_contracts_then_table() {
		let mut table = AddressTable::new();
		table.set("Token", Address::with_last_byte(1));
		table.insert("Packs", Address::with_last_byte(2)).unwrap();

		let report = Report {
			network: "bscTestnet".into(),
			deployed: vec![("Packs".into(), Address::with_last_byte(2))],
			table,
		};
		let text = report.render();
		let lines: Vec<_> = text.lines().collect();

		assert_eq!(lines[0], "// bscTestnet");
		assert_eq!(lines[1], format!("// Packs: {}", Address::with_last_byte(2)));
		assert_eq!(lines[2], "");
		assert_eq!(lines[3], "[addresses]");
		assert_eq!(lines.len(), 6);
	}
}
