use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::artifacts::Artifact;
use crate::networks::Explorer;

/// Everything an explorer needs to match deployed bytecode to source.
pub struct VerifyRequest<'a> {
	pub address: Address,
	pub artifact: &'a Artifact,
	/// ABI-encoded constructor arguments, exactly as deployed.
	pub constructor_args: &'a [u8],
}

/// Publishes contract source to a block explorer. Purely informational:
/// callers treat failures as non-fatal.
#[async_trait::async_trait]
pub trait Verifier: Send + Sync {
	async fn verify(&self, request: &VerifyRequest<'_>) -> Result<()>;
}

/// Stand-in for networks without a block explorer.
pub struct NoExplorer {
	pub network: String,
}

#[async_trait::async_trait]
impl Verifier for NoExplorer {
	async fn verify(&self, _request: &VerifyRequest<'_>) -> Result<()> {
		Err(anyhow!("network {} has no block explorer", self.network))
	}
}

/// Verifies through an Etherscan-compatible API (`module=contract`).
pub struct ExplorerVerifier {
	explorer: Explorer,
	http: reqwest::Client,
	poll_interval: Duration,
	max_polls: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
	status: String,
	#[serde(default)]
	message: String,
	result: Value,
}

impl ApiResponse {
	fn result_text(&self) -> String {
		match &self.result {
			Value::String(s) => s.clone(),
			other => other.to_string(),
		}
	}
}

/// Verification state reported by `checkverifystatus`.
#[derive(Debug, PartialEq, Eq)]
enum PollState {
	Pending,
	Verified,
	Failed(String),
}

fn classify(result: &str) -> PollState {
	let lower = result.to_ascii_lowercase();
	if lower.contains("pending") || lower.contains("in queue") {
		PollState::Pending
	} else if lower.starts_with("pass") || lower.contains("already verified") {
		PollState::Verified
	} else {
		PollState::Failed(result.to_owned())
	}
}

/// The compiler version and standard-JSON input from a hardhat build-info file.
struct BuildInfo {
	compiler_version: String,
	input: String,
}

fn read_build_info(path: &Path) -> Result<BuildInfo> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("reading build info {}", path.display()))?;
	let json: Value = serde_json::from_str(&content)?;

	let long_version = json
		.get("solcLongVersion")
		.and_then(Value::as_str)
		.ok_or_else(|| anyhow!("{} has no solcLongVersion", path.display()))?;
	let input = json
		.get("input")
		.ok_or_else(|| anyhow!("{} has no compiler input", path.display()))?;

	Ok(BuildInfo {
		compiler_version: format!("v{long_version}"),
		input: serde_json::to_string(input)?,
	})
}

impl ExplorerVerifier {
	pub fn new(explorer: Explorer) -> Self {
		Self {
			explorer,
			http: reqwest::Client::new(),
			poll_interval: Duration::from_secs(5),
			max_polls: 12,
		}
	}

	/// Wait `interval` between status checks and give up after `max_polls`.
	pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
		self.poll_interval = interval;
		self.max_polls = max_polls;
		self
	}

	async fn submit(&self, api_key: &str, request: &VerifyRequest<'_>) -> Result<ApiResponse> {
		let build_info_path = request.artifact.build_info.as_deref().ok_or_else(|| {
			anyhow!("no build info for {}", request.artifact.contract_name)
		})?;
		let build_info = read_build_info(build_info_path)?;

		let address = request.address.to_string();
		let contract_name = request.artifact.qualified_name();
		let constructor_args = hex::encode(request.constructor_args);
		let form = [
			("apikey", api_key),
			("module", "contract"),
			("action", "verifysourcecode"),
			("contractaddress", address.as_str()),
			("sourceCode", build_info.input.as_str()),
			("codeformat", "solidity-standard-json-input"),
			("contractname", contract_name.as_str()),
			("compilerversion", build_info.compiler_version.as_str()),
			// Misspelling is part of the API.
			("constructorArguements", constructor_args.as_str()),
		];

		let resp = self
			.http
			.post(&self.explorer.api_url)
			.form(&form)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		Ok(resp)
	}

	async fn poll(&self, api_key: &str, guid: &str) -> Result<PollState> {
		let resp: ApiResponse = self
			.http
			.get(&self.explorer.api_url)
			.query(&[
				("apikey", api_key),
				("module", "contract"),
				("action", "checkverifystatus"),
				("guid", guid),
			])
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		Ok(classify(&resp.result_text()))
	}
}

#[async_trait::async_trait]
impl Verifier for ExplorerVerifier {
	async fn verify(&self, request: &VerifyRequest<'_>) -> Result<()> {
		let api_key = self.explorer.api_key().ok_or_else(|| {
			anyhow!(
				"{} is not set",
				self.explorer.api_key_env.as_deref().unwrap_or("explorer API key")
			)
		})?;

		let submitted = self.submit(&api_key, request).await?;
		let result = submitted.result_text();
		debug!(status = %submitted.status, message = %submitted.message, %result, "verification submitted");

		if classify(&result) == PollState::Verified {
			return Ok(());
		}
		if submitted.status != "1" {
			bail!("explorer rejected verification: {result}");
		}

		for _ in 0..self.max_polls {
			tokio::time::sleep(self.poll_interval).await;
			match self.poll(&api_key, &result).await? {
				PollState::Pending => continue,
				PollState::Verified => {
					info!(address = %request.address, "source verified");
					return Ok(());
				}
				PollState::Failed(reason) => bail!("verification failed: {reason}"),
			}
		}

		bail!("verification still pending after {} checks (guid {result})", self.max_polls)
	}
}
