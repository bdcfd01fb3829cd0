use std::time::Duration;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};

use crate::networks::PRIVATE_KEY_ENV;

/// How long to wait for a submitted transaction to collect its
/// confirmations before giving up.
const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(600);

/// What the orchestrator needs to know about a mined transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
	pub tx_hash: B256,
	pub block_number: Option<u64>,
	/// Set for contract-creation transactions.
	pub contract_address: Option<Address>,
}

/// The on-chain side of a deployment. Each submitting call returns only
/// once the transaction has the requested number of confirmations.
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
	/// The account transactions are sent from, if a key is available.
	fn signer(&self) -> Option<Address>;

	async fn chain_id(&self) -> Result<u64>;

	/// Submit a contract-creation transaction.
	async fn deploy(&self, code: Bytes, confirmations: u64) -> Result<Receipt>;

	/// Submit a call to an existing contract.
	async fn send(&self, to: Address, input: Bytes, confirmations: u64) -> Result<Receipt>;
}

/// Status of a transaction as seen by `tx status`.
#[derive(Debug, Clone, PartialEq)]
pub struct TxStatus {
	pub success: bool,
	pub block_number: Option<u64>,
	pub confirmations: u64,
	pub contract_address: Option<Address>,
}

/// JSON-RPC backed [`Chain`], signing locally with the deployer's key.
pub struct RpcChain {
	provider: DynProvider,
	signer: Option<Address>,
}

impl RpcChain {
	/// Connect to `url`. Without a key the chain can still be queried,
	/// but every submission fails.
	pub fn connect(url: &str, private_key: Option<&str>) -> Result<Self> {
		let url: reqwest::Url = url
			.parse()
			.with_context(|| format!("invalid RPC URL: {url}"))?;

		match private_key {
			Some(key) => {
				let signer: PrivateKeySigner = key
					.trim()
					.parse()
					.with_context(|| format!("{PRIVATE_KEY_ENV} is not a valid private key"))?;
				let address = signer.address();
				let provider = ProviderBuilder::new()
					.wallet(EthereumWallet::from(signer))
					.connect_http(url)
					.erased();
				Ok(Self {
					provider,
					signer: Some(address),
				})
			}
			None => Ok(Self {
				provider: ProviderBuilder::new().connect_http(url).erased(),
				signer: None,
			}),
		}
	}

	/// Connect using the key from the environment, if one is set.
	pub fn from_env(url: &str) -> Result<Self> {
		let key = std::env::var(PRIVATE_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
		Self::connect(url, key.as_deref())
	}

	async fn submit(&self, tx: TransactionRequest, confirmations: u64) -> Result<Receipt> {
		if self.signer.is_none() {
			bail!("no signing key available: set {PRIVATE_KEY_ENV}");
		}

		let pending = self.provider.send_transaction(tx).await?;
		let tx_hash = *pending.tx_hash();
		info!(%tx_hash, confirmations, "transaction submitted");

		let receipt = pending
			.with_required_confirmations(confirmations.max(1))
			.with_timeout(Some(CONFIRMATION_TIMEOUT))
			.get_receipt()
			.await
			.with_context(|| format!("waiting for {tx_hash}"))?;

		if !receipt.status() {
			bail!("transaction {tx_hash} reverted");
		}
		debug!(%tx_hash, block = ?receipt.block_number, gas_used = receipt.gas_used, "confirmed");

		Ok(Receipt {
			tx_hash,
			block_number: receipt.block_number,
			contract_address: receipt.contract_address,
		})
	}

	pub async fn tip(&self) -> Result<u64> {
		Ok(self.provider.get_block_number().await?)
	}

	/// Look up a transaction's receipt and how deep it is buried.
	pub async fn status(&self, tx_hash: B256) -> Result<Option<TxStatus>> {
		let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? else {
			return Ok(None);
		};
		let tip = self.tip().await?;
		let confirmations = receipt
			.block_number
			.map(|b| tip.saturating_sub(b) + 1)
			.unwrap_or(0);

		Ok(Some(TxStatus {
			success: receipt.status(),
			block_number: receipt.block_number,
			confirmations,
			contract_address: receipt.contract_address,
		}))
	}
}

#[async_trait::async_trait]
impl Chain for RpcChain {
	fn signer(&self) -> Option<Address> {
		self.signer
	}

	async fn chain_id(&self) -> Result<u64> {
		Ok(self.provider.get_chain_id().await?)
	}

	async fn deploy(&self, code: Bytes, confirmations: u64) -> Result<Receipt> {
		let tx = TransactionRequest::default().with_deploy_code(code);
		let receipt = self.submit(tx, confirmations).await?;
		if receipt.contract_address.is_none() {
			return Err(anyhow!(
				"creation transaction {} produced no contract address",
				receipt.tx_hash
			));
		}
		Ok(receipt)
	}

	async fn send(&self, to: Address, input: Bytes, confirmations: u64) -> Result<Receipt> {
		let tx = TransactionRequest::default().with_to(to).with_input(input);
		self.submit(tx, confirmations).await
	}
}

/// Parse a 0x-prefixed transaction hash.
pub fn parse_tx_hash(s: &str) -> Result<B256> {
	s.trim()
		.parse()
		.map_err(|e| anyhow!("invalid transaction hash `{s}`: {e}"))
}
