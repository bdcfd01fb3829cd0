use anyhow::{bail, Result};

use crate::addresses::ADDRESS_BOOK;
use crate::networks;

pub async fn run(chain_id: Option<u64>, network: Option<&str>) -> Result<()> {
	let selected = match (chain_id, network) {
		(Some(id), _) => Some(id),
		(None, Some(name)) => match networks::find(name) {
			Some(info) => Some(info.chain_id),
			None => bail!("unknown network `{name}`"),
		},
		(None, None) => None,
	};

	let ids: Vec<u64> = match selected {
		Some(id) => vec![id],
		None => ADDRESS_BOOK.chain_ids().collect(),
	};

	for id in ids {
		let name = networks::by_chain_id(id).map(|n| n.name).unwrap_or("unknown");
		let Some(book) = ADDRESS_BOOK.for_chain(id) else {
			println!("No Bonk deployment recorded for chain {id} ({name}).");
			continue;
		};
		println!("Chain {id} ({name})");
		for (contract, address) in book.entries() {
			println!("  {contract:<14} {address}");
		}
	}
	Ok(())
}
