/// Deployed Bonk contracts on one chain.
pub struct ChainAddresses {
	pub token: &'static str,
	pub storage_nft: &'static str,
	pub card_nft: &'static str,
	pub permanent_nft: &'static str,
	pub consumable_nft: &'static str,
	pub packs: &'static str,
}

impl ChainAddresses {
	/// Entries under the logical names deployment plans use.
	pub fn entries(&self) -> [(&'static str, &'static str); 6] {
		[
			("Token", self.token),
			("StorageNFT", self.storage_nft),
			("CARDNFT", self.card_nft),
			("PermanentNFT", self.permanent_nft),
			("ConsumableNFT", self.consumable_nft),
			("Packs", self.packs),
		]
	}
}

/// Known deployments, keyed by chain ID.
pub struct AddressBook {
	chains: &'static [(u64, ChainAddresses)],
}

impl AddressBook {
	pub fn for_chain(&self, chain_id: u64) -> Option<&ChainAddresses> {
		self.chains
			.iter()
			.find(|(id, _)| *id == chain_id)
			.map(|(_, addrs)| addrs)
	}

	pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
		self.chains.iter().map(|(id, _)| *id)
	}
}

/// Addresses the shop front-end reads to find the game contracts. Live
/// deployments only.
pub static ADDRESS_BOOK: AddressBook = AddressBook {
	chains: &[
		(
			97,
			ChainAddresses {
				token: "0xea57226F5867a8dafc777A66ec076226aC59cC67",
				storage_nft: "0x85698c80F0cc04775511201f13d75BE65279Dfd6",
				card_nft: "0xa6E2262d4C5DDABaE02f9F155d3DfE5bad16C99D",
				permanent_nft: "0xE90Fc71D77C2ae9A0546fEDC1e40827E9E686Cf6",
				consumable_nft: "0xe16f9F8906031320b6E8025f5097f3eF670D6C6c",
				packs: "0xaF5DDAC07E86321a327f7e7e7dba82791c79FaC5",
			},
		),
	],
};
