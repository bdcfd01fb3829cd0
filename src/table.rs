use std::fmt::Write as _;

use alloy::primitives::Address;

use crate::error::PlanError;

/// Logical contract name to on-chain address, in insertion order.
///
/// Entries seeded from a plan may be overwritten while seeding; once a run
/// starts, [`AddressTable::insert`] only ever adds new names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressTable {
	entries: Vec<(String, Address)>,
}

impl AddressTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set or replace an entry (seeding only).
	pub fn set(&mut self, name: &str, address: Address) {
		match self.entries.iter_mut().find(|(n, _)| n == name) {
			Some(entry) => entry.1 = address,
			None => self.entries.push((name.to_owned(), address)),
		}
	}

	pub fn remove(&mut self, name: &str) {
		self.entries.retain(|(n, _)| n != name);
	}

	/// Record a freshly deployed contract. Names are never reassigned.
	pub fn insert(&mut self, name: &str, address: Address) -> Result<(), PlanError> {
		if self.contains(name) {
			return Err(PlanError::AlreadyPresent(name.to_owned()));
		}
		self.entries.push((name.to_owned(), address));
		Ok(())
	}

	pub fn get(&self, name: &str) -> Result<Address, PlanError> {
		self.entries
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, a)| *a)
			.ok_or_else(|| PlanError::UnknownContract(name.to_owned()))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.iter().any(|(n, _)| n == name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(n, _)| n.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
		self.entries.iter().map(|(n, a)| (n.as_str(), *a))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Render as a plan `[addresses]` section, ready to paste into the
	/// next plan revision.
	pub fn to_toml(&self) -> String {
		let mut out = String::from("[addresses]\n");
		for (name, address) in self.iter() {
			let _ = writeln!(out, "{} = \"{address}\"", toml_key(name));
		}
		out
	}
}

/// Quote `name` unless it is a valid bare TOML key.
fn toml_key(name: &str) -> String {
	let bare = !name.is_empty()
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
	if bare {
		name.to_owned()
	} else {
		toml::Value::String(name.to_owned()).to_string()
	}
}
