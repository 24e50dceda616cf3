//! Static address book resolver.
//!
//! Names come from the configuration file:
//!
//! ```toml
//! [resolver.implementations.address_book]
//! entries = [
//!   { address = "0x9008D19f58AAbD9eD0D60971565AA8510560ab41", name = "GPv2Settlement" },
//!   { address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", name = "USD Coin", kind = "TOKEN", chain_id = 1 },
//! ]
//! ```
//!
//! An entry without `kind` matches any requested kind; an entry without
//! `chain_id` applies to every chain.

use crate::{AddressResolver, ResolverError};
use async_trait::async_trait;
use decoder_types::{
	Address, AddressInfo, AddressKind, ConfigSchema, Field, FieldType, Schema, ValidationError,
};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
struct BookEntry {
	address: Address,
	name: String,
	#[serde(default)]
	logo_uri: Option<String>,
	#[serde(default)]
	kind: Option<AddressKind>,
	#[serde(default)]
	chain_id: Option<u64>,
}

impl BookEntry {
	fn matches(&self, chain_id: u64, kinds: &[AddressKind]) -> bool {
		let chain_ok = self.chain_id.is_none_or(|c| c == chain_id);
		let kind_ok = match self.kind {
			Some(kind) => kinds.is_empty() || kinds.contains(&kind),
			None => true,
		};
		chain_ok && kind_ok
	}

	fn to_info(&self) -> AddressInfo {
		let info = AddressInfo::new(self.address).with_name(self.name.clone());
		match &self.logo_uri {
			Some(uri) => info.with_logo_uri(uri.clone()),
			None => info,
		}
	}
}

#[derive(Debug, Deserialize)]
struct AddressBookConfig {
	#[serde(default)]
	entries: Vec<BookEntry>,
}

/// Resolver backed by a fixed list of known addresses.
pub struct AddressBookResolver {
	entries: HashMap<Address, Vec<BookEntry>>,
}

impl AddressBookResolver {
	fn new(entries: Vec<BookEntry>) -> Self {
		let mut by_address: HashMap<Address, Vec<BookEntry>> = HashMap::new();
		for entry in entries {
			by_address.entry(entry.address).or_default().push(entry);
		}
		Self {
			entries: by_address,
		}
	}

	pub fn len(&self) -> usize {
		self.entries.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[async_trait]
impl AddressResolver for AddressBookResolver {
	async fn resolve(
		&self,
		chain_id: u64,
		address: Address,
		kinds: &[AddressKind],
	) -> Result<Option<AddressInfo>, ResolverError> {
		let found = self.entries.get(&address).and_then(|candidates| {
			// Chain-specific entries win over chain-agnostic ones.
			candidates
				.iter()
				.filter(|e| e.matches(chain_id, kinds))
				.max_by_key(|e| e.chain_id.is_some())
		});
		Ok(found.map(BookEntry::to_info))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AddressBookSchema)
	}
}

/// Configuration schema for AddressBookResolver.
pub struct AddressBookSchema;

impl ConfigSchema for AddressBookSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let entry = Schema::new(
			vec![
				Field::new("address", FieldType::Address),
				Field::new("name", FieldType::String).with_validator(|v| match v.as_str() {
					Some(s) if !s.trim().is_empty() => Ok(()),
					_ => Err("name cannot be empty".to_string()),
				}),
			],
			vec![
				Field::new("logo_uri", FieldType::String),
				Field::new("kind", FieldType::String).with_validator(|v| {
					match v.as_str() {
						Some("CONTRACT") | Some("TOKEN") => Ok(()),
						_ => Err("kind must be CONTRACT or TOKEN".to_string()),
					}
				}),
				Field::new(
					"chain_id",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
			],
		);

		let schema = Schema::new(
			vec![],
			vec![Field::new(
				"entries",
				FieldType::Array(Box::new(FieldType::Table(entry))),
			)],
		);

		schema.validate(config)
	}
}

/// Factory function to create an address book resolver from configuration.
///
/// Optional configuration parameters:
/// - `entries`: array of `{ address, name, logo_uri?, kind?, chain_id? }`
pub fn create_resolver(config: &toml::Value) -> Result<Box<dyn AddressResolver>, ResolverError> {
	AddressBookSchema
		.validate(config)
		.map_err(|e| ResolverError::Configuration(format!("Invalid configuration: {}", e)))?;

	let book: AddressBookConfig = config
		.clone()
		.try_into()
		.map_err(|e| ResolverError::Configuration(format!("Invalid address book: {}", e)))?;

	let resolver = AddressBookResolver::new(book.entries);
	tracing::debug!(entries = resolver.len(), "Loaded address book");
	Ok(Box::new(resolver))
}

/// Registry for the address book resolver implementation.
pub struct Registry;

impl decoder_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "address_book";
	type Factory = crate::ResolverFactory;

	fn factory() -> Self::Factory {
		create_resolver
	}
}

impl crate::ResolverRegistry for Registry {}
