//! Address enrichment types.
//!
//! The decoder never looks up display names itself. Whenever a decoded
//! value is an address that a user has to recognise (an owner, a module, a
//! guard), it is handed to an external resolver which returns an
//! [`AddressInfo`].

use alloy_primitives::Address;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Category of on-chain entity a resolver is asked to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressKind {
	/// A deployed contract (Safe, module, guard, handler, singleton).
	Contract,
	/// A token contract.
	Token,
}

impl fmt::Display for AddressKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AddressKind::Contract => write!(f, "CONTRACT"),
			AddressKind::Token => write!(f, "TOKEN"),
		}
	}
}

/// An address together with whatever display metadata could be found for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
	/// The address itself, rendered checksummed.
	#[serde(serialize_with = "serialize_checksummed")]
	pub value: Address,
	/// Human readable name, if known.
	pub name: Option<String>,
	/// Logo location, if known.
	pub logo_uri: Option<String>,
}

impl AddressInfo {
	/// Creates an `AddressInfo` carrying only the address.
	pub fn new(value: Address) -> Self {
		Self {
			value,
			name: None,
			logo_uri: None,
		}
	}

	/// Attaches a display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Attaches a logo URI.
	pub fn with_logo_uri(mut self, logo_uri: impl Into<String>) -> Self {
		self.logo_uri = Some(logo_uri.into());
		self
	}
}

impl From<Address> for AddressInfo {
	fn from(value: Address) -> Self {
		Self::new(value)
	}
}

/// Serializes an address in its EIP-55 checksummed form.
pub fn serialize_checksummed<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&address.to_checksum(None))
}
