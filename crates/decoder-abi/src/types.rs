//! ABI type and value definitions.

use crate::AbiError;
use alloy_primitives::{hex, Address, Bytes, U256};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Solidity parameter types understood by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
	Address,
	/// Unsigned integer of the given bit width (8..=256, multiple of 8).
	Uint(usize),
	Bool,
	/// Dynamic byte string.
	Bytes,
	/// Fixed byte string of the given length (1..=32).
	FixedBytes(usize),
	/// Dynamic-length array.
	Array(Box<ParamType>),
	Tuple(Vec<ParamType>),
}

impl ParamType {
	/// True when the value is encoded in the tail region behind an offset.
	pub fn is_dynamic(&self) -> bool {
		match self {
			ParamType::Bytes | ParamType::Array(_) => true,
			ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
			_ => false,
		}
	}

	/// Size of the value's head: one offset word for dynamic types, the
	/// full inline encoding for static ones.
	pub fn head_size(&self) -> usize {
		match self {
			ParamType::Tuple(types) if !self.is_dynamic() => {
				types.iter().map(|t| t.head_size()).sum()
			},
			_ => 32,
		}
	}
}

impl fmt::Display for ParamType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParamType::Address => write!(f, "address"),
			ParamType::Uint(bits) => write!(f, "uint{}", bits),
			ParamType::Bool => write!(f, "bool"),
			ParamType::Bytes => write!(f, "bytes"),
			ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
			ParamType::Array(inner) => write!(f, "{}[]", inner),
			ParamType::Tuple(types) => {
				write!(f, "(")?;
				for (i, t) in types.iter().enumerate() {
					if i > 0 {
						write!(f, ",")?;
					}
					write!(f, "{}", t)?;
				}
				write!(f, ")")
			},
		}
	}
}

impl FromStr for ParamType {
	type Err = AbiError;

	/// Parses a type string such as `uint256`, `bytes32[]` or
	/// `(address handler,bytes32 salt,bytes staticInput)`. Component names
	/// inside tuples are accepted and dropped.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();

		if let Some(inner) = s.strip_suffix("[]") {
			return Ok(ParamType::Array(Box::new(inner.parse()?)));
		}

		if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
			let components = crate::function::split_top_level(inner)?
				.into_iter()
				.map(|component| crate::function::Param::parse(component).map(|p| p.kind))
				.collect::<Result<Vec<_>, _>>()?;
			return Ok(ParamType::Tuple(components));
		}

		match s {
			"address" => return Ok(ParamType::Address),
			"bool" => return Ok(ParamType::Bool),
			"bytes" => return Ok(ParamType::Bytes),
			"uint" => return Ok(ParamType::Uint(256)),
			_ => {},
		}

		if let Some(bits) = s.strip_prefix("uint") {
			let bits: usize = bits
				.parse()
				.map_err(|_| AbiError::InvalidSignature(format!("Unknown type '{}'", s)))?;
			if bits == 0 || bits > 256 || bits % 8 != 0 {
				return Err(AbiError::InvalidSignature(format!(
					"Invalid integer width in '{}'",
					s
				)));
			}
			return Ok(ParamType::Uint(bits));
		}

		if let Some(size) = s.strip_prefix("bytes") {
			let size: usize = size
				.parse()
				.map_err(|_| AbiError::InvalidSignature(format!("Unknown type '{}'", s)))?;
			if size == 0 || size > 32 {
				return Err(AbiError::InvalidSignature(format!(
					"Invalid fixed bytes size in '{}'",
					s
				)));
			}
			return Ok(ParamType::FixedBytes(size));
		}

		Err(AbiError::InvalidSignature(format!("Unknown type '{}'", s)))
	}
}

impl Serialize for ParamType {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// A decoded (or to-be-encoded) ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	Address(Address),
	Uint(U256),
	Bool(bool),
	Bytes(Bytes),
	/// Fixed-size bytes; the length is the `N` of `bytesN`.
	FixedBytes(Vec<u8>),
	Array(Vec<Token>),
	Tuple(Vec<Token>),
}

impl Token {
	/// True when this value is encoded in the tail region.
	pub fn is_dynamic(&self) -> bool {
		match self {
			Token::Bytes(_) | Token::Array(_) => true,
			Token::Tuple(tokens) => tokens.iter().any(|t| t.is_dynamic()),
			_ => false,
		}
	}

	pub(crate) fn head_size(&self) -> usize {
		match self {
			Token::Tuple(tokens) if !self.is_dynamic() => {
				tokens.iter().map(|t| t.head_size()).sum()
			},
			_ => 32,
		}
	}

	/// Whether this value is a valid instance of `kind`.
	///
	/// Integer values must fit the declared width and fixed bytes must have
	/// exactly the declared length.
	pub fn type_check(&self, kind: &ParamType) -> bool {
		match (self, kind) {
			(Token::Address(_), ParamType::Address) => true,
			(Token::Uint(v), ParamType::Uint(bits)) => v.bit_len() <= *bits,
			(Token::Bool(_), ParamType::Bool) => true,
			(Token::Bytes(_), ParamType::Bytes) => true,
			(Token::FixedBytes(b), ParamType::FixedBytes(size)) => b.len() == *size,
			(Token::Array(items), ParamType::Array(inner)) => {
				items.iter().all(|item| item.type_check(inner))
			},
			(Token::Tuple(tokens), ParamType::Tuple(types)) => {
				tokens.len() == types.len()
					&& tokens.iter().zip(types).all(|(t, k)| t.type_check(k))
			},
			_ => false,
		}
	}

	pub fn as_address(&self) -> Option<Address> {
		match self {
			Token::Address(a) => Some(*a),
			_ => None,
		}
	}

	pub fn as_uint(&self) -> Option<U256> {
		match self {
			Token::Uint(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Token::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Contents of a `bytes` or `bytesN` value.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Token::Bytes(b) => Some(&b[..]),
			Token::FixedBytes(b) => Some(b.as_slice()),
			_ => None,
		}
	}

	pub fn as_tuple(&self) -> Option<&[Token]> {
		match self {
			Token::Tuple(tokens) => Some(tokens.as_slice()),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Token]> {
		match self {
			Token::Array(items) => Some(items.as_slice()),
			_ => None,
		}
	}
}

/// JSON rendering: checksummed addresses, decimal integers, `0x` hex bytes.
impl Serialize for Token {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Token::Address(a) => serializer.serialize_str(&a.to_checksum(None)),
			Token::Uint(v) => serializer.collect_str(v),
			Token::Bool(b) => serializer.serialize_bool(*b),
			Token::Bytes(b) => serializer.serialize_str(&hex::encode_prefixed(b)),
			Token::FixedBytes(b) => serializer.serialize_str(&hex::encode_prefixed(b)),
			Token::Array(tokens) | Token::Tuple(tokens) => {
				let mut seq = serializer.serialize_seq(Some(tokens.len()))?;
				for token in tokens {
					seq.serialize_element(token)?;
				}
				seq.end()
			},
		}
	}
}
