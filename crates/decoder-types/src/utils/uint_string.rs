//! Serde helpers for wide unsigned integers.
//!
//! Values are written as decimal strings, which every JSON consumer can
//! round-trip without precision loss. Reading accepts decimal strings,
//! `0x`-prefixed hex strings and plain JSON integers.

use alloy_primitives::{Uint, U256};
use serde::{de, Deserializer, Serializer};
use std::fmt;
use std::marker::PhantomData;

pub fn serialize<S, const BITS: usize, const LIMBS: usize>(
	value: &Uint<BITS, LIMBS>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D, const BITS: usize, const LIMBS: usize>(
	deserializer: D,
) -> Result<Uint<BITS, LIMBS>, D::Error>
where
	D: Deserializer<'de>,
{
	deserializer.deserialize_any(UintVisitor(PhantomData))
}

/// Parses a decimal or `0x`-prefixed hexadecimal string.
pub fn parse<const BITS: usize, const LIMBS: usize>(s: &str) -> Result<Uint<BITS, LIMBS>, String> {
	let s = s.trim();
	let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
		Some(hex) => Uint::from_str_radix(hex, 16),
		None => Uint::from_str_radix(s, 10),
	};
	parsed.map_err(|e| format!("Invalid uint{} '{}': {}", BITS, s, e))
}

struct UintVisitor<const BITS: usize, const LIMBS: usize>(PhantomData<Uint<BITS, LIMBS>>);

impl<'de, const BITS: usize, const LIMBS: usize> de::Visitor<'de> for UintVisitor<BITS, LIMBS> {
	type Value = Uint<BITS, LIMBS>;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "a decimal or 0x-prefixed hex string, or an unsigned integer")
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
		Uint::try_from(v).map_err(|_| E::custom(format!("{} does not fit in uint{}", v, BITS)))
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
		parse(v).map_err(E::custom)
	}
}

/// Same encoding for optional values; `null` and a missing field are `None`.
pub mod option {
	use super::*;
	use serde::Deserialize;

	pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(v) => super::serialize(v, serializer),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		struct Wrapper(#[serde(with = "super")] U256);

		let value: Option<Wrapper> = Option::deserialize(deserializer)?;
		Ok(value.map(|Wrapper(v)| v))
	}
}
