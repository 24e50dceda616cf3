//! TWAP conditional order descriptors.
//!
//! A TWAP order sells `sell_amount` in `number_of_parts` equal slices, one
//! every `time_between_parts` seconds. The on-chain registration only stores
//! per-part amounts, so the totals here are derived by exact multiplication
//! into 512 bits, wide enough for any product of two `uint256` values.

use crate::address::serialize_checksummed;
use crate::utils::uint_string;
use alloy_primitives::{Address, B256, U256, U512};
use serde::{Deserialize, Serialize};

/// How long each part stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "durationType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationPolicy {
	/// Each part is valid for the whole interval between parts.
	Auto,
	/// Each part is valid for a fixed number of seconds.
	#[serde(rename = "LIMIT_DURATION")]
	FixedDuration {
		#[serde(with = "uint_string")]
		duration: U256,
	},
}

/// When the first part becomes valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "startType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StartPolicy {
	/// The order starts at the block in which it is registered.
	#[serde(rename = "AT_MINING_TIME")]
	AtRegistrationTime,
	/// The order starts at a fixed unix timestamp.
	#[serde(rename = "AT_EPOCH")]
	AtEpoch {
		#[serde(with = "uint_string")]
		epoch: U256,
	},
}

/// A decoded TWAP order registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwapOrder {
	#[serde(serialize_with = "serialize_checksummed")]
	pub sell_token: Address,
	#[serde(serialize_with = "serialize_checksummed")]
	pub buy_token: Address,
	#[serde(serialize_with = "serialize_checksummed")]
	pub receiver: Address,
	/// Total sell amount: `part_sell_amount × number_of_parts`.
	#[serde(with = "uint_string")]
	pub sell_amount: U512,
	/// Total minimum buy amount: `min_part_limit × number_of_parts`.
	#[serde(with = "uint_string")]
	pub buy_amount: U512,
	#[serde(with = "uint_string")]
	pub part_sell_amount: U256,
	#[serde(with = "uint_string")]
	pub min_part_limit: U256,
	#[serde(with = "uint_string")]
	pub number_of_parts: U256,
	#[serde(with = "uint_string")]
	pub time_between_parts: U256,
	pub duration_policy: DurationPolicy,
	pub start_policy: StartPolicy,
	pub app_data: B256,
	/// Salt the order was registered with on the registry.
	pub salt: B256,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_policy_wire_format() {
		let json = serde_json::to_value(DurationPolicy::FixedDuration {
			duration: U256::from(1800),
		})
		.unwrap();
		assert_eq!(
			json,
			serde_json::json!({ "durationType": "LIMIT_DURATION", "duration": "1800" })
		);

		let json = serde_json::to_value(StartPolicy::AtRegistrationTime).unwrap();
		assert_eq!(json, serde_json::json!({ "startType": "AT_MINING_TIME" }));
	}
}
