//! Safe transaction types.
//!
//! [`SafeTransaction`] mirrors the fields a Safe owner signs over. Every gas
//! related field and the calldata are optional because transactions are
//! frequently observed before they are fully populated (for example while
//! still being proposed); digest computations return `None` in that case.

use crate::address::serialize_checksummed;
use crate::utils::uint_string;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a Safe (or a MultiSend entry) invokes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Operation {
	/// Regular `CALL`.
	#[default]
	Call,
	/// `DELEGATECALL`, executing the target's code in the Safe's context.
	DelegateCall,
}

impl Operation {
	/// Wire value of the operation.
	pub fn as_u8(self) -> u8 {
		match self {
			Operation::Call => 0,
			Operation::DelegateCall => 1,
		}
	}
}

impl TryFrom<u8> for Operation {
	type Error = String;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Operation::Call),
			1 => Ok(Operation::DelegateCall),
			other => Err(format!("Invalid operation: {}", other)),
		}
	}
}

impl From<Operation> for u8 {
	fn from(operation: Operation) -> Self {
		operation.as_u8()
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Operation::Call => write!(f, "CALL"),
			Operation::DelegateCall => write!(f, "DELEGATECALL"),
		}
	}
}

/// One sub-call unpacked from a MultiSend batch, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
	pub operation: Operation,
	#[serde(serialize_with = "serialize_checksummed")]
	pub to: Address,
	#[serde(with = "uint_string")]
	pub value: U256,
	pub data: Bytes,
}

impl BatchEntry {
	/// Creates a plain call entry.
	pub fn call(to: Address, value: U256, data: impl Into<Bytes>) -> Self {
		Self {
			operation: Operation::Call,
			to,
			value,
			data: data.into(),
		}
	}

	/// Creates a delegate-call entry.
	pub fn delegate_call(to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			operation: Operation::DelegateCall,
			to,
			value: U256::ZERO,
			data: data.into(),
		}
	}
}

/// A transaction executed (or to be executed) by a Safe account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransaction {
	#[serde(serialize_with = "serialize_checksummed")]
	pub to: Address,
	#[serde(with = "uint_string", default)]
	pub value: U256,
	#[serde(default)]
	pub data: Option<Bytes>,
	#[serde(default)]
	pub operation: Operation,
	#[serde(with = "uint_string::option", default)]
	pub safe_tx_gas: Option<U256>,
	#[serde(with = "uint_string::option", default)]
	pub base_gas: Option<U256>,
	#[serde(with = "uint_string::option", default)]
	pub gas_price: Option<U256>,
	#[serde(default)]
	pub gas_token: Option<Address>,
	#[serde(default)]
	pub refund_receiver: Option<Address>,
	#[serde(with = "uint_string")]
	pub nonce: U256,
}

/// A raw transaction as handed to the classification pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
	pub to: Address,
	#[serde(with = "uint_string", default)]
	pub value: U256,
	#[serde(default)]
	pub data: Option<Bytes>,
}

impl TransactionInput {
	pub fn new(to: Address, value: U256, data: impl Into<Bytes>) -> Self {
		Self {
			to,
			value,
			data: Some(data.into()),
		}
	}

	/// Calldata, treating an absent payload as empty.
	pub fn data(&self) -> &[u8] {
		match &self.data {
			Some(data) => &data[..],
			None => &[],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_operation_wire_values() {
		assert_eq!(Operation::try_from(0).unwrap(), Operation::Call);
		assert_eq!(Operation::try_from(1).unwrap(), Operation::DelegateCall);
		assert!(Operation::try_from(2).is_err());
		assert_eq!(u8::from(Operation::DelegateCall), 1);
	}

	#[test]
	fn test_safe_transaction_with_missing_gas_fields() {
		let json = r#"{
			"to": "0x0000000000000000000000000000000000000001",
			"value": "1000",
			"data": "0x",
			"operation": 0,
			"nonce": "7"
		}"#;

		let tx: SafeTransaction = serde_json::from_str(json).unwrap();
		assert_eq!(tx.value, U256::from(1000));
		assert_eq!(tx.nonce, U256::from(7));
		assert_eq!(tx.data, Some(Bytes::new()));
		assert!(tx.safe_tx_gas.is_none());
		assert!(tx.gas_token.is_none());
	}

	#[test]
	fn test_safe_transaction_rejects_unknown_operation() {
		let json = r#"{
			"to": "0x0000000000000000000000000000000000000001",
			"operation": 3,
			"nonce": "0"
		}"#;

		assert!(serde_json::from_str::<SafeTransaction>(json).is_err());
	}

	#[test]
	fn test_transaction_input_without_data() {
		let input: TransactionInput =
			serde_json::from_str(r#"{"to":"0x0000000000000000000000000000000000000002"}"#)
				.unwrap();
		assert!(input.data().is_empty());
		assert_eq!(input.value, U256::ZERO);
	}
}
