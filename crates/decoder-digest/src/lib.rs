//! EIP-712 digests signed by Safe owners.
//!
//! Safe contracts changed their typed-data layout twice:
//!
//! - before `1.0.0` the SafeTx refund gas field was called `dataGas`;
//!   from `1.0.0` on it is `baseGas`. The value is the same, but the field
//!   name is part of the type hash.
//! - before `1.3.0` the domain only binds `verifyingContract`; from `1.3.0`
//!   on it also binds `chainId`.
//!
//! A Safe without a known version (not yet deployed) has no defined domain,
//! so every function here returns `None` for it rather than guessing.

mod encoder;

pub use encoder::{signing_digest, StructEncoder};

use alloy_dyn_abi::TypedData;
use alloy_primitives::{eip191_hash_message, keccak256, Address, B256, U256};
use decoder_types::{SafeTransaction, SafeVersion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain type for Safes older than 1.3.0.
pub const DOMAIN_TYPE_LEGACY: &str = "EIP712Domain(address verifyingContract)";
/// Domain type for Safe 1.3.0 and later.
pub const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";
/// SafeTx type for Safes older than 1.0.0.
pub const SAFE_TX_TYPE_DATA_GAS: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 dataGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";
/// SafeTx type for Safe 1.0.0 and later.
pub const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";
/// SafeMessage type, identical across versions.
pub const SAFE_MESSAGE_TYPE: &str = "SafeMessage(bytes message)";

/// Errors that can occur while hashing off-chain messages.
#[derive(Debug, Error)]
pub enum DigestError {
	/// An EIP-712 typed-data message could not be hashed.
	#[error("Invalid typed data: {0}")]
	TypedData(String),
}

/// An off-chain message as submitted for signing.
///
/// A JSON string is a plain text message; a JSON object is an EIP-712
/// typed-data document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
	Text(String),
	TypedData(Box<TypedData>),
}

impl MessageContent {
	/// The hash the Safe wraps in its own `SafeMessage` struct.
	///
	/// Text is hashed as an EIP-191 personal message; typed data is hashed
	/// with its own domain.
	pub fn hash(&self) -> Result<B256, DigestError> {
		match self {
			MessageContent::Text(text) => Ok(eip191_hash_message(text.as_bytes())),
			MessageContent::TypedData(typed) => typed
				.eip712_signing_hash()
				.map_err(|e| DigestError::TypedData(e.to_string())),
		}
	}
}

/// Name of the SafeTx refund gas field for `version`.
pub fn base_gas_field_name(version: &SafeVersion) -> &'static str {
	if version.at_least(&SafeVersion::BASE_GAS_FIELD) {
		"baseGas"
	} else {
		"dataGas"
	}
}

/// EIP-712 domain separator of the Safe at `safe`.
pub fn domain_hash(version: Option<&SafeVersion>, chain_id: u64, safe: Address) -> Option<B256> {
	let version = version?;
	let hash = if version.at_least(&SafeVersion::CHAIN_ID_IN_DOMAIN) {
		StructEncoder::new(DOMAIN_TYPE)
			.uint(U256::from(chain_id))
			.address(safe)
			.hash()
	} else {
		StructEncoder::new(DOMAIN_TYPE_LEGACY).address(safe).hash()
	};
	Some(hash)
}

/// Struct hash of a SafeTx.
///
/// Returns `None` when the version is unknown or when `data`, any gas
/// field, `gasToken` or `refundReceiver` has not been populated yet.
pub fn safe_tx_message_hash(version: Option<&SafeVersion>, tx: &SafeTransaction) -> Option<B256> {
	let version = version?;
	let data = tx.data.as_ref()?;
	let safe_tx_gas = tx.safe_tx_gas?;
	let base_gas = tx.base_gas?;
	let gas_price = tx.gas_price?;
	let gas_token = tx.gas_token?;
	let refund_receiver = tx.refund_receiver?;

	let type_string = if version.at_least(&SafeVersion::BASE_GAS_FIELD) {
		SAFE_TX_TYPE
	} else {
		SAFE_TX_TYPE_DATA_GAS
	};

	let hash = StructEncoder::new(type_string)
		.address(tx.to)
		.uint(tx.value)
		.bytes(data)
		.uint8(tx.operation.as_u8())
		.uint(safe_tx_gas)
		.uint(base_gas)
		.uint(gas_price)
		.address(gas_token)
		.address(refund_receiver)
		.uint(tx.nonce)
		.hash();
	Some(hash)
}

/// The SafeTx digest owners sign: `keccak256(0x1901 ‖ domain ‖ struct)`.
pub fn safe_tx_hash(
	version: Option<&SafeVersion>,
	chain_id: u64,
	safe: Address,
	tx: &SafeTransaction,
) -> Option<B256> {
	let domain = domain_hash(version, chain_id, safe)?;
	let message = safe_tx_message_hash(version, tx)?;
	Some(signing_digest(&domain, &message))
}

/// Struct hash of a SafeMessage wrapping `message`.
pub fn safe_message_message_hash(message: &MessageContent) -> Result<B256, DigestError> {
	let inner = message.hash()?;
	Ok(StructEncoder::new(SAFE_MESSAGE_TYPE)
		.bytes(inner.as_slice())
		.hash())
}

/// The SafeMessage digest owners sign.
///
/// `Ok(None)` when the Safe version is unknown.
pub fn safe_message_hash(
	version: Option<&SafeVersion>,
	chain_id: u64,
	safe: Address,
	message: &MessageContent,
) -> Result<Option<B256>, DigestError> {
	let Some(domain) = domain_hash(version, chain_id, safe) else {
		tracing::debug!(%safe, "No domain for a Safe without a version");
		return Ok(None);
	};
	let message = safe_message_message_hash(message)?;
	Ok(Some(signing_digest(&domain, &message)))
}

/// Keccak-256 of an EIP-712 type string.
pub fn type_hash(type_string: &str) -> B256 {
	keccak256(type_string.as_bytes())
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, b256, Bytes};
	use alloy_sol_types::{eip712_domain, sol, SolStruct};
	use decoder_types::Operation;

	sol! {
		struct SafeTx {
			address to;
			uint256 value;
			bytes data;
			uint8 operation;
			uint256 safeTxGas;
			uint256 baseGas;
			uint256 gasPrice;
			address gasToken;
			address refundReceiver;
			uint256 nonce;
		}

		struct SafeMessage {
			bytes message;
		}
	}

	mod legacy {
		alloy_sol_types::sol! {
			struct SafeTx {
				address to;
				uint256 value;
				bytes data;
				uint8 operation;
				uint256 safeTxGas;
				uint256 dataGas;
				uint256 gasPrice;
				address gasToken;
				address refundReceiver;
				uint256 nonce;
			}
		}
	}

	const SAFE: Address = address!("a063Cb7CFd8E57c30c788A0572CBbf2129ae56B6");
	const CHAIN_ID: u64 = 11155111;

	fn v(s: &str) -> SafeVersion {
		s.parse().unwrap()
	}

	fn transaction() -> SafeTransaction {
		SafeTransaction {
			to: address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
			value: U256::from(1_000_000_000_000_000u64),
			data: Some(Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb, 0x00, 0x01])),
			operation: Operation::DelegateCall,
			safe_tx_gas: Some(U256::from(50_000)),
			base_gas: Some(U256::from(21_000)),
			gas_price: Some(U256::from(3)),
			gas_token: Some(Address::ZERO),
			refund_receiver: Some(address!("00000000000000000000000000000000000000aa")),
			nonce: U256::from(42),
		}
	}

	fn reference_tx(tx: &SafeTransaction) -> SafeTx {
		SafeTx {
			to: tx.to,
			value: tx.value,
			data: tx.data.clone().unwrap_or_default(),
			operation: tx.operation.as_u8(),
			safeTxGas: tx.safe_tx_gas.unwrap_or_default(),
			baseGas: tx.base_gas.unwrap_or_default(),
			gasPrice: tx.gas_price.unwrap_or_default(),
			gasToken: tx.gas_token.unwrap_or_default(),
			refundReceiver: tx.refund_receiver.unwrap_or_default(),
			nonce: tx.nonce,
		}
	}

	fn reference_legacy_tx(tx: &SafeTransaction) -> legacy::SafeTx {
		let r = reference_tx(tx);
		legacy::SafeTx {
			to: r.to,
			value: r.value,
			data: r.data,
			operation: r.operation,
			safeTxGas: r.safeTxGas,
			dataGas: r.baseGas,
			gasPrice: r.gasPrice,
			gasToken: r.gasToken,
			refundReceiver: r.refundReceiver,
			nonce: r.nonce,
		}
	}

	#[test]
	fn test_type_hashes() {
		assert_eq!(
			type_hash(DOMAIN_TYPE_LEGACY),
			b256!("035aff83d86937d35b32e04f0ddc6ff469290eef2f1b692d8a815c89404d4749")
		);
		assert_eq!(
			type_hash(DOMAIN_TYPE),
			b256!("47e79534a245952e8b16893a336b85a3d9ea9fa8c573f3d803afb92a79469218")
		);
		assert_eq!(
			type_hash(SAFE_TX_TYPE),
			b256!("bb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8")
		);
		assert_eq!(
			type_hash(SAFE_TX_TYPE_DATA_GAS),
			b256!("14d461bc7412367e924637b363c7bf29b8f47e2f84869f4426e5633d8af47b20")
		);
		assert_eq!(
			type_hash(SAFE_MESSAGE_TYPE),
			b256!("60b3cbf8b4a223d68d641b3b6ddf9a298e7f33710cf3d3a9d1146b5a6150fbca")
		);
	}

	#[test]
	fn test_domain_omits_chain_id_before_1_3_0() {
		let legacy = eip712_domain! { verifying_contract: SAFE, }.hash_struct();
		let current = eip712_domain! { chain_id: CHAIN_ID, verifying_contract: SAFE, }.hash_struct();

		for version in ["0.1.0", "1.0.0", "1.1.1", "1.2.0"] {
			assert_eq!(domain_hash(Some(&v(version)), CHAIN_ID, SAFE), Some(legacy), "{}", version);
		}
		for version in ["1.3.0", "1.3.0+L2", "1.4.1", "1.10.0"] {
			assert_eq!(domain_hash(Some(&v(version)), CHAIN_ID, SAFE), Some(current), "{}", version);
		}
		assert_eq!(domain_hash(None, CHAIN_ID, SAFE), None);
	}

	#[test]
	fn test_base_gas_field_name() {
		assert_eq!(base_gas_field_name(&v("0.1.0")), "dataGas");
		assert_eq!(base_gas_field_name(&v("1.0.0")), "baseGas");
		assert_eq!(base_gas_field_name(&v("1.10.0")), "baseGas");
	}

	#[test]
	fn test_safe_tx_message_hash_matches_reference() {
		let tx = transaction();

		assert_eq!(
			safe_tx_message_hash(Some(&v("1.3.0")), &tx),
			Some(reference_tx(&tx).eip712_hash_struct())
		);
		assert_eq!(
			safe_tx_message_hash(Some(&v("1.0.0")), &tx),
			Some(reference_tx(&tx).eip712_hash_struct())
		);
		assert_eq!(
			safe_tx_message_hash(Some(&v("0.1.0")), &tx),
			Some(reference_legacy_tx(&tx).eip712_hash_struct())
		);
		assert_ne!(
			safe_tx_message_hash(Some(&v("0.1.0")), &tx),
			safe_tx_message_hash(Some(&v("1.0.0")), &tx)
		);
	}

	#[test]
	fn test_safe_tx_hash_matches_reference_signing_hash() {
		let tx = transaction();

		let domain = eip712_domain! { chain_id: CHAIN_ID, verifying_contract: SAFE, };
		assert_eq!(
			safe_tx_hash(Some(&v("1.4.1")), CHAIN_ID, SAFE, &tx),
			Some(reference_tx(&tx).eip712_signing_hash(&domain))
		);

		let domain = eip712_domain! { verifying_contract: SAFE, };
		assert_eq!(
			safe_tx_hash(Some(&v("1.2.0")), CHAIN_ID, SAFE, &tx),
			Some(reference_tx(&tx).eip712_signing_hash(&domain))
		);
		assert_eq!(
			safe_tx_hash(Some(&v("0.1.0")), CHAIN_ID, SAFE, &tx),
			Some(reference_legacy_tx(&tx).eip712_signing_hash(&domain))
		);
	}

	#[test]
	fn test_incomplete_transaction_has_no_hash() {
		let version = v("1.3.0");
		let mut tx = transaction();
		tx.gas_token = None;
		assert_eq!(safe_tx_message_hash(Some(&version), &tx), None);

		let mut tx = transaction();
		tx.data = None;
		assert_eq!(safe_tx_hash(Some(&version), CHAIN_ID, SAFE, &tx), None);

		assert_eq!(safe_tx_message_hash(None, &transaction()), None);
	}

	#[test]
	fn test_text_message_hash() {
		let message: MessageContent = serde_json::from_str("\"Hello, Safe!\"").unwrap();
		let inner = eip191_hash_message("Hello, Safe!");
		let expected = SafeMessage {
			message: inner.to_vec().into(),
		};

		assert_eq!(
			safe_message_message_hash(&message).unwrap(),
			expected.eip712_hash_struct()
		);

		let domain = eip712_domain! { chain_id: CHAIN_ID, verifying_contract: SAFE, };
		assert_eq!(
			safe_message_hash(Some(&v("1.3.0")), CHAIN_ID, SAFE, &message).unwrap(),
			Some(expected.eip712_signing_hash(&domain))
		);
		assert_eq!(safe_message_hash(None, CHAIN_ID, SAFE, &message).unwrap(), None);
	}

	#[test]
	fn test_typed_data_message_hash() {
		let message: MessageContent = serde_json::from_value(serde_json::json!({
			"types": {
				"EIP712Domain": [
					{ "name": "name", "type": "string" },
					{ "name": "version", "type": "string" },
					{ "name": "chainId", "type": "uint256" },
					{ "name": "verifyingContract", "type": "address" }
				],
				"Person": [
					{ "name": "name", "type": "string" },
					{ "name": "wallet", "type": "address" }
				],
				"Mail": [
					{ "name": "from", "type": "Person" },
					{ "name": "to", "type": "Person" },
					{ "name": "contents", "type": "string" }
				]
			},
			"primaryType": "Mail",
			"domain": {
				"name": "Ether Mail",
				"version": "1",
				"chainId": 1,
				"verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
			},
			"message": {
				"from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
				"to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
				"contents": "Hello, Bob!"
			}
		}))
		.unwrap();

		assert!(matches!(message, MessageContent::TypedData(_)));
		let inner = b256!("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2");
		assert_eq!(message.hash().unwrap(), inner);

		let expected = SafeMessage {
			message: inner.to_vec().into(),
		};
		assert_eq!(
			safe_message_message_hash(&message).unwrap(),
			expected.eip712_hash_struct()
		);
	}
}
