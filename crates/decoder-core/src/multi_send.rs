//! MultiSend batch decoding.
//!
//! `multiSend(bytes transactions)` takes a single byte string in which
//! sub-calls are packed back to back, without ABI padding:
//!
//! | field       | size           |
//! |-------------|----------------|
//! | operation   | 1              |
//! | to          | 20             |
//! | value       | 32             |
//! | data length | 32             |
//! | data        | data length    |

use crate::DecodeError;
use alloy_primitives::{hex, Address, Bytes, Selector, U256};
use decoder_abi::{encode, FunctionSignature, Param, ParamType, Token};
use decoder_types::{BatchEntry, Operation};
use once_cell::sync::Lazy;

/// Selector of `multiSend(bytes)`.
pub const MULTI_SEND_SELECTOR: Selector = Selector::new(hex!("8d80ff0a"));

const ENTRY_HEADER_LEN: usize = 1 + 20 + 32 + 32;

static MULTI_SEND: Lazy<FunctionSignature> = Lazy::new(|| {
	FunctionSignature::new("multiSend", vec![Param::new("transactions", ParamType::Bytes)])
});

/// Selector-only check; never inspects the payload.
pub fn is_multi_send(data: &[u8]) -> bool {
	data.get(..4) == Some(MULTI_SEND_SELECTOR.as_slice())
}

/// Unpacks a `multiSend` call into its sub-calls, in execution order.
///
/// Returns `Ok(None)` when `data` is not a `multiSend` call.
pub fn decode_multi_send(data: &[u8]) -> Result<Option<Vec<BatchEntry>>, DecodeError> {
	if !is_multi_send(data) {
		return Ok(None);
	}
	let call = MULTI_SEND.decode_args(&data[4..])?;
	let packed = call
		.bytes_arg(0)
		.ok_or_else(|| DecodeError::MissingParameter {
			method: call.method.clone(),
			index: 0,
		})?;
	unpack_transactions(packed).map(Some)
}

/// Reads packed entries until the buffer is exhausted.
pub fn unpack_transactions(packed: &[u8]) -> Result<Vec<BatchEntry>, DecodeError> {
	let mut entries = Vec::new();
	let mut cursor = 0;

	while cursor < packed.len() {
		let header = packed
			.get(cursor..cursor + ENTRY_HEADER_LEN)
			.ok_or_else(|| {
				DecodeError::MalformedBatch(format!(
					"Entry {} at byte {} is truncated",
					entries.len(),
					cursor
				))
			})?;

		let operation = Operation::try_from(header[0]).map_err(|e| {
			DecodeError::MalformedBatch(format!("Entry {}: {}", entries.len(), e))
		})?;
		let to = Address::from_slice(&header[1..21]);
		let value = U256::from_be_slice(&header[21..53]);
		let data_len = U256::from_be_slice(&header[53..85]);

		let start = cursor + ENTRY_HEADER_LEN;
		let remaining = packed.len() - start;
		let data_len = usize::try_from(data_len)
			.ok()
			.filter(|len| *len <= remaining)
			.ok_or_else(|| {
				DecodeError::MalformedBatch(format!(
					"Entry {} declares {} data bytes but only {} remain",
					entries.len(),
					data_len,
					remaining
				))
			})?;

		entries.push(BatchEntry {
			operation,
			to,
			value,
			data: Bytes::copy_from_slice(&packed[start..start + data_len]),
		});
		cursor = start + data_len;
	}

	Ok(entries)
}

/// Packs entries into the MultiSend wire format (without the call wrapper).
pub fn pack_transactions(entries: &[BatchEntry]) -> Vec<u8> {
	let mut packed = Vec::new();
	for entry in entries {
		packed.push(entry.operation.as_u8());
		packed.extend_from_slice(entry.to.as_slice());
		packed.extend_from_slice(&entry.value.to_be_bytes::<32>());
		packed.extend_from_slice(&U256::from(entry.data.len()).to_be_bytes::<32>());
		packed.extend_from_slice(&entry.data);
	}
	packed
}

/// Builds complete `multiSend(bytes)` calldata for `entries`.
pub fn encode_multi_send(entries: &[BatchEntry]) -> Bytes {
	let mut data = MULTI_SEND_SELECTOR.to_vec();
	data.extend(encode(&[Token::Bytes(pack_transactions(entries).into())]));
	data.into()
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn sample_entries() -> Vec<BatchEntry> {
		vec![
			BatchEntry::call(
				address!("00000000000000000000000000000000000000a1"),
				U256::from(1_000_000_000_000_000_000u128),
				Bytes::new(),
			),
			BatchEntry::delegate_call(
				address!("00000000000000000000000000000000000000b2"),
				vec![0xa9, 0x05, 0x9c, 0xbb, 0x01],
			),
		]
	}

	#[test]
	fn test_selector_matches_signature() {
		assert_eq!(MULTI_SEND.selector(), MULTI_SEND_SELECTOR);
	}

	#[test]
	fn test_is_multi_send_is_selector_only() {
		assert!(is_multi_send(&hex!("8d80ff0a")));
		assert!(is_multi_send(&hex!("8d80ff0a00")));
		assert!(!is_multi_send(&hex!("8d80ff0b")));
		assert!(!is_multi_send(&hex!("8d80ff")));
		assert!(!is_multi_send(&[]));
	}

	#[test]
	fn test_decode_preserves_order_and_fields() {
		let entries = sample_entries();
		let decoded = decode_multi_send(&encode_multi_send(&entries))
			.unwrap()
			.unwrap();
		assert_eq!(decoded, entries);
	}

	#[test]
	fn test_empty_batch() {
		let decoded = decode_multi_send(&encode_multi_send(&[])).unwrap().unwrap();
		assert!(decoded.is_empty());
	}

	#[test]
	fn test_not_a_batch() {
		assert_eq!(decode_multi_send(&hex!("a9059cbb")).unwrap(), None);
	}

	#[test]
	fn test_declared_length_past_end_is_fatal() {
		let mut packed = pack_transactions(&sample_entries()[..1]);
		// Claim one more data byte than present.
		packed[84] = 1;
		assert!(matches!(
			unpack_transactions(&packed),
			Err(DecodeError::MalformedBatch(_))
		));
	}

	#[test]
	fn test_truncated_header_is_fatal() {
		let packed = pack_transactions(&sample_entries());
		assert!(matches!(
			unpack_transactions(&packed[..packed.len() - 10]),
			Err(DecodeError::MalformedBatch(_))
		));
	}

	#[test]
	fn test_invalid_operation_is_fatal() {
		let mut packed = pack_transactions(&sample_entries());
		packed[0] = 2;
		assert!(matches!(
			unpack_transactions(&packed),
			Err(DecodeError::MalformedBatch(_))
		));
	}

	#[test]
	fn test_selector_match_with_garbage_payload_is_fatal() {
		let mut data = MULTI_SEND_SELECTOR.to_vec();
		data.extend_from_slice(&[0xff; 16]);
		assert!(matches!(decode_multi_send(&data), Err(DecodeError::Abi(_))));
	}
}
