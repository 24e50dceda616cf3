//! GPv2 order pre-signatures.
//!
//! `setPreSignature(bytes orderUid, bool signed)` on the CoW Protocol
//! settlement contract authorises (or revokes) an order on behalf of the
//! calling Safe without an off-chain signature.

use crate::DecodeError;
use alloy_primitives::{hex, Address, Bytes, Selector, B256};
use decoder_abi::{FunctionSignature, Param, ParamType};
use once_cell::sync::Lazy;
use serde::Serialize;

/// Selector of `setPreSignature(bytes,bool)`.
pub const PRE_SIGNATURE_SELECTOR: Selector = Selector::new(hex!("ec6cb13f"));

static SET_PRE_SIGNATURE: Lazy<FunctionSignature> = Lazy::new(|| {
	FunctionSignature::new(
		"setPreSignature",
		vec![
			Param::new("orderUid", ParamType::Bytes),
			Param::new("signed", ParamType::Bool),
		],
	)
});

/// A GPv2 order UID: `orderDigest (32) ‖ owner (20) ‖ validTo (4)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderUid(pub Bytes);

/// The components of a canonical 56-byte order UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUidParts {
	pub order_digest: B256,
	pub owner: Address,
	pub valid_to: u32,
}

impl OrderUid {
	pub const LEN: usize = 56;

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Splits the UID, or `None` when it is not 56 bytes long.
	pub fn parts(&self) -> Option<OrderUidParts> {
		if self.0.len() != Self::LEN {
			return None;
		}
		let mut valid_to = [0u8; 4];
		valid_to.copy_from_slice(&self.0[52..56]);
		Some(OrderUidParts {
			order_digest: B256::from_slice(&self.0[..32]),
			owner: Address::from_slice(&self.0[32..52]),
			valid_to: u32::from_be_bytes(valid_to),
		})
	}
}

/// A decoded `setPreSignature` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignature {
	pub order_uid: OrderUid,
	pub signed: bool,
}

/// Selector-only check.
pub fn is_pre_signature(data: &[u8]) -> bool {
	data.get(..4) == Some(PRE_SIGNATURE_SELECTOR.as_slice())
}

/// Decodes a `setPreSignature` call, or `Ok(None)` for any other selector.
pub fn get_pre_signature(data: &[u8]) -> Result<Option<PreSignature>, DecodeError> {
	if !is_pre_signature(data) {
		return Ok(None);
	}
	let call = SET_PRE_SIGNATURE.decode_args(&data[4..])?;
	let order_uid = call
		.bytes_arg(0)
		.ok_or_else(|| DecodeError::MissingParameter {
			method: call.method.clone(),
			index: 0,
		})?;
	let signed = call
		.bool_arg(1)
		.ok_or_else(|| DecodeError::MissingParameter {
			method: call.method.clone(),
			index: 1,
		})?;

	Ok(Some(PreSignature {
		order_uid: OrderUid(Bytes::copy_from_slice(order_uid)),
		signed,
	}))
}

/// The pre-signed order UID, or `Ok(None)` for any other selector.
pub fn get_order_uid(data: &[u8]) -> Result<Option<OrderUid>, DecodeError> {
	Ok(get_pre_signature(data)?.map(|p| p.order_uid))
}
