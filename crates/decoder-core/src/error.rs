//! Fatal decode failures.
//!
//! A non-match is never an error: decoders return `Ok(None)` when calldata
//! is not the shape they look for. The variants below mean a payload was
//! recognised and then turned out to be unusable, which aborts decoding of
//! that one transaction.

use decoder_abi::AbiError;
use decoder_types::Address;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	/// A selector matched but the arguments could not be decoded.
	#[error("ABI decoding failed: {0}")]
	Abi(#[from] AbiError),
	/// A MultiSend payload is truncated or contains an invalid operation.
	#[error("Malformed MultiSend batch: {0}")]
	MalformedBatch(String),
	/// A ComposableCoW registration uses a handler other than the TWAP handler.
	#[error("Unsupported conditional order handler {0}")]
	InvalidHandler(Address),
	/// The settings classifier was handed a method outside the owner-manager set.
	#[error("Unknown settings method: {0}")]
	UnknownSettingsMethod(String),
	/// A decoded call lacks the argument expected at a fixed position.
	#[error("Missing parameter {index} of {method}")]
	MissingParameter { method: String, index: usize },
}
