//! Contract ABI codec for the Safe transaction decoder.
//!
//! This crate covers the fixed type universe the decoders need (addresses,
//! `uintN`, `bool`, `bytes`, `bytesN`, dynamic arrays and tuples) and the
//! function-call layer on top of it: signatures, selectors and
//! [`InterfaceDescriptor`]s that turn calldata into a [`DecodedCall`].
//!
//! Decoding is strict. A word with dirty padding, an out of range integer
//! or an offset pointing past the end of the buffer is reported as
//! [`AbiError::MalformedEncoding`] rather than being silently truncated.

pub mod decode;
pub mod encode;
pub mod function;
pub mod types;

pub use decode::{decode, decode_token};
pub use encode::{encode, encode_params};
pub use function::{DecodedCall, DecodedParam, FunctionSignature, InterfaceDescriptor, Param};
pub use types::{ParamType, Token};

use thiserror::Error;

/// Errors produced by the codec and the function-call layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
	/// The buffer is truncated, an offset is out of bounds or a word is not
	/// a valid encoding of its declared type.
	#[error("Malformed encoding: {0}")]
	MalformedEncoding(String),
	/// A function or type signature string could not be parsed.
	#[error("Invalid signature: {0}")]
	InvalidSignature(String),
	/// Values handed to the encoder do not match the declared parameter types.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
