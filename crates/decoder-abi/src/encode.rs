//! ABI encoding.

use crate::types::{ParamType, Token};
use crate::AbiError;
use alloy_primitives::U256;

/// Encodes values as a top-level tuple (head region followed by tails).
///
/// Tokens are not validated here. A `FixedBytes` longer than 32 bytes is
/// cut to its first word; use [`encode_params`] to reject such input.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
	encode_sequence(tokens)
}

/// Encodes `tokens` after checking them against the declared `types`.
pub fn encode_params(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
	if types.len() != tokens.len() {
		return Err(AbiError::InvalidArgument(format!(
			"Expected {} arguments, got {}",
			types.len(),
			tokens.len()
		)));
	}
	for (i, (kind, token)) in types.iter().zip(tokens).enumerate() {
		if !token.type_check(kind) {
			return Err(AbiError::InvalidArgument(format!(
				"Argument {} is not a valid {}",
				i, kind
			)));
		}
	}
	Ok(encode_sequence(tokens))
}

fn encode_sequence(tokens: &[Token]) -> Vec<u8> {
	let head_len: usize = tokens.iter().map(Token::head_size).sum();
	let mut head = Vec::with_capacity(head_len);
	let mut tail = Vec::new();

	for token in tokens {
		if token.is_dynamic() {
			push_usize(&mut head, head_len + tail.len());
			encode_tail(token, &mut tail);
		} else {
			encode_static(token, &mut head);
		}
	}

	head.extend_from_slice(&tail);
	head
}

fn encode_tail(token: &Token, out: &mut Vec<u8>) {
	match token {
		Token::Bytes(bytes) => {
			push_usize(out, bytes.len());
			out.extend_from_slice(bytes);
			out.resize(out.len() + padding(bytes.len()), 0);
		},
		Token::Array(items) => {
			push_usize(out, items.len());
			out.extend_from_slice(&encode_sequence(items));
		},
		Token::Tuple(tokens) => out.extend_from_slice(&encode_sequence(tokens)),
		other => encode_static(other, out),
	}
}

fn encode_static(token: &Token, out: &mut Vec<u8>) {
	match token {
		Token::Address(address) => {
			out.extend_from_slice(&[0u8; 12]);
			out.extend_from_slice(address.as_slice());
		},
		Token::Uint(value) => out.extend_from_slice(&value.to_be_bytes::<32>()),
		Token::Bool(b) => push_usize(out, usize::from(*b)),
		Token::FixedBytes(bytes) => {
			let mut word = [0u8; 32];
			let len = bytes.len().min(32);
			word[..len].copy_from_slice(&bytes[..len]);
			out.extend_from_slice(&word);
		},
		Token::Tuple(tokens) => {
			for token in tokens {
				encode_static(token, out);
			}
		},
		Token::Bytes(_) | Token::Array(_) => encode_tail(token, out),
	}
}

fn push_usize(out: &mut Vec<u8>, value: usize) {
	out.extend_from_slice(&U256::from(value).to_be_bytes::<32>());
}

fn padding(len: usize) -> usize {
	(32 - len % 32) % 32
}
