//! ABI decoding.
//!
//! Offsets in a head region are relative to the start of the enclosing
//! tuple (or of the whole buffer at the top level), so every helper here
//! takes the slice that starts at that base.

use crate::types::{ParamType, Token};
use crate::AbiError;
use alloy_primitives::{Address, Bytes, U256};

/// Decodes a sequence of values laid out as a top-level tuple.
///
/// The buffer must be a whole number of 32-byte words.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
	if data.len() % 32 != 0 {
		return Err(AbiError::MalformedEncoding(format!(
			"Buffer length {} is not a multiple of 32",
			data.len()
		)));
	}
	decode_sequence(types.iter(), data)
}

/// Decodes the value whose head starts at `offset` within `data`.
///
/// Returns the value and the offset of the next head.
pub fn decode_token(
	kind: &ParamType,
	data: &[u8],
	offset: usize,
) -> Result<(Token, usize), AbiError> {
	if kind.is_dynamic() {
		let pointer = read_usize(data, offset)?;
		if pointer % 32 != 0 {
			return Err(AbiError::MalformedEncoding(format!(
				"Offset {} at {} is not word aligned",
				pointer, offset
			)));
		}
		let tail = data.get(pointer..).ok_or_else(|| {
			AbiError::MalformedEncoding(format!(
				"Offset {} points past the end of a {}-byte buffer",
				pointer,
				data.len()
			))
		})?;
		Ok((decode_tail(kind, tail)?, offset + 32))
	} else {
		Ok((decode_static(kind, data, offset)?, offset + kind.head_size()))
	}
}

fn decode_sequence<'a, I>(types: I, data: &[u8]) -> Result<Vec<Token>, AbiError>
where
	I: IntoIterator<Item = &'a ParamType>,
{
	let mut offset = 0;
	let mut tokens = Vec::new();
	for kind in types {
		let (token, next) = decode_token(kind, data, offset)?;
		tokens.push(token);
		offset = next;
	}
	Ok(tokens)
}

/// Decodes a dynamic value from the start of its tail slice.
fn decode_tail(kind: &ParamType, tail: &[u8]) -> Result<Token, AbiError> {
	match kind {
		ParamType::Bytes => {
			let len = read_usize(tail, 0)?;
			let end = 32usize
				.checked_add(len)
				.ok_or_else(|| AbiError::MalformedEncoding("Length overflow".to_string()))?;
			let bytes = tail.get(32..end).ok_or_else(|| {
				AbiError::MalformedEncoding(format!(
					"Declared {} bytes but only {} available",
					len,
					tail.len().saturating_sub(32)
				))
			})?;
			Ok(Token::Bytes(Bytes::copy_from_slice(bytes)))
		},
		ParamType::Array(inner) => {
			let len = read_usize(tail, 0)?;
			let elements = &tail[32..];
			// Every element occupies at least one head word.
			if len > elements.len() / 32 {
				return Err(AbiError::MalformedEncoding(format!(
					"Array length {} exceeds the {} bytes available",
					len,
					elements.len()
				)));
			}
			let items = decode_sequence(std::iter::repeat_n(inner.as_ref(), len), elements)?;
			Ok(Token::Array(items))
		},
		ParamType::Tuple(types) => Ok(Token::Tuple(decode_sequence(types, tail)?)),
		other => Err(AbiError::MalformedEncoding(format!(
			"Type {} has no tail encoding",
			other
		))),
	}
}

fn decode_static(kind: &ParamType, data: &[u8], offset: usize) -> Result<Token, AbiError> {
	if let ParamType::Tuple(types) = kind {
		let region = data.get(offset..).ok_or_else(|| truncated(offset, data.len()))?;
		return Ok(Token::Tuple(decode_sequence(types, region)?));
	}

	let word = read_word(data, offset)?;
	match kind {
		ParamType::Address => {
			if word[..12].iter().any(|b| *b != 0) {
				return Err(AbiError::MalformedEncoding(format!(
					"Dirty address padding at offset {}",
					offset
				)));
			}
			Ok(Token::Address(Address::from_slice(&word[12..])))
		},
		ParamType::Uint(bits) => {
			let value = U256::from_be_slice(word);
			if value.bit_len() > *bits {
				return Err(AbiError::MalformedEncoding(format!(
					"Value at offset {} does not fit in uint{}",
					offset, bits
				)));
			}
			Ok(Token::Uint(value))
		},
		ParamType::Bool => match word[31] {
			0 | 1 if word[..31].iter().all(|b| *b == 0) => Ok(Token::Bool(word[31] == 1)),
			_ => Err(AbiError::MalformedEncoding(format!(
				"Invalid bool word at offset {}",
				offset
			))),
		},
		ParamType::FixedBytes(size) => {
			if word[*size..].iter().any(|b| *b != 0) {
				return Err(AbiError::MalformedEncoding(format!(
					"Dirty bytes{} padding at offset {}",
					size, offset
				)));
			}
			Ok(Token::FixedBytes(word[..*size].to_vec()))
		},
		other => Err(AbiError::MalformedEncoding(format!(
			"Type {} is not static",
			other
		))),
	}
}

fn truncated(required: usize, available: usize) -> AbiError {
	AbiError::MalformedEncoding(format!(
		"Insufficient data: need {} bytes, have {}",
		required, available
	))
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
	let end = offset
		.checked_add(32)
		.ok_or_else(|| truncated(usize::MAX, data.len()))?;
	data.get(offset..end).ok_or_else(|| truncated(end, data.len()))
}

/// Reads an offset or length word, which must fit in 64 bits.
fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
	let word = read_word(data, offset)?;
	if word[..24].iter().any(|b| *b != 0) {
		return Err(AbiError::MalformedEncoding(format!(
			"Offset or length at {} is out of range",
			offset
		)));
	}
	let mut low = [0u8; 8];
	low.copy_from_slice(&word[24..]);
	usize::try_from(u64::from_be_bytes(low)).map_err(|_| {
		AbiError::MalformedEncoding(format!("Offset or length at {} is out of range", offset))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::hex;

	fn word(last: u8) -> [u8; 32] {
		let mut w = [0u8; 32];
		w[31] = last;
		w
	}

	#[test]
	fn test_decode_static_words() {
		let mut data = Vec::new();
		data.extend_from_slice(&word(0xaa));
		data.extend_from_slice(&word(1));
		data.extend_from_slice(&word(200));

		let tokens = decode(
			&[ParamType::Address, ParamType::Bool, ParamType::Uint(8)],
			&data,
		)
		.unwrap();

		assert_eq!(
			tokens[0],
			Token::Address(Address::with_last_byte(0xaa))
		);
		assert_eq!(tokens[1], Token::Bool(true));
		assert_eq!(tokens[2], Token::Uint(U256::from(200)));
	}

	#[test]
	fn test_decode_token_reports_next_offset() {
		let data = [word(5), word(6)].concat();
		let (token, next) = decode_token(&ParamType::Uint(256), &data, 32).unwrap();
		assert_eq!(token, Token::Uint(U256::from(6)));
		assert_eq!(next, 64);
	}

	#[test]
	fn test_decode_bytes_and_empty_bytes() {
		// bytes(0xdeadbeef), bytes("")
		let data = hex::decode(concat!(
			"0000000000000000000000000000000000000000000000000000000000000040",
			"0000000000000000000000000000000000000000000000000000000000000080",
			"0000000000000000000000000000000000000000000000000000000000000004",
			"deadbeef00000000000000000000000000000000000000000000000000000000",
			"0000000000000000000000000000000000000000000000000000000000000000",
		))
		.unwrap();

		let tokens = decode(&[ParamType::Bytes, ParamType::Bytes], &data).unwrap();
		assert_eq!(tokens[0], Token::Bytes(Bytes::from(vec![0xde, 0xad, 0xbe, 0xef])));
		assert_eq!(tokens[1], Token::Bytes(Bytes::new()));
	}

	#[test]
	fn test_truncated_buffer_is_malformed() {
		let data = [0u8; 31];
		assert!(matches!(
			decode(&[ParamType::Uint(256)], &data),
			Err(AbiError::MalformedEncoding(_))
		));

		// Length word claims 64 bytes, only 4 follow.
		let data = [word(0x20).to_vec(), word(64).to_vec(), vec![1, 2, 3, 4]].concat();
		assert!(matches!(
			decode(&[ParamType::Bytes], &data),
			Err(AbiError::MalformedEncoding(_))
		));
	}

	#[test]
	fn test_offset_past_end_is_malformed() {
		let data = word(0xff);
		assert!(matches!(
			decode(&[ParamType::Bytes], &data),
			Err(AbiError::MalformedEncoding(_))
		));
	}

	#[test]
	fn test_partial_trailing_word_is_malformed() {
		let data = [word(5).to_vec(), vec![0u8; 3]].concat();
		assert!(matches!(
			decode(&[ParamType::Uint(256)], &data),
			Err(AbiError::MalformedEncoding(_))
		));
	}

	#[test]
	fn test_misaligned_offset_is_malformed() {
		// Offset 0x21 skips one pad byte before a one-byte `bytes` value.
		let data = [
			word(0x21).to_vec(),
			vec![0u8],
			word(1).to_vec(),
			vec![0xab],
		]
		.concat();
		assert_eq!(data.len(), 66);
		assert!(matches!(
			decode(&[ParamType::Bytes], &data),
			Err(AbiError::MalformedEncoding(_))
		));

		// Same layout padded to whole words still has a misaligned offset.
		let mut padded = data.clone();
		padded.resize(96, 0);
		assert!(matches!(
			decode(&[ParamType::Bytes], &padded),
			Err(AbiError::MalformedEncoding(_))
		));
		assert!(matches!(
			decode_token(&ParamType::Bytes, &padded, 0),
			Err(AbiError::MalformedEncoding(_))
		));
	}

	#[test]
	fn test_huge_array_length_is_rejected_without_allocating() {
		let mut length = [0xffu8; 32];
		length[..24].fill(0);
		let data = [word(0x20).to_vec(), length.to_vec()].concat();
		assert!(decode(&[ParamType::Array(Box::new(ParamType::Bool))], &data).is_err());
	}

	#[test]
	fn test_strict_word_validation() {
		let mut dirty_address = word(1);
		dirty_address[0] = 1;
		assert!(decode(&[ParamType::Address], &dirty_address).is_err());

		assert!(decode(&[ParamType::Uint(8)], &{
			let mut w = word(0);
			w[30] = 1;
			w
		})
		.is_err());

		assert!(decode(&[ParamType::Bool], &word(2)).is_err());

		let mut dirty_fixed = [0u8; 32];
		dirty_fixed[4] = 1;
		assert!(decode(&[ParamType::FixedBytes(4)], &dirty_fixed).is_err());
		assert!(decode(&[ParamType::FixedBytes(5)], &dirty_fixed).is_ok());
	}
}
