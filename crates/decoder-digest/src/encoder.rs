//! `encodeData` for EIP-712 structs made of atomic members.

use alloy_primitives::{keccak256, Address, B256, U256};

/// Accumulates the 32-byte words of one struct, starting with its type hash.
///
/// `bytes` members are hashed before they are appended, as EIP-712 requires
/// for dynamic values.
#[derive(Debug, Clone)]
pub struct StructEncoder {
	words: Vec<u8>,
}

impl StructEncoder {
	pub fn new(type_string: &str) -> Self {
		let mut encoder = Self {
			words: Vec::with_capacity(32 * 11),
		};
		encoder.word(keccak256(type_string.as_bytes()));
		encoder
	}

	pub fn word(&mut self, word: B256) -> &mut Self {
		self.words.extend_from_slice(word.as_slice());
		self
	}

	pub fn address(&mut self, value: Address) -> &mut Self {
		self.word(value.into_word())
	}

	pub fn uint(&mut self, value: U256) -> &mut Self {
		self.word(B256::from(value.to_be_bytes::<32>()))
	}

	pub fn uint8(&mut self, value: u8) -> &mut Self {
		self.uint(U256::from(value))
	}

	pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
		self.word(keccak256(data))
	}

	/// `hashStruct`: keccak256 of the accumulated words.
	pub fn hash(&self) -> B256 {
		keccak256(&self.words)
	}
}

/// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(message))`.
pub fn signing_digest(domain: &B256, message: &B256) -> B256 {
	let mut preimage = [0u8; 66];
	preimage[0] = 0x19;
	preimage[1] = 0x01;
	preimage[2..34].copy_from_slice(domain.as_slice());
	preimage[34..].copy_from_slice(message.as_slice());
	keccak256(preimage)
}
