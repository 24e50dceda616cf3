//! Function signatures, selectors and call decoding.
//!
//! An [`InterfaceDescriptor`] is a fixed list of functions. Decoding
//! calldata against it has three outcomes: no selector matches (`Ok(None)`),
//! a selector matches and the arguments decode (`Ok(Some(call))`), or a
//! selector matches and the arguments are malformed (`Err`). The last case
//! is never downgraded to "no match".

use crate::decode::decode;
use crate::encode::encode_params;
use crate::types::{ParamType, Token};
use crate::AbiError;
use alloy_primitives::{keccak256, Address, Bytes, Selector, U256};
use serde::Serialize;
use std::fmt;

/// A named function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
	/// Parameter name; empty when the ABI omits it.
	pub name: String,
	pub kind: ParamType,
}

impl Param {
	pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}

	/// Parses `type [location] [name]`, where `type` may be a parenthesised
	/// tuple with its own named components.
	pub fn parse(s: &str) -> Result<Self, AbiError> {
		let s = s.trim();
		if s.is_empty() {
			return Err(AbiError::InvalidSignature("Empty parameter".to_string()));
		}

		let (type_str, rest) = if s.starts_with('(') {
			let close = matching_paren(s)?;
			let mut end = close + 1;
			while s[end..].starts_with("[]") {
				end += 2;
			}
			(&s[..end], &s[end..])
		} else {
			match s.split_once(char::is_whitespace) {
				Some((type_str, rest)) => (type_str, rest),
				None => (s, ""),
			}
		};

		let mut words = rest
			.split_whitespace()
			.filter(|w| !matches!(*w, "memory" | "calldata" | "storage"));
		let name = words.next().unwrap_or_default().to_string();
		if let Some(extra) = words.next() {
			return Err(AbiError::InvalidSignature(format!(
				"Unexpected '{}' in parameter '{}'",
				extra, s
			)));
		}

		Ok(Self {
			name,
			kind: type_str.parse()?,
		})
	}
}

/// Index of the parenthesis closing the one at position 0.
fn matching_paren(s: &str) -> Result<usize, AbiError> {
	let mut depth = 0usize;
	for (i, c) in s.char_indices() {
		match c {
			'(' => depth += 1,
			')' => {
				depth = depth.saturating_sub(1);
				if depth == 0 {
					return Ok(i);
				}
			},
			_ => {},
		}
	}
	Err(AbiError::InvalidSignature(format!(
		"Unbalanced parentheses in '{}'",
		s
	)))
}

/// Splits a parameter list on commas that are not nested in parentheses.
pub(crate) fn split_top_level(s: &str) -> Result<Vec<&str>, AbiError> {
	if s.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut parts = Vec::new();
	let mut depth = 0i32;
	let mut start = 0;
	for (i, c) in s.char_indices() {
		match c {
			'(' => depth += 1,
			')' => depth -= 1,
			',' if depth == 0 => {
				parts.push(&s[start..i]);
				start = i + 1;
			},
			_ => {},
		}
		if depth < 0 {
			return Err(AbiError::InvalidSignature(format!(
				"Unbalanced parentheses in '{}'",
				s
			)));
		}
	}
	if depth != 0 {
		return Err(AbiError::InvalidSignature(format!(
			"Unbalanced parentheses in '{}'",
			s
		)));
	}
	parts.push(&s[start..]);

	if parts.iter().any(|p| p.trim().is_empty()) {
		return Err(AbiError::InvalidSignature(format!(
			"Empty parameter in '{}'",
			s
		)));
	}
	Ok(parts)
}

/// A function name with its ordered parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
	pub name: String,
	pub inputs: Vec<Param>,
}

impl FunctionSignature {
	pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
		Self {
			name: name.into(),
			inputs,
		}
	}

	/// Parses a human-readable signature such as
	/// `removeOwner(address prevOwner, address owner, uint256 _threshold)`.
	pub fn parse(signature: &str) -> Result<Self, AbiError> {
		let signature = signature.trim();
		let signature = signature.strip_prefix("function ").unwrap_or(signature);

		let open = signature.find('(').ok_or_else(|| {
			AbiError::InvalidSignature(format!("Missing parameter list in '{}'", signature))
		})?;
		let name = signature[..open].trim();
		if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
		{
			return Err(AbiError::InvalidSignature(format!(
				"Invalid function name in '{}'",
				signature
			)));
		}

		let params = &signature[open..];
		let close = matching_paren(params)?;
		if !params[close + 1..].trim().is_empty() {
			return Err(AbiError::InvalidSignature(format!(
				"Unexpected trailing input in '{}'",
				signature
			)));
		}

		let inputs = split_top_level(&params[1..close])?
			.into_iter()
			.map(Param::parse)
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self::new(name, inputs))
	}

	/// Canonical form hashed into the selector: `name(type1,type2)`.
	pub fn canonical(&self) -> String {
		let types: Vec<String> = self.inputs.iter().map(|p| p.kind.to_string()).collect();
		format!("{}({})", self.name, types.join(","))
	}

	/// First four bytes of `keccak256(canonical)`.
	pub fn selector(&self) -> Selector {
		Selector::from_slice(&keccak256(self.canonical().as_bytes())[..4])
	}

	pub fn param_types(&self) -> Vec<ParamType> {
		self.inputs.iter().map(|p| p.kind.clone()).collect()
	}

	/// Decodes the argument region (calldata without the selector).
	pub fn decode_args(&self, args: &[u8]) -> Result<DecodedCall, AbiError> {
		let values = decode(&self.param_types(), args)?;
		Ok(DecodedCall {
			selector: self.selector(),
			method: self.name.clone(),
			parameters: self
				.inputs
				.iter()
				.zip(values)
				.map(|(param, value)| DecodedParam {
					name: param.name.clone(),
					kind: param.kind.clone(),
					value,
				})
				.collect(),
		})
	}

	/// Full calldata: selector followed by the encoded arguments.
	pub fn encode(&self, args: &[Token]) -> Result<Bytes, AbiError> {
		let mut data = self.selector().to_vec();
		data.extend(encode_params(&self.param_types(), args)?);
		Ok(data.into())
	}
}

impl fmt::Display for FunctionSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.canonical())
	}
}

/// A fixed set of functions with precomputed selectors.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
	functions: Vec<(Selector, FunctionSignature)>,
}

impl InterfaceDescriptor {
	pub fn new(functions: Vec<FunctionSignature>) -> Self {
		Self {
			functions: functions
				.into_iter()
				.map(|f| (f.selector(), f))
				.collect(),
		}
	}

	/// Builds a descriptor from human-readable signatures.
	pub fn parse<'a>(signatures: impl IntoIterator<Item = &'a str>) -> Result<Self, AbiError> {
		let functions = signatures
			.into_iter()
			.map(FunctionSignature::parse)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self::new(functions))
	}

	pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
		self.functions.iter().map(|(_, f)| f)
	}

	pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
		self.functions().find(|f| f.name == name)
	}

	/// The function whose selector prefixes `data`, if any.
	pub fn find(&self, data: &[u8]) -> Option<&FunctionSignature> {
		let selector = data.get(..4)?;
		self.functions
			.iter()
			.find(|(s, _)| s.as_slice() == selector)
			.map(|(_, f)| f)
	}

	/// Selector-only probe.
	pub fn matches(&self, data: &[u8]) -> bool {
		self.find(data).is_some()
	}

	/// Decodes `data` if its selector belongs to this interface.
	pub fn decode(&self, data: &[u8]) -> Result<Option<DecodedCall>, AbiError> {
		match self.find(data) {
			Some(function) => function.decode_args(&data[4..]).map(Some),
			None => Ok(None),
		}
	}

	/// Encodes a call to the function called `name`.
	pub fn encode(&self, name: &str, args: &[Token]) -> Result<Bytes, AbiError> {
		self.function(name)
			.ok_or_else(|| AbiError::InvalidArgument(format!("Unknown function '{}'", name)))?
			.encode(args)
	}
}

/// One decoded argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedParam {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: ParamType,
	pub value: Token,
}

/// The result of matching calldata against a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCall {
	pub selector: Selector,
	pub method: String,
	pub parameters: Vec<DecodedParam>,
}

impl DecodedCall {
	/// Argument at `index`, by position; names may be missing on-chain.
	pub fn arg(&self, index: usize) -> Option<&Token> {
		self.parameters.get(index).map(|p| &p.value)
	}

	pub fn address_arg(&self, index: usize) -> Option<Address> {
		self.arg(index).and_then(Token::as_address)
	}

	pub fn uint_arg(&self, index: usize) -> Option<U256> {
		self.arg(index).and_then(Token::as_uint)
	}

	pub fn bool_arg(&self, index: usize) -> Option<bool> {
		self.arg(index).and_then(Token::as_bool)
	}

	pub fn bytes_arg(&self, index: usize) -> Option<&[u8]> {
		self.arg(index).and_then(Token::as_bytes)
	}

	pub fn tuple_arg(&self, index: usize) -> Option<&[Token]> {
		self.arg(index).and_then(Token::as_tuple)
	}
}
