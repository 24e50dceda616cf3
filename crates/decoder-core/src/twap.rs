//! ComposableCoW TWAP order registrations.
//!
//! A Safe registers a TWAP order by calling `create` (or
//! `createWithContext`) on the ComposableCoW registry with the TWAP handler
//! and an ABI-encoded static input. The call may be made directly or from
//! inside a MultiSend batch, possibly nested several levels deep.

use crate::multi_send::decode_multi_send;
use crate::DecodeError;
use alloy_primitives::{Address, Bytes, B256, U256, U512};
use decoder_abi::{decode, FunctionSignature, InterfaceDescriptor, Param, ParamType, Token};
use decoder_types::utils::{COMPOSABLE_COW_ADDRESS, TWAP_HANDLER_ADDRESS};
use decoder_types::{BatchEntry, DurationPolicy, StartPolicy, TwapOrder};
use once_cell::sync::Lazy;

fn conditional_order_params() -> ParamType {
	ParamType::Tuple(vec![
		ParamType::Address,
		ParamType::FixedBytes(32),
		ParamType::Bytes,
	])
}

/// Registration entry points of the ComposableCoW registry.
pub static COMPOSABLE_COW_INTERFACE: Lazy<InterfaceDescriptor> = Lazy::new(|| {
	InterfaceDescriptor::new(vec![
		FunctionSignature::new(
			"create",
			vec![
				Param::new("params", conditional_order_params()),
				Param::new("dispatch", ParamType::Bool),
			],
		),
		FunctionSignature::new(
			"createWithContext",
			vec![
				Param::new("params", conditional_order_params()),
				Param::new("factory", ParamType::Address),
				Param::new("data", ParamType::Bytes),
				Param::new("dispatch", ParamType::Bool),
			],
		),
	])
});

/// Layout of the TWAP handler's static input.
static TWAP_STATIC_INPUT: Lazy<Vec<ParamType>> = Lazy::new(|| {
	vec![
		ParamType::Address,        // sellToken
		ParamType::Address,        // buyToken
		ParamType::Address,        // receiver
		ParamType::Uint(256),      // partSellAmount
		ParamType::Uint(256),      // minPartLimit
		ParamType::Uint(256),      // t0
		ParamType::Uint(256),      // n
		ParamType::Uint(256),      // t
		ParamType::Uint(256),      // span
		ParamType::FixedBytes(32), // appData
	]
});

fn is_registration(to: Address, data: &[u8]) -> bool {
	to == COMPOSABLE_COW_ADDRESS && COMPOSABLE_COW_INTERFACE.matches(data)
}

/// Finds the first registry call in `data`, walking MultiSend batches
/// depth-first in execution order.
fn find_registration(to: Address, data: &[u8]) -> Result<Option<Bytes>, DecodeError> {
	let mut pending = vec![BatchEntry::call(to, U256::ZERO, Bytes::copy_from_slice(data))];

	while let Some(entry) = pending.pop() {
		if is_registration(entry.to, &entry.data) {
			return Ok(Some(entry.data));
		}
		if let Some(entries) = decode_multi_send(&entry.data)? {
			pending.extend(entries.into_iter().rev());
		}
	}

	Ok(None)
}

/// Whether `data` sent to `to` registers a conditional order on the
/// registry, directly or from inside a batch.
///
/// This is a selector-level check. A batch that cannot be unpacked does not
/// qualify.
pub fn is_twap_order(to: Address, data: &[u8]) -> bool {
	matches!(find_registration(to, data), Ok(Some(_)))
}

/// Decodes the TWAP order registered by `data`.
///
/// Returns `Ok(None)` when no registry call is found. A registry call for
/// a handler other than the TWAP handler is an [`DecodeError::InvalidHandler`].
pub fn decode_twap_order(to: Address, data: &[u8]) -> Result<Option<TwapOrder>, DecodeError> {
	let Some(registration) = find_registration(to, data)? else {
		return Ok(None);
	};

	let call = COMPOSABLE_COW_INTERFACE
		.decode(&registration)?
		.ok_or_else(|| missing("create", 0))?;
	let params = call.tuple_arg(0).ok_or_else(|| missing(&call.method, 0))?;

	let handler = params
		.first()
		.and_then(Token::as_address)
		.ok_or_else(|| missing(&call.method, 0))?;
	if handler != TWAP_HANDLER_ADDRESS {
		return Err(DecodeError::InvalidHandler(handler));
	}
	let salt = params
		.get(1)
		.and_then(Token::as_bytes)
		.map(B256::from_slice)
		.ok_or_else(|| missing(&call.method, 0))?;
	let static_input = params
		.get(2)
		.and_then(Token::as_bytes)
		.ok_or_else(|| missing(&call.method, 0))?;

	let order = decode_static_input(static_input, salt)?;
	tracing::debug!(
		method = %call.method,
		sell_token = %order.sell_token,
		parts = %order.number_of_parts,
		"Decoded TWAP order"
	);
	Ok(Some(order))
}

fn missing(method: &str, index: usize) -> DecodeError {
	DecodeError::MissingParameter {
		method: method.to_string(),
		index,
	}
}

fn decode_static_input(static_input: &[u8], salt: B256) -> Result<TwapOrder, DecodeError> {
	let values = decode(&TWAP_STATIC_INPUT, static_input)?;

	let address = |i: usize| values[i].as_address().ok_or_else(|| static_field(i));
	let uint = |i: usize| values[i].as_uint().ok_or_else(|| static_field(i));

	let part_sell_amount = uint(3)?;
	let min_part_limit = uint(4)?;
	let start_epoch = uint(5)?;
	let number_of_parts = uint(6)?;
	let time_between_parts = uint(7)?;
	let span = uint(8)?;
	let app_data = values[9]
		.as_bytes()
		.map(B256::from_slice)
		.ok_or_else(|| static_field(9))?;

	let (duration_policy, start_policy) = if span.is_zero() {
		(DurationPolicy::Auto, StartPolicy::AtRegistrationTime)
	} else {
		(
			DurationPolicy::FixedDuration { duration: span },
			StartPolicy::AtEpoch { epoch: start_epoch },
		)
	};

	Ok(TwapOrder {
		sell_token: address(0)?,
		buy_token: address(1)?,
		receiver: address(2)?,
		sell_amount: total(part_sell_amount, number_of_parts),
		buy_amount: total(min_part_limit, number_of_parts),
		part_sell_amount,
		min_part_limit,
		number_of_parts,
		time_between_parts,
		duration_policy,
		start_policy,
		app_data,
		salt,
	})
}

fn static_field(index: usize) -> DecodeError {
	DecodeError::MissingParameter {
		method: "twapStaticInput".to_string(),
		index,
	}
}

fn total(per_part: U256, parts: U256) -> U512 {
	per_part.widening_mul(parts)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::multi_send::encode_multi_send;
	use alloy_primitives::{address, hex};
	use alloy_sol_types::{sol, SolCall, SolValue};

	sol! {
		struct ConditionalOrderParams {
			address handler;
			bytes32 salt;
			bytes staticInput;
		}

		struct TwapData {
			address sellToken;
			address buyToken;
			address receiver;
			uint256 partSellAmount;
			uint256 minPartLimit;
			uint256 t0;
			uint256 n;
			uint256 t;
			uint256 span;
			bytes32 appData;
		}

		function create(ConditionalOrderParams params, bool dispatch);
		function createWithContext(ConditionalOrderParams params, address factory, bytes data, bool dispatch);
	}

	const SELL: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
	const BUY: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
	const RECEIVER: Address = address!("00000000000000000000000000000000000000cc");

	fn twap_data(span: u64) -> TwapData {
		TwapData {
			sellToken: SELL,
			buyToken: BUY,
			receiver: RECEIVER,
			partSellAmount: U256::from(10),
			minPartLimit: U256::from(7),
			t0: U256::from(1_700_000_000u64),
			n: U256::from(3),
			t: U256::from(3600),
			span: U256::from(span),
			appData: B256::repeat_byte(0xad),
		}
	}

	fn create_call(handler: Address, span: u64) -> Vec<u8> {
		createCall {
			params: ConditionalOrderParams {
				handler,
				salt: B256::repeat_byte(0x5a),
				staticInput: twap_data(span).abi_encode().into(),
			},
			dispatch: true,
		}
		.abi_encode()
	}

	#[test]
	fn test_registry_selectors() {
		let selectors: Vec<_> = COMPOSABLE_COW_INTERFACE
			.functions()
			.map(|f| f.selector())
			.collect();
		assert_eq!(selectors[0].as_slice(), &hex!("6bfae1ca"));
		assert_eq!(selectors[0].as_slice(), &createCall::SELECTOR);
		assert_eq!(selectors[1].as_slice(), &hex!("0d0d9800"));
		assert_eq!(selectors[1].as_slice(), &createWithContextCall::SELECTOR);
	}

	#[test]
	fn test_static_input_is_ten_words() {
		assert_eq!(twap_data(0).abi_encode().len(), 320);
	}

	#[test]
	fn test_decode_direct_registration_with_auto_policies() {
		let data = create_call(TWAP_HANDLER_ADDRESS, 0);
		assert!(is_twap_order(COMPOSABLE_COW_ADDRESS, &data));

		let order = decode_twap_order(COMPOSABLE_COW_ADDRESS, &data)
			.unwrap()
			.unwrap();

		assert_eq!(order.sell_token, SELL);
		assert_eq!(order.buy_token, BUY);
		assert_eq!(order.receiver, RECEIVER);
		assert_eq!(order.sell_amount, U512::from(30));
		assert_eq!(order.buy_amount, U512::from(21));
		assert_eq!(order.part_sell_amount, U256::from(10));
		assert_eq!(order.number_of_parts, U256::from(3));
		assert_eq!(order.time_between_parts, U256::from(3600));
		assert_eq!(order.duration_policy, DurationPolicy::Auto);
		assert_eq!(order.start_policy, StartPolicy::AtRegistrationTime);
		assert_eq!(order.app_data, B256::repeat_byte(0xad));
		assert_eq!(order.salt, B256::repeat_byte(0x5a));
	}

	#[test]
	fn test_nonzero_span_uses_fixed_duration_and_epoch_start() {
		let data = create_call(TWAP_HANDLER_ADDRESS, 1800);
		let order = decode_twap_order(COMPOSABLE_COW_ADDRESS, &data)
			.unwrap()
			.unwrap();

		assert_eq!(
			order.duration_policy,
			DurationPolicy::FixedDuration {
				duration: U256::from(1800)
			}
		);
		assert_eq!(
			order.start_policy,
			StartPolicy::AtEpoch {
				epoch: U256::from(1_700_000_000u64)
			}
		);
	}

	#[test]
	fn test_registration_nested_in_batch_decodes_like_direct_call() {
		let direct = create_call(TWAP_HANDLER_ADDRESS, 1800);
		let approve = hex!("095ea7b3").to_vec();
		let batch = encode_multi_send(&[
			BatchEntry::call(SELL, U256::ZERO, approve),
			BatchEntry::call(Address::with_last_byte(9), U256::from(1), Bytes::new()),
			BatchEntry::call(COMPOSABLE_COW_ADDRESS, U256::ZERO, direct.clone()),
		]);
		let multi_send = address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D");

		assert!(is_twap_order(multi_send, &batch));
		assert_eq!(
			decode_twap_order(multi_send, &batch).unwrap(),
			decode_twap_order(COMPOSABLE_COW_ADDRESS, &direct).unwrap()
		);
	}

	#[test]
	fn test_registration_nested_two_levels_deep() {
		let inner = encode_multi_send(&[BatchEntry::call(
			COMPOSABLE_COW_ADDRESS,
			U256::ZERO,
			create_call(TWAP_HANDLER_ADDRESS, 0),
		)]);
		let outer = encode_multi_send(&[BatchEntry::delegate_call(Address::with_last_byte(1), inner)]);

		assert!(is_twap_order(Address::with_last_byte(2), &outer));
		assert!(decode_twap_order(Address::with_last_byte(2), &outer)
			.unwrap()
			.is_some());
	}

	#[test]
	fn test_batch_entry_to_other_contract_does_not_qualify() {
		let batch = encode_multi_send(&[BatchEntry::call(
			Address::with_last_byte(3),
			U256::ZERO,
			create_call(TWAP_HANDLER_ADDRESS, 0),
		)]);
		assert!(!is_twap_order(Address::with_last_byte(2), &batch));
		assert_eq!(decode_twap_order(Address::with_last_byte(2), &batch).unwrap(), None);
	}

	#[test]
	fn test_wrong_registry_address_is_no_match() {
		let data = create_call(TWAP_HANDLER_ADDRESS, 0);
		assert!(!is_twap_order(Address::with_last_byte(1), &data));
		assert_eq!(decode_twap_order(Address::with_last_byte(1), &data).unwrap(), None);
	}

	#[test]
	fn test_other_handler_is_fatal() {
		let other = address!("00000000000000000000000000000000000000ff");
		let data = create_call(other, 0);

		assert!(is_twap_order(COMPOSABLE_COW_ADDRESS, &data));
		assert_eq!(
			decode_twap_order(COMPOSABLE_COW_ADDRESS, &data),
			Err(DecodeError::InvalidHandler(other))
		);
	}

	#[test]
	fn test_create_with_context() {
		let data = createWithContextCall {
			params: ConditionalOrderParams {
				handler: TWAP_HANDLER_ADDRESS,
				salt: B256::ZERO,
				staticInput: twap_data(0).abi_encode().into(),
			},
			factory: Address::with_last_byte(0xfa),
			data: Bytes::from(vec![1, 2, 3]),
			dispatch: false,
		}
		.abi_encode();

		let order = decode_twap_order(COMPOSABLE_COW_ADDRESS, &data)
			.unwrap()
			.unwrap();
		assert_eq!(order.sell_amount, U512::from(30));
		assert_eq!(order.salt, B256::ZERO);
	}

	#[test]
	fn test_totals_do_not_overflow() {
		let mut twap = twap_data(0);
		twap.partSellAmount = U256::MAX;
		let data = createCall {
			params: ConditionalOrderParams {
				handler: TWAP_HANDLER_ADDRESS,
				salt: B256::ZERO,
				staticInput: twap.abi_encode().into(),
			},
			dispatch: true,
		}
		.abi_encode();

		let order = decode_twap_order(COMPOSABLE_COW_ADDRESS, &data)
			.unwrap()
			.unwrap();
		let expected = U512::from(U256::MAX) * U512::from(order.number_of_parts);
		assert_eq!(order.sell_amount, expected);
		assert!(expected > U512::from(U256::MAX));
	}
}
