//! `decode`: classify a JSON list of transactions.

use decoder_core::{DecodeError, DecodedTransaction, TransactionDecoder};
use decoder_types::TransactionInput;
use serde_json::{json, Value};
use std::path::Path;

/// Message shown in place of a transaction that could not be decoded.
pub const DECODE_FAILURE_MESSAGE: &str = "Unable to decode transaction data";

/// Reads `[{ "to", "value"?, "data"? }, ...]` from `input` and returns one
/// JSON value per transaction, in input order.
pub async fn run(
	decoder: &TransactionDecoder,
	chain_id: u64,
	input: &Path,
) -> Result<Value, Box<dyn std::error::Error>> {
	let content = tokio::fs::read_to_string(input).await?;
	let txs: Vec<TransactionInput> = serde_json::from_str(&content)?;
	tracing::info!(count = txs.len(), chain_id, "Decoding transactions");

	let results = decoder.decode_all(chain_id, &txs).await;
	let rendered = results
		.into_iter()
		.map(render)
		.collect::<Result<Vec<_>, _>>()?;
	Ok(Value::Array(rendered))
}

/// Renders one pipeline result. Failures only carry a generic message; the
/// underlying error has already been logged.
fn render(result: Result<DecodedTransaction, DecodeError>) -> Result<Value, serde_json::Error> {
	match result {
		Ok(tx) => serde_json::to_value(tx),
		Err(_) => Ok(json!({
			"status": "error",
			"error": DECODE_FAILURE_MESSAGE,
		})),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, hex, Address, U256};
	use alloy_sol_types::{sol, SolCall};
	use decoder_resolver::implementations::address_book::create_resolver;
	use decoder_resolver::ResolverService;
	use decoder_types::utils::COMPOSABLE_COW_ADDRESS;

	sol! {
		function removeOwner(address prevOwner, address owner, uint256 _threshold);
	}

	const SAFE: Address = address!("a063Cb7CFd8E57c30c788A0572CBbf2129ae56B6");
	const OWNER: Address = address!("00000000000000000000000000000000000000aa");

	fn decoder() -> TransactionDecoder {
		let config: toml::Value = toml::from_str(
			r#"
entries = [
	{ address = "0x00000000000000000000000000000000000000aa", name = "Alice" },
]
"#,
		)
		.unwrap();
		TransactionDecoder::new(ResolverService::new(create_resolver(&config).unwrap()))
	}

	#[tokio::test]
	async fn test_decode_file_preserves_order_and_isolates_failures() {
		let remove_owner = removeOwnerCall {
			prevOwner: Address::with_last_byte(1),
			owner: OWNER,
			_threshold: U256::from(2),
		}
		.abi_encode();
		// `create` selector followed by a truncated body.
		let broken_registration = hex!("6bfae1ca0000");

		let input = serde_json::json!([
			{ "to": SAFE, "data": hex::encode_prefixed(&remove_owner) },
			{ "to": COMPOSABLE_COW_ADDRESS, "data": hex::encode_prefixed(broken_registration) },
			{ "to": OWNER, "value": "1000" },
		]);

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("txs.json");
		std::fs::write(&path, input.to_string()).unwrap();

		let output = run(&decoder(), 1, &path).await.unwrap();
		let items = output.as_array().unwrap();
		assert_eq!(items.len(), 3);

		assert_eq!(items[0]["txInfo"]["type"], "SETTINGS_CHANGE");
		assert_eq!(items[0]["txInfo"]["settingsInfo"]["type"], "REMOVE_OWNER");
		assert_eq!(items[0]["txInfo"]["settingsInfo"]["owner"]["name"], "Alice");
		assert_eq!(items[0]["txInfo"]["settingsInfo"]["threshold"], "2");

		assert_eq!(
			items[1],
			serde_json::json!({ "status": "error", "error": DECODE_FAILURE_MESSAGE })
		);

		assert_eq!(items[2]["txInfo"]["type"], "NATIVE_TRANSFER");
	}

	#[tokio::test]
	async fn test_invalid_input_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("txs.json");
		std::fs::write(&path, "{ \"to\": 1 }").unwrap();

		assert!(run(&decoder(), 1, &path).await.is_err());
	}
}
