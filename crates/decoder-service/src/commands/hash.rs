//! `hash`: compute the EIP-712 digests a Safe owner signs.

use alloy_primitives::{Address, B256};
use decoder_digest::{
	domain_hash, safe_message_hash, safe_message_message_hash, safe_tx_hash,
	safe_tx_message_hash, DigestError, MessageContent,
};
use decoder_types::{SafeTransaction, SafeVersion};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input of the `hash` command.
#[derive(Debug, Deserialize)]
pub struct HashRequest {
	pub chain_id: u64,
	pub safe: Address,
	/// Contract version of the Safe; absent for Safes not yet deployed.
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default)]
	pub transaction: Option<SafeTransaction>,
	#[serde(default)]
	pub message: Option<MessageContent>,
}

/// Every digest derivable from a [`HashRequest`]; `null` where a value
/// cannot be computed.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct HashReport {
	pub domain_hash: Option<B256>,
	pub safe_tx_message_hash: Option<B256>,
	pub safe_tx_hash: Option<B256>,
	pub safe_message_message_hash: Option<B256>,
	pub safe_message_hash: Option<B256>,
}

impl HashRequest {
	/// Parsed Safe version. An unparsable version is treated like an unknown
	/// one.
	fn safe_version(&self) -> Option<SafeVersion> {
		let raw = self.version.as_deref()?;
		match raw.parse() {
			Ok(version) => Some(version),
			Err(e) => {
				tracing::warn!(version = raw, error = %e, "Ignoring unparsable Safe version");
				None
			},
		}
	}

	pub fn compute(&self) -> Result<HashReport, DigestError> {
		let version = self.safe_version();
		let version = version.as_ref();

		let mut report = HashReport {
			domain_hash: domain_hash(version, self.chain_id, self.safe),
			..HashReport::default()
		};

		if let Some(tx) = &self.transaction {
			report.safe_tx_message_hash = safe_tx_message_hash(version, tx);
			report.safe_tx_hash = safe_tx_hash(version, self.chain_id, self.safe, tx);
		}
		if let Some(message) = &self.message {
			report.safe_message_message_hash = Some(safe_message_message_hash(message)?);
			report.safe_message_hash = safe_message_hash(version, self.chain_id, self.safe, message)?;
		}

		Ok(report)
	}
}

/// Reads a [`HashRequest`] from `input` and computes its digests.
pub async fn run(input: &Path) -> Result<HashReport, Box<dyn std::error::Error>> {
	let content = tokio::fs::read_to_string(input).await?;
	let request: HashRequest = serde_json::from_str(&content)?;
	tracing::info!(
		chain_id = request.chain_id,
		safe = %request.safe,
		version = request.version.as_deref().unwrap_or("unknown"),
		"Computing Safe digests"
	);
	Ok(request.compute()?)
}
