//! Transaction classification pipeline.
//!
//! Classification is pure and runs first, producing results that still
//! carry raw addresses. Address enrichment is a separate step so that
//! [`TransactionDecoder::decode_all`] can look up every distinct address in
//! a transaction list once.

use crate::multi_send::decode_multi_send;
use crate::pre_signature::{get_pre_signature, PreSignature};
use crate::settings::{decode_settings_call, extract_settings_change};
use crate::twap::decode_twap_order;
use crate::DecodeError;
use alloy_primitives::{Address, Selector, U256};
use decoder_resolver::ResolverService;
use decoder_types::address::serialize_checksummed;
use decoder_types::utils::{truncate_hex, uint_string, GPV2_SETTLEMENT_ADDRESS};
use decoder_types::{AddressInfo, AddressKind, Operation, SettingsChange, TransactionInput, TwapOrder};
use serde::Serialize;
use std::collections::HashMap;

/// Deepest MultiSend nesting the classifier descends into.
pub const MAX_BATCH_DEPTH: usize = 32;

/// What a transaction does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionInfo<A = AddressInfo> {
	/// Plain value transfer with no calldata.
	NativeTransfer,
	/// Registration of a TWAP order, possibly from inside a batch.
	TwapOrder { order: TwapOrder },
	/// GPv2 order pre-signature.
	#[serde(rename_all = "camelCase")]
	PreSignature { pre_signature: PreSignature },
	/// MultiSend batch; entries are classified in execution order.
	Batch {
		transactions: Vec<DecodedTransaction<A>>,
	},
	/// A Safe configuration change.
	#[serde(rename_all = "camelCase")]
	SettingsChange { settings_info: SettingsChange<A> },
	/// Anything else.
	#[serde(rename_all = "camelCase")]
	Custom {
		selector: Option<Selector>,
		data_size: usize,
	},
}

/// A classified transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransaction<A = AddressInfo> {
	#[serde(serialize_with = "serialize_checksummed")]
	pub to: Address,
	#[serde(serialize_with = "uint_string::serialize")]
	pub value: U256,
	pub operation: Operation,
	pub tx_info: TransactionInfo<A>,
}

impl<A> DecodedTransaction<A> {
	/// Every enrichable address, depth-first in execution order.
	pub fn addresses(&self) -> Vec<&A> {
		let mut out = Vec::new();
		self.collect_addresses(&mut out);
		out
	}

	fn collect_addresses<'a>(&'a self, out: &mut Vec<&'a A>) {
		match &self.tx_info {
			TransactionInfo::Batch { transactions } => {
				for tx in transactions {
					tx.collect_addresses(out);
				}
			},
			TransactionInfo::SettingsChange { settings_info } => {
				out.extend(settings_info.addresses());
			},
			_ => {},
		}
	}

	/// Converts every enrichable address with `f`.
	pub fn map_addresses<B, F>(self, f: &mut F) -> DecodedTransaction<B>
	where
		F: FnMut(A) -> B,
	{
		let tx_info = match self.tx_info {
			TransactionInfo::NativeTransfer => TransactionInfo::NativeTransfer,
			TransactionInfo::TwapOrder { order } => TransactionInfo::TwapOrder { order },
			TransactionInfo::PreSignature { pre_signature } => {
				TransactionInfo::PreSignature { pre_signature }
			},
			TransactionInfo::Batch { transactions } => {
				let mut mapped = Vec::with_capacity(transactions.len());
				for tx in transactions {
					mapped.push(tx.map_addresses(&mut *f));
				}
				TransactionInfo::Batch {
					transactions: mapped,
				}
			},
			TransactionInfo::SettingsChange { settings_info } => TransactionInfo::SettingsChange {
				settings_info: settings_info.map_addresses(&mut *f),
			},
			TransactionInfo::Custom {
				selector,
				data_size,
			} => TransactionInfo::Custom {
				selector,
				data_size,
			},
		};

		DecodedTransaction {
			to: self.to,
			value: self.value,
			operation: self.operation,
			tx_info,
		}
	}
}

/// Classifies transactions and enriches the result through a resolver.
pub struct TransactionDecoder {
	resolver: ResolverService,
}

impl TransactionDecoder {
	pub fn new(resolver: ResolverService) -> Self {
		Self { resolver }
	}

	pub fn resolver(&self) -> &ResolverService {
		&self.resolver
	}

	/// Classifies a single call without enrichment.
	///
	/// Checks run in a fixed order: empty calldata, TWAP registration
	/// (direct or batched), pre-signature, MultiSend batch, settings change,
	/// and finally a generic custom call.
	pub fn classify(
		to: Address,
		value: U256,
		data: &[u8],
	) -> Result<DecodedTransaction<Address>, DecodeError> {
		classify_entry(to, value, Operation::Call, data, 0)
	}

	/// Classifies and enriches one transaction.
	pub async fn decode(
		&self,
		chain_id: u64,
		tx: &TransactionInput,
	) -> Result<DecodedTransaction, DecodeError> {
		let classified = Self::classify(tx.to, tx.value, tx.data())?;
		let addresses: Vec<Address> = classified.addresses().into_iter().copied().collect();
		let resolved = self
			.resolver
			.resolve_many(chain_id, addresses, &[AddressKind::Contract])
			.await;
		Ok(classified.map_addresses(&mut |address| enrich(&resolved, address)))
	}

	/// Classifies every transaction, enriches all addresses in one
	/// deduplicated round and returns results in input order.
	///
	/// A transaction that fails to decode yields its own `Err` and does not
	/// affect the others.
	pub async fn decode_all(
		&self,
		chain_id: u64,
		txs: &[TransactionInput],
	) -> Vec<Result<DecodedTransaction, DecodeError>> {
		let classified: Vec<_> = txs
			.iter()
			.map(|tx| Self::classify(tx.to, tx.value, tx.data()))
			.collect();

		let addresses: Vec<Address> = classified
			.iter()
			.filter_map(|result| result.as_ref().ok())
			.flat_map(|tx| tx.addresses().into_iter().copied())
			.collect();
		let resolved = self
			.resolver
			.resolve_many(chain_id, addresses, &[AddressKind::Contract])
			.await;

		classified
			.into_iter()
			.zip(txs)
			.enumerate()
			.map(|(index, (result, input))| match result {
				Ok(tx) => Ok(tx.map_addresses(&mut |address| enrich(&resolved, address))),
				Err(e) => {
					tracing::warn!(
						index,
						to = %input.to,
						data = %truncate_hex(input.data()),
						error = %e,
						"Unable to decode transaction"
					);
					Err(e)
				},
			})
			.collect()
	}
}

fn enrich(resolved: &HashMap<Address, AddressInfo>, address: Address) -> AddressInfo {
	resolved
		.get(&address)
		.cloned()
		.unwrap_or_else(|| AddressInfo::new(address))
}

fn classify_entry(
	to: Address,
	value: U256,
	operation: Operation,
	data: &[u8],
	depth: usize,
) -> Result<DecodedTransaction<Address>, DecodeError> {
	let tx_info = if data.is_empty() {
		TransactionInfo::NativeTransfer
	} else if let Some(order) = find_twap_order(to, data, depth)? {
		TransactionInfo::TwapOrder { order }
	} else if let Some(pre_signature) = get_pre_signature(data)? {
		if to != GPV2_SETTLEMENT_ADDRESS {
			tracing::debug!(%to, "Pre-signature sent to a contract other than GPv2Settlement");
		}
		TransactionInfo::PreSignature { pre_signature }
	} else if let Some(entries) = decode_multi_send(data)? {
		if depth >= MAX_BATCH_DEPTH {
			return Err(DecodeError::MalformedBatch(format!(
				"Batches nested deeper than {} levels",
				MAX_BATCH_DEPTH
			)));
		}
		let transactions = entries
			.iter()
			.map(|entry| classify_entry(entry.to, entry.value, entry.operation, &entry.data, depth + 1))
			.collect::<Result<Vec<_>, _>>()?;
		TransactionInfo::Batch { transactions }
	} else if let Some(call) = decode_settings_call(data)? {
		TransactionInfo::SettingsChange {
			settings_info: extract_settings_change(&call)?,
		}
	} else {
		TransactionInfo::Custom {
			selector: data.get(..4).map(Selector::from_slice),
			data_size: data.len(),
		}
	};

	tracing::trace!(%to, depth, kind = kind_name(&tx_info), "Classified call");

	Ok(DecodedTransaction {
		to,
		value,
		operation,
		tx_info,
	})
}

/// The outermost call searches its whole batch tree for a registration.
/// Nested entries sit inside a tree that search already covered, so they
/// never match.
fn find_twap_order(
	to: Address,
	data: &[u8],
	depth: usize,
) -> Result<Option<TwapOrder>, DecodeError> {
	if depth > 0 {
		return Ok(None);
	}
	decode_twap_order(to, data)
}

fn kind_name<A>(info: &TransactionInfo<A>) -> &'static str {
	match info {
		TransactionInfo::NativeTransfer => "native_transfer",
		TransactionInfo::TwapOrder { .. } => "twap_order",
		TransactionInfo::PreSignature { .. } => "pre_signature",
		TransactionInfo::Batch { .. } => "batch",
		TransactionInfo::SettingsChange { .. } => "settings_change",
		TransactionInfo::Custom { .. } => "custom",
	}
}
