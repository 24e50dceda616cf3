//! Address enrichment for decoded transactions.
//!
//! The decoder never knows what an address *is*. Owners, modules, guards and
//! handlers found in calldata are handed to an [`AddressResolver`] that may
//! return a display name and logo. Lookups are the slow part of decoding a
//! transaction list, so [`ResolverService`] deduplicates them across the whole
//! list and runs them with bounded concurrency.

use async_trait::async_trait;
use decoder_types::{Address, AddressInfo, AddressKind, ConfigSchema, ImplementationRegistry};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod address_book;
	pub mod passthrough;
}

/// Errors that can occur while resolving addresses.
#[derive(Debug, Error)]
pub enum ResolverError {
	/// The backend could not complete the lookup.
	#[error("Lookup failed: {0}")]
	Lookup(String),
	/// The backend configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface implemented by every address enrichment backend.
#[async_trait]
pub trait AddressResolver: Send + Sync {
	/// Looks up `address` on `chain_id`, restricted to entities of `kinds`.
	///
	/// An empty `kinds` slice accepts any kind. `Ok(None)` means the backend
	/// has nothing on record for the address.
	async fn resolve(
		&self,
		chain_id: u64,
		address: Address,
		kinds: &[AddressKind],
	) -> Result<Option<AddressInfo>, ResolverError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for resolver factory functions.
pub type ResolverFactory = fn(&toml::Value) -> Result<Box<dyn AddressResolver>, ResolverError>;

/// Registry trait for resolver implementations.
pub trait ResolverRegistry: ImplementationRegistry<Factory = ResolverFactory> {}

/// Get all registered resolver implementations.
///
/// Returns a vector of (name, factory) tuples used by the service to build
/// its name → factory table.
pub fn get_all_implementations() -> Vec<(&'static str, ResolverFactory)> {
	use implementations::{address_book, passthrough};

	vec![
		(address_book::Registry::NAME, address_book::Registry::factory()),
		(passthrough::Registry::NAME, passthrough::Registry::factory()),
	]
}

/// Default number of lookups allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 16;

/// Resolver front-end used by the decoding pipeline.
///
/// Enrichment never fails: an address the backend does not know, or a
/// backend error, yields a bare [`AddressInfo`] carrying only the address.
pub struct ResolverService {
	backend: Box<dyn AddressResolver>,
	max_concurrent: usize,
}

impl ResolverService {
	pub fn new(backend: Box<dyn AddressResolver>) -> Self {
		Self {
			backend,
			max_concurrent: DEFAULT_MAX_CONCURRENT_LOOKUPS,
		}
	}

	/// Caps the number of concurrent lookups issued by [`Self::resolve_many`].
	pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
		self.max_concurrent = max_concurrent.max(1);
		self
	}

	pub fn max_concurrent(&self) -> usize {
		self.max_concurrent
	}

	/// Resolves one address, falling back to a bare [`AddressInfo`].
	pub async fn resolve_or_default(
		&self,
		chain_id: u64,
		address: Address,
		kinds: &[AddressKind],
	) -> AddressInfo {
		match self.backend.resolve(chain_id, address, kinds).await {
			Ok(Some(info)) => info,
			Ok(None) => AddressInfo::new(address),
			Err(e) => {
				tracing::debug!(%address, chain_id, error = %e, "Address lookup failed, using bare address");
				AddressInfo::new(address)
			},
		}
	}

	/// Resolves every distinct address once, running up to
	/// `max_concurrent` lookups at a time.
	///
	/// The returned map has an entry for every input address.
	pub async fn resolve_many<I>(
		&self,
		chain_id: u64,
		addresses: I,
		kinds: &[AddressKind],
	) -> HashMap<Address, AddressInfo>
	where
		I: IntoIterator<Item = Address>,
	{
		let mut seen = HashSet::new();
		let unique: Vec<Address> = addresses
			.into_iter()
			.filter(|address| seen.insert(*address))
			.collect();

		tracing::debug!(count = unique.len(), chain_id, "Resolving addresses");

		stream::iter(unique)
			.map(|address| async move {
				(address, self.resolve_or_default(chain_id, address, kinds).await)
			})
			.buffer_unordered(self.max_concurrent)
			.collect()
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use decoder_types::Schema;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	struct CountingResolver {
		calls: Arc<AtomicUsize>,
		in_flight: Arc<AtomicUsize>,
		peak: Arc<AtomicUsize>,
	}

	struct NoConfig;

	impl ConfigSchema for NoConfig {
		fn validate(&self, config: &toml::Value) -> Result<(), decoder_types::ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	#[async_trait]
	impl AddressResolver for CountingResolver {
		async fn resolve(
			&self,
			_chain_id: u64,
			address: Address,
			_kinds: &[AddressKind],
		) -> Result<Option<AddressInfo>, ResolverError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
			self.peak.fetch_max(now, Ordering::SeqCst);
			tokio::task::yield_now().await;
			self.in_flight.fetch_sub(1, Ordering::SeqCst);

			if address == Address::with_last_byte(0xee) {
				return Err(ResolverError::Lookup("backend unavailable".into()));
			}
			Ok(Some(AddressInfo::new(address).with_name("Known")))
		}

		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(NoConfig)
		}
	}

	fn counting() -> (CountingResolver, Arc<AtomicUsize>, Arc<AtomicUsize>) {
		let calls = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));
		(
			CountingResolver {
				calls: calls.clone(),
				in_flight: Arc::new(AtomicUsize::new(0)),
				peak: peak.clone(),
			},
			calls,
			peak,
		)
	}

	#[tokio::test]
	async fn test_resolve_many_deduplicates() {
		let (resolver, calls, _) = counting();
		let service = ResolverService::new(Box::new(resolver));

		let a = Address::with_last_byte(1);
		let b = Address::with_last_byte(2);
		let resolved = service
			.resolve_many(1, vec![a, b, a, a, b], &[AddressKind::Contract])
			.await;

		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert_eq!(resolved.len(), 2);
		assert_eq!(resolved[&a].name.as_deref(), Some("Known"));
	}

	#[tokio::test]
	async fn test_resolve_many_respects_concurrency_limit() {
		let (resolver, calls, peak) = counting();
		let service = ResolverService::new(Box::new(resolver)).with_max_concurrent(2);

		let addresses: Vec<Address> = (1..=10).map(Address::with_last_byte).collect();
		let resolved = service.resolve_many(1, addresses, &[]).await;

		assert_eq!(resolved.len(), 10);
		assert_eq!(calls.load(Ordering::SeqCst), 10);
		assert!(peak.load(Ordering::SeqCst) <= 2);
	}

	#[tokio::test]
	async fn test_failed_lookup_falls_back_to_bare_address() {
		let (resolver, _, _) = counting();
		let service = ResolverService::new(Box::new(resolver));

		let failing = Address::with_last_byte(0xee);
		let info = service
			.resolve_or_default(1, failing, &[AddressKind::Contract])
			.await;
		assert_eq!(info, AddressInfo::new(failing));
	}
}
