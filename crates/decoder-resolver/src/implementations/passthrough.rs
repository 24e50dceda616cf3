//! Resolver that knows no names.
//!
//! Useful when no enrichment source is available: every address comes back
//! as a bare [`AddressInfo`].

use crate::{AddressResolver, ResolverError};
use async_trait::async_trait;
use decoder_types::{Address, AddressInfo, AddressKind, ConfigSchema, Schema, ValidationError};

pub struct PassthroughResolver;

#[async_trait]
impl AddressResolver for PassthroughResolver {
	async fn resolve(
		&self,
		_chain_id: u64,
		address: Address,
		_kinds: &[AddressKind],
	) -> Result<Option<AddressInfo>, ResolverError> {
		Ok(Some(AddressInfo::new(address)))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(PassthroughResolverSchema)
	}
}

/// Configuration schema for PassthroughResolver.
pub struct PassthroughResolverSchema;

impl ConfigSchema for PassthroughResolverSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function for the passthrough resolver. Takes no configuration.
pub fn create_resolver(config: &toml::Value) -> Result<Box<dyn AddressResolver>, ResolverError> {
	PassthroughResolverSchema
		.validate(config)
		.map_err(|e| ResolverError::Configuration(e.to_string()))?;
	Ok(Box::new(PassthroughResolver))
}

/// Registry for the passthrough resolver implementation.
pub struct Registry;

impl decoder_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "passthrough";
	type Factory = crate::ResolverFactory;

	fn factory() -> Self::Factory {
		create_resolver
	}
}

impl crate::ResolverRegistry for Registry {}
