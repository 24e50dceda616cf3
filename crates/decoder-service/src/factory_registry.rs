//! Name → factory table for address resolvers.
//!
//! Resolver backends register themselves through
//! [`decoder_resolver::get_all_implementations`]; the configuration picks one
//! by name under `[resolver.implementations.<name>]`.

use decoder_config::Config;
use decoder_resolver::{ResolverFactory, ResolverService};
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct FactoryRegistry {
	pub resolver: HashMap<String, ResolverFactory>,
}

impl FactoryRegistry {
	pub fn new() -> Self {
		Self {
			resolver: HashMap::new(),
		}
	}

	pub fn register_resolver(&mut self, name: impl Into<String>, factory: ResolverFactory) {
		self.resolver.insert(name.into(), factory);
	}

	fn available(&self) -> String {
		let mut names: Vec<_> = self.resolver.keys().cloned().collect();
		names.sort();
		names.join(", ")
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Returns the process-wide registry, populating it on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();
		for (name, factory) in decoder_resolver::get_all_implementations() {
			tracing::debug!("Registering resolver implementation: {}", name);
			registry.register_resolver(name, factory);
		}
		registry
	})
}

/// Builds the primary resolver named in `config`, wrapped in a
/// [`ResolverService`] with the configured lookup concurrency.
pub fn build_resolver(config: &Config) -> Result<ResolverService, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let (name, implementation_config) = config.primary_resolver().ok_or_else(|| {
		format!(
			"Primary resolver '{}' not found in implementations",
			config.resolver.primary
		)
	})?;

	let factory = registry.resolver.get(name).ok_or_else(|| {
		format!(
			"Unknown resolver implementation '{}'. Available: [{}]",
			name,
			registry.available()
		)
	})?;

	let backend = factory(implementation_config)?;
	backend.config_schema().validate(implementation_config)?;
	tracing::info!(component = "resolver", implementation = %name, "Loaded");

	Ok(ResolverService::new(backend).with_max_concurrent(config.service.max_concurrent_lookups))
}
