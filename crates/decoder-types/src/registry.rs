//! Registry trait for pluggable implementations.
//!
//! Resolver backends are selected by name from the configuration file. Each
//! backend module exposes a `Registry` type implementing this trait so the
//! service can build a name → factory table without hard-coding modules.

/// Associates a configuration name with the factory that builds an implementation.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This must match the key under `[resolver.implementations]`, for example
	/// `"address_book"` or `"passthrough"`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory function for this implementation.
	fn factory() -> Self::Factory;
}
