//! Common types module for the Safe transaction decoder.
//!
//! This module defines the domain types shared by the decoding pipeline,
//! the digest engine, the address resolver and the service binary. Keeping
//! them in one crate lets every component agree on the shape of a Safe
//! transaction, a contract version and a classified result.

/// Address enrichment types returned by resolver implementations.
pub mod address;
/// Implementation registry trait for pluggable components.
pub mod registry;
/// Settings-change variants produced by the classifier.
pub mod settings;
/// Safe transaction inputs, MultiSend entries and call operations.
pub mod transaction;
/// Time-sliced (TWAP) conditional order descriptors.
pub mod twap;
/// Utility functions for hex handling, EIP-712 word encoding and constants.
pub mod utils;
/// Configuration validation types for implementation-specific TOML tables.
pub mod validation;
/// Semantic versions of deployed Safe contracts.
pub mod version;

pub use address::{AddressInfo, AddressKind};
pub use registry::ImplementationRegistry;
pub use settings::SettingsChange;
pub use transaction::{BatchEntry, Operation, SafeTransaction, TransactionInput};
pub use twap::{DurationPolicy, StartPolicy, TwapOrder};
pub use utils::truncate_hex;
pub use validation::*;
pub use version::{SafeVersion, VersionError};

/// Re-export of the primitive types every crate in the workspace builds on.
pub use alloy_primitives::{Address, Bytes, B256, U256, U512};
