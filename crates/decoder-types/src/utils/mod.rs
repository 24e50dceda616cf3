//! Utility functions shared across the decoder workspace.
//!
//! This module provides a calldata log formatter, serde helpers for wide
//! unsigned integers and the fixed contract addresses the decoders recognise.

pub mod constants;
pub mod formatting;
pub mod uint_string;

pub use constants::{COMPOSABLE_COW_ADDRESS, GPV2_SETTLEMENT_ADDRESS, TWAP_HANDLER_ADDRESS};
pub use formatting::truncate_hex;
