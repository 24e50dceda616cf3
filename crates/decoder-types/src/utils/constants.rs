//! Fixed contract addresses.
//!
//! These contracts are deployed at the same address on every supported
//! chain, so the decoders treat them as compile-time configuration.

use alloy_primitives::{address, Address};

/// CoW Protocol `ComposableCoW` conditional order registry.
pub const COMPOSABLE_COW_ADDRESS: Address = address!("fdaFc9d1902f4e0b84f65F49f244b32b31013b74");

/// CoW Protocol TWAP order handler.
pub const TWAP_HANDLER_ADDRESS: Address = address!("6cF1e9cA41f7611dEf408122793c358a3d11E5a5");

/// CoW Protocol `GPv2Settlement` contract, which tracks pre-signed orders.
pub const GPV2_SETTLEMENT_ADDRESS: Address = address!("9008D19f58AAbD9eD0D60971565AA8510560ab41");
