//! Settings-change variants.
//!
//! A settings change is a Safe calling itself to alter its own configuration:
//! owners, threshold, singleton, modules, guard or fallback handler. The
//! address type is generic so the classifier can extract raw addresses first
//! and enrich them in a separate, batched step.

use crate::address::AddressInfo;
use crate::utils::uint_string;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Closed set of Safe settings changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingsChange<A = AddressInfo> {
	#[serde(rename_all = "camelCase")]
	AddOwner {
		owner: A,
		#[serde(with = "uint_string")]
		threshold: U256,
	},
	#[serde(rename_all = "camelCase")]
	RemoveOwner {
		owner: A,
		#[serde(with = "uint_string")]
		threshold: U256,
	},
	#[serde(rename_all = "camelCase")]
	SwapOwner { old_owner: A, new_owner: A },
	#[serde(rename_all = "camelCase")]
	ChangeThreshold {
		#[serde(with = "uint_string")]
		threshold: U256,
	},
	#[serde(rename_all = "camelCase")]
	ChangeImplementation { implementation: A },
	#[serde(rename_all = "camelCase")]
	EnableModule { module: A },
	#[serde(rename_all = "camelCase")]
	DisableModule { module: A },
	#[serde(rename_all = "camelCase")]
	SetGuard { guard: A },
	DeleteGuard,
	#[serde(rename_all = "camelCase")]
	SetFallbackHandler { handler: A },
}

impl<A> SettingsChange<A> {
	/// Every address carried by this change, in field order.
	pub fn addresses(&self) -> Vec<&A> {
		match self {
			SettingsChange::AddOwner { owner, .. } | SettingsChange::RemoveOwner { owner, .. } => {
				vec![owner]
			},
			SettingsChange::SwapOwner {
				old_owner,
				new_owner,
			} => vec![old_owner, new_owner],
			SettingsChange::ChangeThreshold { .. } | SettingsChange::DeleteGuard => vec![],
			SettingsChange::ChangeImplementation { implementation } => vec![implementation],
			SettingsChange::EnableModule { module } | SettingsChange::DisableModule { module } => {
				vec![module]
			},
			SettingsChange::SetGuard { guard } => vec![guard],
			SettingsChange::SetFallbackHandler { handler } => vec![handler],
		}
	}

	/// Converts every address with `f`, keeping the variant and scalar fields.
	pub fn map_addresses<B, F>(self, mut f: F) -> SettingsChange<B>
	where
		F: FnMut(A) -> B,
	{
		match self {
			SettingsChange::AddOwner { owner, threshold } => SettingsChange::AddOwner {
				owner: f(owner),
				threshold,
			},
			SettingsChange::RemoveOwner { owner, threshold } => SettingsChange::RemoveOwner {
				owner: f(owner),
				threshold,
			},
			SettingsChange::SwapOwner {
				old_owner,
				new_owner,
			} => SettingsChange::SwapOwner {
				old_owner: f(old_owner),
				new_owner: f(new_owner),
			},
			SettingsChange::ChangeThreshold { threshold } => {
				SettingsChange::ChangeThreshold { threshold }
			},
			SettingsChange::ChangeImplementation { implementation } => {
				SettingsChange::ChangeImplementation {
					implementation: f(implementation),
				}
			},
			SettingsChange::EnableModule { module } => SettingsChange::EnableModule {
				module: f(module),
			},
			SettingsChange::DisableModule { module } => SettingsChange::DisableModule {
				module: f(module),
			},
			SettingsChange::SetGuard { guard } => SettingsChange::SetGuard { guard: f(guard) },
			SettingsChange::DeleteGuard => SettingsChange::DeleteGuard,
			SettingsChange::SetFallbackHandler { handler } => SettingsChange::SetFallbackHandler {
				handler: f(handler),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, Address};

	#[test]
	fn test_swap_owner_addresses_in_field_order() {
		let old = address!("0000000000000000000000000000000000000001");
		let new = address!("0000000000000000000000000000000000000002");
		let change: SettingsChange<Address> = SettingsChange::SwapOwner {
			old_owner: old,
			new_owner: new,
		};

		assert_eq!(change.addresses(), vec![&old, &new]);
	}

	#[test]
	fn test_map_addresses_enriches_and_keeps_threshold() {
		let owner = address!("00000000000000000000000000000000000000aa");
		let change: SettingsChange<Address> = SettingsChange::RemoveOwner {
			owner,
			threshold: U256::from(2),
		};

		let enriched = change.map_addresses(|a| AddressInfo::new(a).with_name("Alice"));
		assert_eq!(
			enriched,
			SettingsChange::RemoveOwner {
				owner: AddressInfo::new(owner).with_name("Alice"),
				threshold: U256::from(2),
			}
		);
	}

	#[test]
	fn test_wire_format() {
		let change: SettingsChange = SettingsChange::ChangeThreshold {
			threshold: U256::from(3),
		};
		let json = serde_json::to_value(&change).unwrap();
		assert_eq!(json["type"], "CHANGE_THRESHOLD");
		assert_eq!(json["threshold"], "3");

		let json = serde_json::to_value(SettingsChange::<AddressInfo>::DeleteGuard).unwrap();
		assert_eq!(json, serde_json::json!({ "type": "DELETE_GUARD" }));
	}
}
