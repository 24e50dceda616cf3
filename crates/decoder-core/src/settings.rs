//! Safe settings changes.
//!
//! Owner, threshold, singleton, module, guard and fallback handler
//! management all go through a fixed set of nine Safe methods. Arguments are
//! read by position because on-chain ABIs do not always carry names.

use crate::DecodeError;
use alloy_primitives::{Address, U256};
use decoder_abi::{DecodedCall, InterfaceDescriptor};
use decoder_resolver::ResolverService;
use decoder_types::{AddressKind, SettingsChange};
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

/// The Safe methods that change the Safe's own configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsMethod {
	AddOwnerWithThreshold,
	RemoveOwner,
	SwapOwner,
	ChangeThreshold,
	ChangeMasterCopy,
	EnableModule,
	DisableModule,
	SetGuard,
	SetFallbackHandler,
}

impl SettingsMethod {
	pub const ALL: [SettingsMethod; 9] = [
		SettingsMethod::AddOwnerWithThreshold,
		SettingsMethod::RemoveOwner,
		SettingsMethod::SwapOwner,
		SettingsMethod::ChangeThreshold,
		SettingsMethod::ChangeMasterCopy,
		SettingsMethod::EnableModule,
		SettingsMethod::DisableModule,
		SettingsMethod::SetGuard,
		SettingsMethod::SetFallbackHandler,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			SettingsMethod::AddOwnerWithThreshold => "addOwnerWithThreshold",
			SettingsMethod::RemoveOwner => "removeOwner",
			SettingsMethod::SwapOwner => "swapOwner",
			SettingsMethod::ChangeThreshold => "changeThreshold",
			SettingsMethod::ChangeMasterCopy => "changeMasterCopy",
			SettingsMethod::EnableModule => "enableModule",
			SettingsMethod::DisableModule => "disableModule",
			SettingsMethod::SetGuard => "setGuard",
			SettingsMethod::SetFallbackHandler => "setFallbackHandler",
		}
	}

	/// Human-readable signature with the parameter names used by the Safe contracts.
	fn signature(&self) -> &'static str {
		match self {
			SettingsMethod::AddOwnerWithThreshold => {
				"addOwnerWithThreshold(address owner,uint256 _threshold)"
			},
			SettingsMethod::RemoveOwner => {
				"removeOwner(address prevOwner,address owner,uint256 _threshold)"
			},
			SettingsMethod::SwapOwner => {
				"swapOwner(address prevOwner,address oldOwner,address newOwner)"
			},
			SettingsMethod::ChangeThreshold => "changeThreshold(uint256 _threshold)",
			SettingsMethod::ChangeMasterCopy => "changeMasterCopy(address _masterCopy)",
			SettingsMethod::EnableModule => "enableModule(address module)",
			SettingsMethod::DisableModule => "disableModule(address prevModule,address module)",
			SettingsMethod::SetGuard => "setGuard(address guard)",
			SettingsMethod::SetFallbackHandler => "setFallbackHandler(address handler)",
		}
	}
}

impl FromStr for SettingsMethod {
	type Err = DecodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		SettingsMethod::ALL
			.into_iter()
			.find(|m| m.as_str() == s)
			.ok_or_else(|| DecodeError::UnknownSettingsMethod(s.to_string()))
	}
}

impl fmt::Display for SettingsMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The Safe owner-manager, module-manager and guard-manager methods.
///
/// A signature that fails to parse is logged and left out.
pub static SAFE_SETTINGS_INTERFACE: Lazy<InterfaceDescriptor> = Lazy::new(|| {
	let functions = SettingsMethod::ALL
		.iter()
		.filter_map(|method| {
			decoder_abi::FunctionSignature::parse(method.signature())
				.inspect_err(|e| tracing::error!(method = %method, error = %e, "Invalid settings signature"))
				.ok()
		})
		.collect();
	InterfaceDescriptor::new(functions)
});

/// Selector-only check for the nine settings methods.
pub fn is_settings_change(data: &[u8]) -> bool {
	SAFE_SETTINGS_INTERFACE.matches(data)
}

/// Decodes `data` as a settings method call, or `Ok(None)` for any other selector.
pub fn decode_settings_call(data: &[u8]) -> Result<Option<DecodedCall>, DecodeError> {
	Ok(SAFE_SETTINGS_INTERFACE.decode(data)?)
}

fn address_at(call: &DecodedCall, index: usize) -> Result<Address, DecodeError> {
	call.address_arg(index)
		.ok_or_else(|| DecodeError::MissingParameter {
			method: call.method.clone(),
			index,
		})
}

fn uint_at(call: &DecodedCall, index: usize) -> Result<U256, DecodeError> {
	call.uint_arg(index).ok_or_else(|| DecodeError::MissingParameter {
		method: call.method.clone(),
		index,
	})
}

/// Maps a decoded settings call onto its [`SettingsChange`], with raw
/// addresses.
///
/// # Errors
///
/// [`DecodeError::UnknownSettingsMethod`] if the method is not one of the
/// nine settings methods; [`DecodeError::MissingParameter`] if an argument
/// is absent or has the wrong type at its fixed position.
pub fn extract_settings_change(call: &DecodedCall) -> Result<SettingsChange<Address>, DecodeError> {
	let method: SettingsMethod = call.method.parse()?;

	let change = match method {
		SettingsMethod::AddOwnerWithThreshold => SettingsChange::AddOwner {
			owner: address_at(call, 0)?,
			threshold: uint_at(call, 1)?,
		},
		SettingsMethod::RemoveOwner => SettingsChange::RemoveOwner {
			owner: address_at(call, 1)?,
			threshold: uint_at(call, 2)?,
		},
		SettingsMethod::SwapOwner => SettingsChange::SwapOwner {
			old_owner: address_at(call, 1)?,
			new_owner: address_at(call, 2)?,
		},
		SettingsMethod::ChangeThreshold => SettingsChange::ChangeThreshold {
			threshold: uint_at(call, 0)?,
		},
		SettingsMethod::ChangeMasterCopy => SettingsChange::ChangeImplementation {
			implementation: address_at(call, 0)?,
		},
		SettingsMethod::EnableModule => SettingsChange::EnableModule {
			module: address_at(call, 0)?,
		},
		SettingsMethod::DisableModule => SettingsChange::DisableModule {
			module: address_at(call, 1)?,
		},
		SettingsMethod::SetGuard => {
			let guard = address_at(call, 0)?;
			if guard.is_zero() {
				SettingsChange::DeleteGuard
			} else {
				SettingsChange::SetGuard { guard }
			}
		},
		SettingsMethod::SetFallbackHandler => SettingsChange::SetFallbackHandler {
			handler: address_at(call, 0)?,
		},
	};

	Ok(change)
}

/// Classifies a settings call and enriches its addresses.
///
/// Lookups for the addresses of one change run concurrently. Callers
/// classifying many transactions should prefer
/// [`crate::TransactionDecoder::decode_all`], which deduplicates lookups
/// across the whole list.
pub async fn classify_settings_change(
	chain_id: u64,
	call: &DecodedCall,
	resolver: &ResolverService,
) -> Result<SettingsChange, DecodeError> {
	let change = extract_settings_change(call)?;
	let addresses: Vec<Address> = change.addresses().into_iter().copied().collect();
	let resolved = resolver
		.resolve_many(chain_id, addresses, &[AddressKind::Contract])
		.await;

	Ok(change.map_addresses(|address| {
		resolved
			.get(&address)
			.cloned()
			.unwrap_or_else(|| address.into())
	}))
}
