//! Transaction decoding for Safe accounts.
//!
//! This crate turns raw Safe transaction calldata into a classified
//! description of what it does: a native transfer, a MultiSend batch (whose
//! entries are classified recursively), a CoW Protocol TWAP order
//! registration, a GPv2 pre-signature, a change of the Safe's own settings,
//! or an opaque custom call.
//!
//! Every decoder follows the same contract. Calldata that is not the shape a
//! decoder looks for yields `Ok(None)`. Calldata that matches a known
//! selector but cannot be decoded yields a [`DecodeError`], which aborts
//! only the transaction it belongs to.

mod error;
pub mod multi_send;
pub mod pipeline;
pub mod pre_signature;
pub mod settings;
pub mod twap;

pub use error::DecodeError;
pub use multi_send::{decode_multi_send, encode_multi_send, is_multi_send, MULTI_SEND_SELECTOR};
pub use pipeline::{DecodedTransaction, TransactionDecoder, TransactionInfo};
pub use pre_signature::{get_order_uid, get_pre_signature, is_pre_signature, OrderUid, PreSignature};
pub use settings::{
	classify_settings_change, extract_settings_change, is_settings_change, SettingsMethod,
	SAFE_SETTINGS_INTERFACE,
};
pub use twap::{decode_twap_order, is_twap_order, COMPOSABLE_COW_INTERFACE};
