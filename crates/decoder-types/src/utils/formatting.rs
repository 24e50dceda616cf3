//! Shortening of long hex payloads for log lines.

use alloy_primitives::hex;

/// Shortens calldata for log output: the selector plus a byte count.
///
/// `0xa9059cbb…(68 bytes)` is enough to correlate a log line with a
/// transaction without dumping the whole payload.
pub fn truncate_hex(data: &[u8]) -> String {
	match data.get(..4) {
		Some(selector) if data.len() > 4 => {
			format!("0x{}…({} bytes)", hex::encode(selector), data.len())
		},
		_ => hex::encode_prefixed(data),
	}
}
