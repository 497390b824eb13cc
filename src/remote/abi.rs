//! Minimal Solidity ABI helpers for the two vending machine entry points.

// crates.io
use serde_json::Value;
use tiny_keccak::{Hasher, Keccak};
// self
use crate::{error::TransportError, grant::Balance, remote::Address};

/// Mutating entry point that grants one cupcake.
pub const GIVE_CUPCAKE_TO: &str = "giveCupcakeTo(address)";
/// View entry point that returns a cupcake balance.
pub const GET_CUPCAKE_BALANCE_FOR: &str = "getCupcakeBalanceFor(address)";

const WORD_LEN: usize = 32;

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
	let mut hasher = Keccak::v256();
	let mut output = [0_u8; 32];

	hasher.update(data);
	hasher.finalize(&mut output);

	output
}

/// First four bytes of the signature hash.
pub fn selector(signature: &str) -> [u8; 4] {
	let hash = keccak256(signature.as_bytes());

	[hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes a call to `signature` with a single address argument as `0x` hex calldata.
pub fn encode_address_call(signature: &str, address: &Address) -> String {
	let mut calldata = Vec::with_capacity(4 + WORD_LEN);

	calldata.extend_from_slice(&selector(signature));
	calldata.extend_from_slice(&[0_u8; WORD_LEN - 20]);
	calldata.extend_from_slice(address.as_bytes());

	format!("0x{}", hex::encode(calldata))
}

/// Decodes a single `uint256` return word into a [`Balance`].
pub fn decode_balance(method: &'static str, value: &Value) -> Result<Balance, TransportError> {
	let raw = value
		.as_str()
		.ok_or_else(|| TransportError::unexpected(method, "result is not a hex string"))?;
	let body = strip_hex_prefix(method, raw)?;

	if body.is_empty() {
		return Err(TransportError::unexpected(
			method,
			"empty return data, is the contract deployed at this address",
		));
	}
	if body.len() > WORD_LEN * 2 {
		return Err(TransportError::unexpected(method, "return data is longer than one word"));
	}

	let significant = body.trim_start_matches('0');

	if significant.len() > 16 {
		return Err(TransportError::unexpected(method, "balance does not fit in 64 bits"));
	}
	if significant.is_empty() {
		return Ok(Balance::ZERO);
	}

	u64::from_str_radix(significant, 16)
		.map(Balance::new)
		.map_err(|_| TransportError::unexpected(method, "return data is not hex"))
}

/// Decodes a JSON-RPC quantity such as a receipt status (`"0x1"`).
pub fn decode_quantity(method: &'static str, value: &Value) -> Result<u64, TransportError> {
	let raw = value
		.as_str()
		.ok_or_else(|| TransportError::unexpected(method, "quantity is not a hex string"))?;
	let body = strip_hex_prefix(method, raw)?;

	u64::from_str_radix(body, 16)
		.map_err(|_| TransportError::unexpected(method, format!("`{raw}` is not a quantity")))
}

fn strip_hex_prefix<'a>(method: &'static str, raw: &'a str) -> Result<&'a str, TransportError> {
	raw.strip_prefix("0x").ok_or_else(|| TransportError::unexpected(method, "missing 0x prefix"))
}
