//! JSON-RPC transport primitives for talking to a ledger node.
//!
//! [`LedgerTransport`] is the remote client's only dependency on an HTTP stack. It carries one
//! JSON-RPC 2.0 call at a time and hands back the `result` member, mapping the `error` member to
//! [`TransportError::Rpc`]. A `null` result is returned as [`serde_json::Value::Null`] so callers
//! can treat "not mined yet" and similar answers as data.

// std
#[cfg(feature = "reqwest")] use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`LedgerTransport::call`].
pub type RpcFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, TransportError>> + 'a + Send>>;

/// Executes JSON-RPC calls against a ledger node.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the remote
/// client, its signer, and every in-flight operation.
pub trait LedgerTransport
where
	Self: 'static + Send + Sync,
{
	/// Invokes `method` with positional `params` and returns the `result` member.
	fn call(&self, method: &'static str, params: Value) -> RpcFuture<'_>;
}

#[cfg(any(test, feature = "reqwest"))]
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
	code: i64,
	#[serde(default)]
	message: String,
}

/// Decodes a JSON-RPC 2.0 response body into its `result` member.
pub fn decode_response(body: &[u8]) -> Result<Value, TransportError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let response: RpcResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransportError::MalformedResponse { source })?;

	match response {
		RpcResponse { error: Some(RpcErrorObject { code, message }), .. } =>
			Err(TransportError::Rpc { code, message }),
		RpcResponse { result, .. } => Ok(result.unwrap_or(Value::Null)),
	}
}

/// Reqwest-backed transport posting JSON-RPC envelopes to a single node URL.
#[cfg(feature = "reqwest")]
#[derive(Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	endpoint: Url,
	next_id: AtomicU64,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Creates a transport with a default reqwest client.
	pub fn new(endpoint: Url) -> Self {
		Self::with_client(ReqwestClient::new(), endpoint)
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint, next_id: AtomicU64::new(1) }
	}

	/// Node URL every call is posted to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}
}
#[cfg(feature = "reqwest")]
impl LedgerTransport for ReqwestTransport {
	fn call(&self, method: &'static str, params: Value) -> RpcFuture<'_> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);

		Box::pin(async move {
			let request = RpcRequest { jsonrpc: "2.0", id, method, params: &params };
			let response = self.client.post(self.endpoint.clone()).json(&request).send().await?;
			let status = response.status();
			let body = response.bytes().await?;

			if status.is_success() {
				return decode_response(&body);
			}

			// Some nodes pair a JSON-RPC error object with a 4xx/5xx status.
			match decode_response(&body) {
				Err(err @ TransportError::Rpc { .. }) => Err(err),
				_ => Err(TransportError::HttpStatus { status: status.as_u16() }),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decode_returns_result_or_null() {
		let value = decode_response(br#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
			.expect("Result member should decode.");

		assert_eq!(value, Value::String("0x1".into()));

		let pending = decode_response(br#"{"jsonrpc":"2.0","id":2,"result":null}"#)
			.expect("Null result should decode.");

		assert!(pending.is_null());
	}

	#[test]
	fn decode_maps_error_objects() {
		let err = decode_response(
			br#"{"jsonrpc":"2.0","id":3,"error":{"code":4001,"message":"User rejected the request."}}"#,
		)
		.expect_err("Error member should surface as an error.");

		assert!(matches!(
			err,
			TransportError::Rpc { code: 4001, ref message } if message.contains("rejected")
		));
	}

	#[test]
	fn decode_reports_the_failing_path() {
		let err = decode_response(br#"{"jsonrpc":"2.0","id":4,"error":{"code":"oops"}}"#)
			.expect_err("A non-numeric error code should be rejected.");

		match err {
			TransportError::MalformedResponse { source } =>
				assert!(source.path().to_string().ends_with("code")),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn request_envelope_is_json_rpc_2() {
		let params = serde_json::json!(["0xabc", "latest"]);
		let request = RpcRequest { jsonrpc: "2.0", id: 7, method: "eth_call", params: &params };
		let payload = serde_json::to_value(&request).expect("Request should serialize.");

		assert_eq!(
			payload,
			serde_json::json!({
				"jsonrpc": "2.0",
				"id": 7,
				"method": "eth_call",
				"params": ["0xabc", "latest"],
			})
		);
	}
}
