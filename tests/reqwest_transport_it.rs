#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use cupcake_dispenser::{
	dispenser::DispenserClient,
	error::{ConfigError, Error, FailureKind, TransportError},
	grant::{BackendKind, Balance},
	rpc::{LedgerTransport, ReqwestTransport},
	url::Url,
};

const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const SIGNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
const TX: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

fn rpc_result(result: Value) -> String {
	json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

fn word(value: u64) -> Value {
	Value::String(format!("0x{value:064x}"))
}

fn transport(server: &MockServer) -> ReqwestTransport {
	ReqwestTransport::new(Url::parse(&server.url("/")).expect("Mock node URL should parse."))
}

#[tokio::test]
async fn transport_posts_json_rpc_envelopes() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/")
				.header("content-type", "application/json")
				.body_includes("\"jsonrpc\":\"2.0\"")
				.body_includes("\"method\":\"eth_blockNumber\"");
			then.status(200)
				.header("content-type", "application/json")
				.body(rpc_result(json!("0x2a")));
		})
		.await;
	let result = transport(&server)
		.call("eth_blockNumber", json!([]))
		.await
		.expect("Mock node should answer.");

	assert_eq!(result, json!("0x2a"));

	mock.assert_async().await;
}

#[tokio::test]
async fn transport_keeps_rpc_errors_behind_http_failures() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).body_includes("eth_sendTransaction");
			then.status(500).header("content-type", "application/json").body(
				"{\"jsonrpc\":\"2.0\",\"id\":1,\"error\":{\"code\":-32000,\"message\":\"execution reverted\"}}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).body_includes("eth_call");
			then.status(502).body("bad gateway");
		})
		.await;

	let transport = transport(&server);
	let rejected = transport
		.call("eth_sendTransaction", json!([]))
		.await
		.expect_err("JSON-RPC error should surface.");
	let unavailable =
		transport.call("eth_call", json!([])).await.expect_err("HTTP failure should surface.");

	assert!(matches!(rejected, TransportError::Rpc { code: -32000, .. }));
	assert!(matches!(unavailable, TransportError::HttpStatus { status: 502 }));
}

#[tokio::test]
async fn connected_client_dispenses_against_a_json_rpc_node() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).body_includes("eth_requestAccounts");
			then.status(200).body(rpc_result(json!([SIGNER])));
		})
		.await;
	// Request ids are sequential per transport: accounts, read, send, receipt, read.
	server
		.mock_async(|when, then| {
			when.method(POST).body_includes("\"id\":2,").body_includes("eth_call");
			then.status(200).body(rpc_result(word(4)));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).body_includes("\"id\":5,").body_includes("eth_call");
			then.status(200).body(rpc_result(word(5)));
		})
		.await;

	let send = server
		.mock_async(|when, then| {
			when.method(POST)
				.body_includes("eth_sendTransaction")
				.body_includes(&format!("\"from\":\"{SIGNER}\""))
				.body_includes(&format!("\"to\":\"{CONTRACT}\""))
				.body_includes(&RECIPIENT[2..]);
			then.status(200).body(rpc_result(json!(TX)));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).body_includes("eth_getTransactionReceipt").body_includes(TX);
			then.status(200).body(rpc_result(json!({ "transactionHash": TX, "status": "0x1" })));
		})
		.await;

	let endpoint = format!("{CONTRACT}@{}", server.url("/"));
	let client = DispenserClient::connect(BackendKind::Remote, Some(&endpoint))
		.expect("Remote client should connect.");

	assert!(client.dispense(RECIPIENT).await.is_granted());

	send.assert_calls_async(1).await;
}

#[tokio::test]
async fn connected_client_reads_balances() {
	let server = MockServer::start_async().await;
	let read = server
		.mock_async(|when, then| {
			when.method(POST).body_includes("eth_call").body_includes("\"latest\"");
			then.status(200).body(rpc_result(word(3)));
		})
		.await;
	let endpoint = format!("{CONTRACT}@{}", server.url("/"));
	let client = DispenserClient::connect(BackendKind::Remote, Some(&endpoint))
		.expect("Remote client should connect.");
	let balance = client.balance_of(RECIPIENT).await.expect("Balance read should succeed.");

	assert_eq!(balance, Balance::new(3));

	read.assert_async().await;
}

#[tokio::test]
async fn unreachable_node_is_a_network_error() {
	let endpoint = format!("{CONTRACT}@http://127.0.0.1:9");
	let client = DispenserClient::connect(BackendKind::Remote, Some(&endpoint))
		.expect("Construction should not touch the network.");
	let err = client.balance_of(RECIPIENT).await.expect_err("Nothing listens on port 9.");

	assert_eq!(err.kind(), FailureKind::NetworkError);
}

#[test]
fn remote_backend_requires_a_well_formed_endpoint() {
	assert!(matches!(
		DispenserClient::connect(BackendKind::Remote, None),
		Err(Error::Config(ConfigError::MissingEndpoint { kind: BackendKind::Remote }))
	));
	assert!(matches!(
		DispenserClient::connect(BackendKind::Remote, Some("http://127.0.0.1:8545")),
		Err(Error::Config(ConfigError::MalformedEndpoint { .. }))
	));
	assert!(matches!(
		DispenserClient::connect(BackendKind::Local, None),
		Ok(client) if client.backend_kind() == BackendKind::Local
	));
}
