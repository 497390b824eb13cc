//! Dispenses through the contract client against a mocked JSON-RPC node.
//!
//! The mock answers every read with the same balance, so the grant fails verification: the
//! client only reports success when the balance moves by exactly one.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use cupcake_dispenser::{
	dispenser::DispenserClient,
	grant::{BackendKind, GrantResult},
};

const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const SIGNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const TX: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	for (method, result) in [
		("eth_requestAccounts", json!([SIGNER])),
		("eth_call", json!(format!("0x{:064x}", 1))),
		("eth_sendTransaction", json!(TX)),
		("eth_getTransactionReceipt", json!({ "transactionHash": TX, "status": "0x1" })),
	] {
		server
			.mock_async(|when, then| {
				when.method(POST).body_includes(method);
				then.status(200)
					.header("content-type", "application/json")
					.body(json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string());
			})
			.await;
	}

	let endpoint = format!("{CONTRACT}@{}", server.url("/"));
	let client = DispenserClient::connect(BackendKind::Remote, Some(&endpoint))?;
	let identity = client.identity_or_default("").await?;

	println!("{} prefilled with {identity:?}", client.identity_label());

	let recipient = identity.map(|identity| identity.to_string()).unwrap_or_default();

	match client.dispense(&recipient).await {
		GrantResult::Granted => println!("granted"),
		GrantResult::DeniedCooldown => println!("denied, still cooling down"),
		GrantResult::Failed(err) => println!("not granted ({}): {err}", err.kind()),
	}

	println!("balance {}", client.balance_of(&recipient).await?);

	Ok(())
}
