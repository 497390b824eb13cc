//! Walks two identities through the in-process ledger's cooldown window.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
// self
use cupcake_dispenser::{
	dispenser::DispenserClient,
	grant::GrantResult,
	local::LocalLedger,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client = DispenserClient::local(LocalLedger::new());

	println!(
		"{} backend, identity field labeled {:?}",
		client.backend_kind(),
		client.identity_label()
	);

	for name in ["alice", "alice", "bob"] {
		report(&client, name).await?;
	}

	println!("Waiting out the cooldown...");
	tokio::time::sleep(Duration::from_millis(5_000)).await;

	report(&client, "alice").await?;

	Ok(())
}

async fn report(client: &DispenserClient, name: &str) -> Result<()> {
	let verdict = match client.dispense(name).await {
		GrantResult::Granted => "granted",
		GrantResult::DeniedCooldown => "denied, still cooling down",
		GrantResult::Failed(err) => return Err(err.into()),
	};
	let balance = client.balance_of(name).await?;

	println!("{name}: {verdict}, balance {balance}");

	Ok(())
}
