// std
use std::sync::Arc;
// crates.io
use time::{Duration, macros};
// self
use cupcake_dispenser::{
	clock::ManualClock,
	dispenser::DispenserClient,
	error::FailureKind,
	grant::{Balance, GrantResult, Identity},
	local::{LedgerState, LocalLedger},
};

fn build_ledger() -> (LocalLedger, ManualClock) {
	let clock = ManualClock::starting_at(macros::datetime!(2025-11-10 12:00 UTC));

	(LocalLedger::with_clock(Arc::new(clock.clone())), clock)
}

fn identity(value: &str) -> Identity {
	Identity::new(value).expect("Identity fixture should be valid.")
}

#[test]
fn alice_and_bob_walkthrough() {
	let (ledger, clock) = build_ledger();
	let alice = identity("alice");
	let bob = identity("bob");

	assert!(ledger.grant(&alice).is_granted());

	clock.advance(Duration::seconds(1));

	assert!(matches!(ledger.grant(&alice), GrantResult::DeniedCooldown));

	clock.advance(Duration::seconds(5));

	assert!(ledger.grant(&alice).is_granted());
	assert_eq!(ledger.balance("alice"), Balance::new(2));
	assert_eq!(ledger.balance("bob"), Balance::ZERO);
	assert!(ledger.grant(&bob).is_granted());
	assert_eq!(ledger.balance("bob"), Balance::new(1));
}

#[test]
fn cooldown_boundary_is_inclusive() {
	let (ledger, clock) = build_ledger();
	let alice = identity("alice");

	assert!(ledger.grant(&alice).is_granted());

	clock.advance(LocalLedger::COOLDOWN_WINDOW - Duration::milliseconds(1));

	assert!(matches!(ledger.grant(&alice), GrantResult::DeniedCooldown));

	clock.advance(Duration::milliseconds(1));

	assert!(ledger.grant(&alice).is_granted());
}

#[test]
fn denial_keeps_the_original_grant_time() {
	let (ledger, clock) = build_ledger();
	let alice = identity("alice");
	let start = macros::datetime!(2025-11-10 12:00 UTC);

	assert!(ledger.grant(&alice).is_granted());

	clock.advance(Duration::seconds(3));

	assert!(matches!(ledger.grant(&alice), GrantResult::DeniedCooldown));
	assert_eq!(ledger.next_grant_at("alice"), Some(start + LocalLedger::COOLDOWN_WINDOW));

	clock.advance(Duration::seconds(2));

	assert_eq!(ledger.state_of("alice"), LedgerState::Ready { since: start });
	assert!(ledger.grant(&alice).is_granted());
}

#[test]
fn identities_are_independent_and_case_sensitive() {
	let (ledger, _clock) = build_ledger();

	assert!(ledger.grant(&identity("alice")).is_granted());
	assert!(ledger.grant(&identity("Alice")).is_granted());
	assert!(ledger.grant(&identity(" alice")).is_granted());
	assert_eq!(ledger.len(), 3);
}

#[test]
fn balance_reads_never_register_identities() {
	let (ledger, _clock) = build_ledger();

	assert_eq!(ledger.balance("carol"), Balance::ZERO);
	assert_eq!(ledger.state_of("carol"), LedgerState::Unseen);
	assert!(ledger.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispenses_grant_exactly_once() {
	let (ledger, _clock) = build_ledger();
	let client = DispenserClient::local(ledger);
	let tasks = (0..16)
		.map(|_| {
			let client = client.clone();

			tokio::spawn(async move { client.dispense("alice").await.is_granted() })
		})
		.collect::<Vec<_>>();
	let mut granted = 0;

	for task in tasks {
		if task.await.expect("Dispense task should not panic.") {
			granted += 1;
		}
	}

	assert_eq!(granted, 1);
	assert_eq!(
		client.balance_of("alice").await.expect("Local balance reads should succeed."),
		Balance::new(1)
	);
}

#[tokio::test]
async fn client_surfaces_cooldown_and_identity_failures() {
	let (ledger, clock) = build_ledger();
	let client = DispenserClient::local(ledger);

	assert!(client.dispense("alice").await.is_granted());
	assert!(matches!(client.dispense("alice").await, GrantResult::DeniedCooldown));
	assert_eq!(
		client.dispense("").await.error().map(|err| err.kind()),
		Some(FailureKind::InvalidIdentity)
	);

	clock.advance(Duration::seconds(5));

	assert!(client.dispense("alice").await.into_result().expect("Grant should not fail."));
}
