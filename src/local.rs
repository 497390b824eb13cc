//! Thread-safe in-process ledger enforcing a per-identity cooldown between grants.
//!
//! Each identity moves through `Unseen → Cooling(since) → Ready` as described by
//! [`LedgerState`]. The first dispense for an unseen identity always succeeds, so no separate
//! registration step exists. The check-then-set sequence runs under one write lock, which keeps
//! two concurrent dispenses for the same identity from both reading a stale timestamp.

// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	dispenser::{Dispenser, DispenserFuture},
	grant::{BackendKind, Balance, GrantResult, Identity},
};

type EntryMap = RwLock<HashMap<Identity, Entry>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
	balance: Balance,
	last_grant: OffsetDateTime,
}

/// Cooldown state of one identity as seen at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerState {
	/// Never granted.
	Unseen,
	/// Granted at `since`; the next grant is allowed at `ready_at`.
	Cooling {
		/// Instant of the most recent grant.
		since: OffsetDateTime,
		/// First instant at which another grant is allowed.
		ready_at: OffsetDateTime,
	},
	/// Granted at `since` and the cooldown window has elapsed.
	Ready {
		/// Instant of the most recent grant.
		since: OffsetDateTime,
	},
}
impl LedgerState {
	/// Whether a dispense issued now would be granted.
	pub fn can_grant(&self) -> bool {
		!matches!(self, Self::Cooling { .. })
	}
}

/// In-memory ledger owned by a single dispenser; state lives as long as the ledger does.
pub struct LocalLedger {
	entries: EntryMap,
	clock: Arc<dyn Clock>,
}
impl LocalLedger {
	/// Minimum time between two grants to the same identity.
	pub const COOLDOWN_WINDOW: Duration = Duration::milliseconds(5_000);
	/// Field label shown next to the identity input.
	pub const IDENTITY_LABEL: &'static str = "Name";

	/// Creates an empty ledger driven by the system clock.
	pub fn new() -> Self {
		Self::with_clock(Arc::new(SystemClock))
	}

	/// Creates an empty ledger driven by `clock`.
	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self { entries: Default::default(), clock }
	}

	/// Attempts one grant for `identity` at the clock's current instant.
	pub fn grant(&self, identity: &Identity) -> GrantResult {
		let now = self.clock.now();
		let mut entries = self.entries.write();

		match entries.get_mut(identity.as_str()) {
			None => {
				entries.insert(
					identity.clone(),
					Entry { balance: Balance::ZERO.incremented(), last_grant: now },
				);

				GrantResult::Granted
			},
			Some(entry) if Self::cooled_down(entry, now) => {
				entry.balance = entry.balance.incremented();
				entry.last_grant = now;

				GrantResult::Granted
			},
			Some(_) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(
					identity = identity.as_str(),
					"HTTP 429: Too Many Cupcakes (you must wait at least 5 seconds between cupcakes)"
				);

				GrantResult::DeniedCooldown
			},
		}
	}

	/// Returns the balance for `identity`, or zero if it was never granted.
	pub fn balance(&self, identity: &str) -> Balance {
		self.entries.read().get(identity).map(|entry| entry.balance).unwrap_or_default()
	}

	/// Reports the cooldown state of `identity` without changing it.
	pub fn state_of(&self, identity: &str) -> LedgerState {
		let now = self.clock.now();
		let entry = self.entries.read().get(identity).copied();

		match entry {
			None => LedgerState::Unseen,
			Some(entry) if Self::cooled_down(&entry, now) =>
				LedgerState::Ready { since: entry.last_grant },
			Some(entry) => LedgerState::Cooling {
				since: entry.last_grant,
				ready_at: entry.last_grant + Self::COOLDOWN_WINDOW,
			},
		}
	}

	/// Returns when `identity` may next be granted, or `None` if it may be granted now.
	pub fn next_grant_at(&self, identity: &str) -> Option<OffsetDateTime> {
		match self.state_of(identity) {
			LedgerState::Cooling { ready_at, .. } => Some(ready_at),
			_ => None,
		}
	}

	/// Number of identities that have received at least one grant.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Whether no identity has been granted yet.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	fn cooled_down(entry: &Entry, now: OffsetDateTime) -> bool {
		now - entry.last_grant >= Self::COOLDOWN_WINDOW
	}
}
impl Default for LocalLedger {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for LocalLedger {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LocalLedger").field("identities", &self.len()).finish()
	}
}
impl Dispenser for LocalLedger {
	fn dispense<'a>(&'a self, identity: &'a Identity) -> DispenserFuture<'a, GrantResult> {
		let outcome = self.grant(identity);

		Box::pin(async move { outcome })
	}

	fn balance_of<'a>(&'a self, identity: &'a Identity) -> DispenserFuture<'a, Result<Balance>> {
		let balance = self.balance(identity);

		Box::pin(async move { Ok(balance) })
	}

	fn default_identity(&self) -> DispenserFuture<'_, Result<Option<Identity>>> {
		Box::pin(async { Ok(None) })
	}

	fn identity_label(&self) -> &'static str {
		Self::IDENTITY_LABEL
	}

	fn backend_kind(&self) -> BackendKind {
		BackendKind::Local
	}
}
