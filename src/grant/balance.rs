//! Grant counts per identity.

// self
use crate::_prelude::*;

/// Number of cupcakes granted to an identity.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(u64);
impl Balance {
	/// Zero grants.
	pub const ZERO: Self = Self(0);

	/// Wraps a raw count.
	pub const fn new(count: u64) -> Self {
		Self(count)
	}

	/// Returns the raw count.
	pub const fn get(self) -> u64 {
		self.0
	}

	/// Adds one grant, saturating at `u64::MAX`.
	pub const fn incremented(self) -> Self {
		Self(self.0.saturating_add(1))
	}

	/// Whether `after` is exactly one grant more than `self`.
	pub fn gained_one(self, after: Self) -> bool {
		self.0.checked_add(1) == Some(after.0)
	}
}
impl From<u64> for Balance {
	fn from(count: u64) -> Self {
		Self(count)
	}
}
impl From<Balance> for u64 {
	fn from(balance: Balance) -> Self {
		balance.0
	}
}
impl Display for Balance {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
