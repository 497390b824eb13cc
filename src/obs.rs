//! Optional observability hooks around dispenser operations.
//!
//! # Feature Flags
//!
//! - `tracing` wraps every [`DispenserClient`](crate::dispenser::DispenserClient) call in a span
//!   named `cupcake_dispenser.operation` carrying `operation` and `backend` fields, and lets the
//!   backends emit debug/warn events (cooldown denials, submitted transactions, balance
//!   mismatches).
//! - `metrics` increments `cupcake_dispenser_operation_total`, labeled by `operation` and
//!   `outcome`.
//!
//! Both compile to no-ops when their feature is off.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::_prelude::*;

/// Dispenser operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Grant attempt.
	Dispense,
	/// Balance read.
	BalanceOf,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Dispense => "dispense",
			Self::BalanceOf => "balance_of",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to the operation.
	Attempt,
	/// A cupcake was granted.
	Granted,
	/// The cooldown refused the grant.
	Denied,
	/// A read completed.
	Success,
	/// An error was returned to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Granted => "granted",
			Self::Denied => "denied",
			Self::Success => "success",
			Self::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
