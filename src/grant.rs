//! Domain types shared by every dispenser backend.

pub mod balance;
pub mod identity;

pub use balance::*;
pub use identity::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Which ledger a dispenser talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
	/// In-process ledger with a local cooldown policy.
	Local,
	/// Contract on a remote chain, reached over JSON-RPC.
	Remote,
}
impl BackendKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Local => "local",
			Self::Remote => "remote",
		}
	}

	/// Whether callers must supply an endpoint for this backend.
	pub const fn requires_endpoint(self) -> bool {
		matches!(self, Self::Remote)
	}
}
impl Display for BackendKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for BackendKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"local" => Ok(Self::Local),
			"remote" => Ok(Self::Remote),
			_ => Err(ConfigError::UnknownBackend { value: s.to_owned() }),
		}
	}
}

/// Outcome of a single dispense attempt.
#[derive(Debug)]
pub enum GrantResult {
	/// One cupcake was granted.
	Granted,
	/// The identity is still inside its cooldown window. A policy result, not a failure.
	DeniedCooldown,
	/// The attempt failed; the error says why.
	Failed(Error),
}
impl GrantResult {
	/// Returns `true` only for [`GrantResult::Granted`].
	pub fn is_granted(&self) -> bool {
		matches!(self, Self::Granted)
	}

	/// Returns the failure, if any.
	pub fn error(&self) -> Option<&Error> {
		match self {
			Self::Failed(err) => Some(err),
			_ => None,
		}
	}

	/// Converts into a `Result` whose `Ok` value says whether a cupcake was granted.
	pub fn into_result(self) -> Result<bool> {
		match self {
			Self::Granted => Ok(true),
			Self::DeniedCooldown => Ok(false),
			Self::Failed(err) => Err(err),
		}
	}
}
impl From<Error> for GrantResult {
	fn from(err: Error) -> Self {
		Self::Failed(err)
	}
}
