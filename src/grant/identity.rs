//! Opaque recipient identity keyed exactly as supplied.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Error returned when an identity cannot be used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentityError {
	/// The identity was the empty string.
	#[error("Identity cannot be empty.")]
	Empty,
}

/// Recipient key for grants and balances.
///
/// The string is stored verbatim: no trimming, case folding, or other normalization, so
/// `"alice"`, `"Alice"`, and `" alice"` are three different recipients.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);
impl Identity {
	/// Creates an identity, rejecting only the empty string.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
		Self::try_from(value.into())
	}

	/// Borrows the raw identity string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Deref for Identity {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for Identity {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for Identity {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<Identity> for String {
	fn from(value: Identity) -> Self {
		value.0
	}
}
impl TryFrom<String> for Identity {
	type Error = IdentityError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value.is_empty() {
			return Err(IdentityError::Empty);
		}

		Ok(Self(value))
	}
}
impl FromStr for Identity {
	type Err = IdentityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for Identity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Identity({:?})", self.0)
	}
}
impl Display for Identity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identities_are_kept_verbatim() {
		assert_eq!(Identity::new(""), Err(IdentityError::Empty));

		let plain = Identity::new("alice").expect("Plain identity should be accepted.");
		let padded = Identity::new(" alice").expect("Whitespace identity should be accepted.");
		let upper = Identity::new("Alice").expect("Mixed-case identity should be accepted.");

		assert_eq!(padded.as_str(), " alice");
		assert_ne!(plain, padded);
		assert_ne!(plain, upper);
	}

	#[test]
	fn serde_round_trip_rejects_empty() {
		let identity: Identity =
			serde_json::from_str("\"bob \"").expect("Identity should deserialize.");

		assert_eq!(identity.as_str(), "bob ");
		assert!(serde_json::from_str::<Identity>("\"\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<Identity, u8> = HashMap::from_iter([(
			Identity::new("carol").expect("Identity used for lookup should be valid."),
			3_u8,
		)]);

		assert_eq!(map.get("carol"), Some(&3));
		assert_eq!(map.get("Carol"), None);
	}
}
