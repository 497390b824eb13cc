//! 20-byte account addresses used as remote identities and contract locations.

// self
use crate::_prelude::*;

/// Error returned when an address string cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum AddressError {
	/// The `0x` prefix is missing.
	#[error("Address must start with 0x.")]
	MissingPrefix,
	/// The hex body is not 40 characters long.
	#[error("Address must have 40 hex digits, found {found}.")]
	WrongLength {
		/// Number of characters after the prefix.
		found: usize,
	},
	/// The body contains a non-hex character.
	#[error("Address contains a non-hex character.")]
	NotHex,
}

/// Account or contract address.
///
/// Parsing accepts either hex case and does not verify EIP-55 checksums; the node is the
/// authority on which addresses exist. Display is lowercase with a `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);
impl Address {
	/// Wraps raw address bytes.
	pub const fn from_bytes(bytes: [u8; 20]) -> Self {
		Self(bytes)
	}

	/// Borrows the raw address bytes.
	pub fn as_bytes(&self) -> &[u8; 20] {
		&self.0
	}
}
impl FromStr for Address {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let body = s
			.strip_prefix("0x")
			.or_else(|| s.strip_prefix("0X"))
			.ok_or(AddressError::MissingPrefix)?;

		if body.len() != 40 {
			return Err(AddressError::WrongLength { found: body.len() });
		}

		let mut bytes = [0_u8; 20];

		hex::decode_to_slice(body, &mut bytes).map_err(|_| AddressError::NotHex)?;

		Ok(Self(bytes))
	}
}
impl TryFrom<String> for Address {
	type Error = AddressError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
impl From<Address> for String {
	fn from(value: Address) -> Self {
		value.to_string()
	}
}
impl Debug for Address {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Address({self})")
	}
}
impl Display for Address {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "0x{}", hex::encode(self.0))
	}
}
