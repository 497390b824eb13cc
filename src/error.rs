//! Dispenser-level error types shared by both ledger backends.

// self
use crate::{
	_prelude::*,
	grant::{BackendKind, Balance, IdentityError},
	remote::AddressError,
};

/// Dispenser-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical dispenser error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Construction parameters are invalid.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Identity string is unusable.
	#[error(transparent)]
	Identity(#[from] IdentityError),
	/// Identity does not parse as an account address for the remote ledger.
	#[error("Identity is not a valid account address.")]
	InvalidAddress(
		#[from]
		#[source]
		AddressError,
	),
	/// Signing context could not be resolved.
	#[error(transparent)]
	Signer(#[from] SignerError),
	/// Transport failure while talking to the remote node.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Remote ledger refused or reverted the mutating call.
	#[error("Remote ledger rejected the call: {reason}.")]
	Rejected {
		/// Node- or receipt-supplied reason string.
		reason: String,
	},
	/// The call nominally succeeded but the balance did not move by exactly one.
	#[error("Balance moved from {before} to {after} instead of gaining exactly one grant.")]
	VerificationMismatch {
		/// Balance read before submitting the call.
		before: Balance,
		/// Balance read after confirmation.
		after: Balance,
	},
	/// A bounded wait elapsed.
	#[error("Timed out while {stage}.")]
	Timeout {
		/// Which wait elapsed.
		stage: WaitStage,
	},
}
impl Error {
	/// Classifies the error into the caller-facing failure taxonomy.
	pub fn kind(&self) -> FailureKind {
		match self {
			Self::Config(_) => FailureKind::Config,
			Self::Identity(_) | Self::InvalidAddress(_) => FailureKind::InvalidIdentity,
			Self::Signer(SignerError::Unavailable { .. }) => FailureKind::NoSigner,
			Self::Signer(SignerError::Cancelled) => FailureKind::Cancelled,
			Self::Transport(TransportError::Rpc { .. }) | Self::Rejected { .. } =>
				FailureKind::Rejected,
			Self::Transport(_) => FailureKind::NetworkError,
			Self::VerificationMismatch { .. } => FailureKind::VerificationMismatch,
			Self::Timeout { .. } => FailureKind::Timeout,
		}
	}

	/// Returns `true` when retrying (possibly after user action) may succeed.
	///
	/// The dispenser never retries on its own.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self.kind(),
			FailureKind::NoSigner
				| FailureKind::Cancelled
				| FailureKind::NetworkError
				| FailureKind::Timeout
		)
	}
}

/// Caller-facing failure classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	/// Bad construction parameters.
	Config,
	/// Empty identity or an identity the backend cannot address.
	InvalidIdentity,
	/// No compatible signing account.
	NoSigner,
	/// The user declined the approval prompt.
	Cancelled,
	/// Node unreachable or answered with garbage.
	NetworkError,
	/// A bounded wait elapsed.
	Timeout,
	/// The remote ledger refused or reverted the call.
	Rejected,
	/// The post-call balance did not show exactly one new grant.
	VerificationMismatch,
}
impl FailureKind {
	/// Returns a stable label suitable for logs or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Config => "config",
			Self::InvalidIdentity => "invalid_identity",
			Self::NoSigner => "no_signer",
			Self::Cancelled => "cancelled",
			Self::NetworkError => "network_error",
			Self::Timeout => "timeout",
			Self::Rejected => "rejected",
			Self::VerificationMismatch => "verification_mismatch",
		}
	}
}
impl Display for FailureKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Suspension points that accept a timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitStage {
	/// Waiting for the user to approve account access.
	Approval,
	/// Waiting for the submitted transaction to be mined.
	Confirmation,
}
impl Display for WaitStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Approval => f.write_str("awaiting signer approval"),
			Self::Confirmation => f.write_str("awaiting transaction confirmation"),
		}
	}
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The selected backend needs an endpoint but none was supplied.
	#[error("The {kind} backend requires an endpoint.")]
	MissingEndpoint {
		/// Backend that was requested.
		kind: BackendKind,
	},
	/// An endpoint was supplied to a backend that does not use one.
	#[error("The {kind} backend does not accept an endpoint.")]
	UnexpectedEndpoint {
		/// Backend that was requested.
		kind: BackendKind,
	},
	/// Backend selector string is not recognized.
	#[error("Unknown backend `{value}`.")]
	UnknownBackend {
		/// Rejected selector.
		value: String,
	},
	/// Compact endpoint string is not `<contract>@<network-url>`.
	#[error("Endpoint `{value}` must look like `<contract-address>@<network-url>`.")]
	MalformedEndpoint {
		/// Rejected endpoint string.
		value: String,
	},
	/// Network URL cannot be parsed.
	#[error("Network URL is invalid.")]
	InvalidNetworkUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Network URL uses something other than HTTP(S).
	#[error("Network URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// Contract address cannot be parsed.
	#[error("Contract address is invalid.")]
	InvalidContractAddress {
		/// Underlying parsing failure.
		#[source]
		source: AddressError,
	},
	/// A duration setting must be positive.
	#[error("The {field} setting must be positive.")]
	NonPositiveDuration {
		/// Offending setting.
		field: &'static str,
	},
	/// Polling slower than the timeout would never observe a receipt.
	#[error("The poll interval must not exceed the confirmation timeout.")]
	PollIntervalExceedsTimeout,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures resolving the signing context.
#[derive(Debug, ThisError)]
pub enum SignerError {
	/// No compatible wallet or unlocked account is available.
	#[error("No signing account is available: {reason}.")]
	Unavailable {
		/// Why the signer could not be used.
		reason: String,
	},
	/// The user declined the approval prompt.
	#[error("The user cancelled the approval request.")]
	Cancelled,
}

/// Transport-level failures (network, HTTP, JSON-RPC envelope).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the ledger node.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The node answered with a non-success HTTP status.
	#[error("Ledger node answered with HTTP status {status}.")]
	HttpStatus {
		/// HTTP status code.
		status: u16,
	},
	/// The node answered with a JSON-RPC error object.
	#[error("Ledger node returned JSON-RPC error {code}: {message}.")]
	Rpc {
		/// JSON-RPC error code.
		code: i64,
		/// JSON-RPC error message.
		message: String,
	},
	/// Response body is not a JSON-RPC envelope.
	#[error("Ledger node returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Envelope parsed but the result has the wrong shape.
	#[error("Unexpected result for {method}: {reason}.")]
	UnexpectedResult {
		/// JSON-RPC method that produced the result.
		method: &'static str,
		/// What was wrong with it.
		reason: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds an [`TransportError::UnexpectedResult`].
	pub fn unexpected(method: &'static str, reason: impl Into<String>) -> Self {
		Self::UnexpectedResult { method, reason: reason.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
