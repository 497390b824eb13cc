//! Uniform dispenser contract and the client handle that selects a backend once.
//!
//! Both ledgers implement [`Dispenser`]. Orchestrators hold a [`DispenserClient`], which is bound
//! to exactly one backend at construction: the selection cannot change for the lifetime of the
//! handle, and switching backends means building a new client. Identity strings are validated at
//! this boundary and every failure comes back as a value ([`GrantResult::Failed`] or `Err`).

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	grant::{BackendKind, Balance, GrantResult, Identity},
	local::LocalLedger,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	remote::RemoteEndpoint,
};
#[cfg(feature = "reqwest")] use crate::remote::{RemoteConfig, RemoteLedgerClient};

/// Boxed future returned by [`Dispenser`] operations.
pub type DispenserFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Capability set shared by every ledger backend.
pub trait Dispenser
where
	Self: Send + Sync,
{
	/// Attempts to grant one cupcake to `identity`.
	///
	/// Repeated calls inside a cooldown must report [`GrantResult::DeniedCooldown`] or a failure
	/// without corrupting state.
	fn dispense<'a>(&'a self, identity: &'a Identity) -> DispenserFuture<'a, GrantResult>;

	/// Reads the balance of `identity`; unknown identities hold zero.
	fn balance_of<'a>(&'a self, identity: &'a Identity) -> DispenserFuture<'a, Result<Balance>>;

	/// Suggests an identity to use when the caller left it empty.
	fn default_identity(&self) -> DispenserFuture<'_, Result<Option<Identity>>>;

	/// Field label describing what an identity is for this backend.
	fn identity_label(&self) -> &'static str;

	/// Which ledger this backend talks to.
	fn backend_kind(&self) -> BackendKind;
}

/// Backend selection resolved once per [`DispenserClient`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointDescriptor {
	/// In-process ledger.
	Local,
	/// Contract reachable over JSON-RPC.
	Remote(RemoteEndpoint),
}
impl EndpointDescriptor {
	/// Builds a descriptor from a backend selector and an optional compact endpoint string.
	///
	/// Remote backends require `<contract-address>@<network-url>`; local backends reject any
	/// endpoint.
	pub fn resolve(kind: BackendKind, endpoint: Option<&str>) -> Result<Self, ConfigError> {
		let endpoint = endpoint.map(str::trim).filter(|value| !value.is_empty());

		match (kind, endpoint) {
			(BackendKind::Local, None) => Ok(Self::Local),
			(BackendKind::Local, Some(_)) => Err(ConfigError::UnexpectedEndpoint { kind }),
			(BackendKind::Remote, None) => Err(ConfigError::MissingEndpoint { kind }),
			(BackendKind::Remote, Some(value)) => Ok(Self::Remote(value.parse()?)),
		}
	}

	/// Backend this descriptor selects.
	pub fn kind(&self) -> BackendKind {
		match self {
			Self::Local => BackendKind::Local,
			Self::Remote(_) => BackendKind::Remote,
		}
	}
}
impl FromStr for EndpointDescriptor {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"local" => Ok(Self::Local),
			remote => Ok(Self::Remote(remote.parse()?)),
		}
	}
}

/// Handle bound to one backend for its whole lifetime.
#[derive(Clone)]
pub struct DispenserClient {
	backend: Arc<dyn Dispenser>,
	kind: BackendKind,
}
impl DispenserClient {
	/// Creates a client for `descriptor`, provisioning a reqwest transport for remote ledgers.
	#[cfg(feature = "reqwest")]
	pub fn new(descriptor: EndpointDescriptor) -> Result<Self> {
		match descriptor {
			EndpointDescriptor::Local => Ok(Self::local(LocalLedger::new())),
			EndpointDescriptor::Remote(endpoint) => {
				let config = RemoteConfig::builder(endpoint).build()?;

				Ok(Self::with_backend(Arc::new(RemoteLedgerClient::new(config)?)))
			},
		}
	}

	/// Creates a client from a backend selector and an optional compact endpoint string.
	///
	/// Fails fast with [`ConfigError`] when a remote endpoint is missing or malformed.
	#[cfg(feature = "reqwest")]
	pub fn connect(kind: BackendKind, endpoint: Option<&str>) -> Result<Self> {
		Self::new(EndpointDescriptor::resolve(kind, endpoint)?)
	}

	/// Wraps an existing local ledger.
	pub fn local(ledger: LocalLedger) -> Self {
		Self::with_backend(Arc::new(ledger))
	}

	/// Wraps any backend, e.g. a remote client over a custom transport.
	pub fn with_backend(backend: Arc<dyn Dispenser>) -> Self {
		let kind = backend.backend_kind();

		Self { backend, kind }
	}

	/// Attempts to grant one cupcake to `identity`.
	pub async fn dispense(&self, identity: impl AsRef<str>) -> GrantResult {
		const KIND: OperationKind = OperationKind::Dispense;

		let span = OperationSpan::new(KIND, self.kind);

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				match Identity::new(identity.as_ref()) {
					Ok(identity) => self.backend.dispense(&identity).await,
					Err(err) => GrantResult::Failed(err.into()),
				}
			})
			.await;
		let outcome = match &result {
			GrantResult::Granted => OperationOutcome::Granted,
			GrantResult::DeniedCooldown => OperationOutcome::Denied,
			GrantResult::Failed(_) => OperationOutcome::Failure,
		};

		obs::record_operation_outcome(KIND, outcome);

		result
	}

	/// Reads the balance of `identity`.
	pub async fn balance_of(&self, identity: impl AsRef<str>) -> Result<Balance> {
		const KIND: OperationKind = OperationKind::BalanceOf;

		let span = OperationSpan::new(KIND, self.kind);

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let identity = Identity::new(identity.as_ref())?;

				self.backend.balance_of(&identity).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Returns `identity` when it is non-empty, otherwise the backend's suggested identity.
	pub async fn identity_or_default(&self, identity: &str) -> Result<Option<Identity>> {
		if identity.is_empty() {
			self.backend.default_identity().await
		} else {
			Ok(Some(Identity::new(identity)?))
		}
	}

	/// Suggests an identity to use when the caller has none.
	pub async fn default_identity(&self) -> Result<Option<Identity>> {
		self.backend.default_identity().await
	}

	/// Field label describing what an identity is for this backend.
	pub fn identity_label(&self) -> &'static str {
		self.backend.identity_label()
	}

	/// Which ledger this client is bound to.
	pub fn backend_kind(&self) -> BackendKind {
		self.kind
	}
}
impl Debug for DispenserClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DispenserClient").field("kind", &self.kind).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::FailureKind;

	const REMOTE: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3@http://localhost:8545";

	#[test]
	fn resolve_requires_endpoint_only_for_remote() {
		assert_eq!(
			EndpointDescriptor::resolve(BackendKind::Local, None).ok(),
			Some(EndpointDescriptor::Local)
		);
		assert!(matches!(
			EndpointDescriptor::resolve(BackendKind::Local, Some(REMOTE)),
			Err(ConfigError::UnexpectedEndpoint { kind: BackendKind::Local })
		));
		assert!(matches!(
			EndpointDescriptor::resolve(BackendKind::Remote, Some("  ")),
			Err(ConfigError::MissingEndpoint { kind: BackendKind::Remote })
		));

		let remote = EndpointDescriptor::resolve(BackendKind::Remote, Some(REMOTE))
			.expect("Compact remote endpoint should resolve.");

		assert_eq!(remote.kind(), BackendKind::Remote);
	}

	#[test]
	fn descriptor_deserializes_from_tagged_json() {
		let local: EndpointDescriptor =
			serde_json::from_str("{\"kind\":\"local\"}").expect("Local descriptor should parse.");

		assert_eq!(local, EndpointDescriptor::Local);

		let remote: EndpointDescriptor = serde_json::from_str(
			"{\"kind\":\"remote\",\"network\":\"http://localhost:8545/\",\"contract\":\"0x5fbdb2315678afecb367f032d93f642f64180aa3\"}",
		)
		.expect("Remote descriptor should parse.");

		assert_eq!(
			remote,
			REMOTE.parse::<EndpointDescriptor>().expect("Compact endpoint should parse.")
		);
	}

	#[tokio::test]
	async fn empty_identity_is_a_failed_result_not_a_panic() {
		let client = DispenserClient::local(LocalLedger::new());
		let result = client.dispense("").await;

		assert_eq!(result.error().map(Error::kind), Some(FailureKind::InvalidIdentity));
		assert!(client.balance_of("").await.is_err());
		assert!(
			client
				.identity_or_default("")
				.await
				.expect("Local default lookup should succeed.")
				.is_none()
		);
		assert_eq!(client.identity_label(), "Name");
		assert_eq!(client.backend_kind(), BackendKind::Local);
	}
}
