//! Signing-context resolution for mutating ledger calls.
//!
//! Resolving a signer may park on an out-of-band approval prompt for as long as the user takes.
//! Callers bound that wait through
//! [`RemoteConfig::approval_timeout`](crate::remote::RemoteConfig::approval_timeout) or by
//! dropping the future; a user who closes the prompt surfaces as [`SignerError::Cancelled`].

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::{SignerError, TransportError},
	remote::Address,
	rpc::LedgerTransport,
};

/// Boxed future returned by [`SigningProvider::resolve`].
pub type SignerFuture<'a> = Pin<Box<dyn Future<Output = Result<SigningContext>> + 'a + Send>>;

/// JSON-RPC code for "the user rejected the request".
pub const USER_REJECTED: i64 = 4001;
/// JSON-RPC code for "the requested account has not been authorized".
pub const UNAUTHORIZED: i64 = 4100;
const METHOD_NOT_FOUND: i64 = -32601;

/// Authorization used to submit a mutating call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SigningContext {
	/// Account the node signs and sends transactions from.
	pub account: Address,
}

/// Produces the signing context for the active user.
pub trait SigningProvider
where
	Self: Send + Sync,
{
	/// Resolves the account to send from, possibly after user approval.
	fn resolve(&self) -> SignerFuture<'_>;
}

/// Signer that always sends from one preconfigured account.
#[derive(Clone, Copy, Debug)]
pub struct StaticSigner(Address);
impl StaticSigner {
	/// Uses `account` for every call.
	pub fn new(account: Address) -> Self {
		Self(account)
	}
}
impl SigningProvider for StaticSigner {
	fn resolve(&self) -> SignerFuture<'_> {
		let account = self.0;

		Box::pin(async move { Ok(SigningContext { account }) })
	}
}

/// Signer that asks the node (or the wallet fronting it) for an authorized account.
///
/// Calls `eth_requestAccounts`, which may prompt the user, and falls back to `eth_accounts` when
/// the node does not implement the request method. The first returned account is used.
pub struct NodeAccountSigner {
	transport: Arc<dyn LedgerTransport>,
}
impl NodeAccountSigner {
	/// Resolves accounts through `transport`.
	pub fn new(transport: Arc<dyn LedgerTransport>) -> Self {
		Self { transport }
	}

	async fn request_accounts(&self) -> Result<Value, TransportError> {
		match self.transport.call("eth_requestAccounts", Value::Array(Vec::new())).await {
			Err(TransportError::Rpc { code: METHOD_NOT_FOUND, .. }) =>
				self.transport.call("eth_accounts", Value::Array(Vec::new())).await,
			other => other,
		}
	}
}
impl Debug for NodeAccountSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("NodeAccountSigner(..)")
	}
}
impl SigningProvider for NodeAccountSigner {
	fn resolve(&self) -> SignerFuture<'_> {
		Box::pin(async move {
			let accounts = self.request_accounts().await.map_err(map_signer_rpc_error)?;
			let first = accounts
				.as_array()
				.and_then(|accounts| accounts.first())
				.ok_or_else(|| SignerError::Unavailable { reason: "no accounts exposed".into() })?;
			let account =
				first.as_str().and_then(|raw| raw.parse::<Address>().ok()).ok_or_else(|| {
					TransportError::unexpected("eth_requestAccounts", "account is not an address")
				})?;

			Ok(SigningContext { account })
		})
	}
}

/// Maps wallet-style JSON-RPC errors onto [`SignerError`]s.
pub(crate) fn map_signer_rpc_error(err: TransportError) -> Error {
	match err {
		TransportError::Rpc { code: USER_REJECTED, .. } => SignerError::Cancelled.into(),
		TransportError::Rpc { code: UNAUTHORIZED, message } =>
			SignerError::Unavailable { reason: message }.into(),
		TransportError::Rpc { code: METHOD_NOT_FOUND, message } =>
			SignerError::Unavailable { reason: message }.into(),
		other => other.into(),
	}
}
