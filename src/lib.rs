//! Identity-keyed reward dispenser: grant at most one cupcake per cooldown window per identity,
//! backed either by an in-process ledger or by a verify-after-write Ethereum contract client,
//! behind one async contract.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod clock;
pub mod dispenser;
pub mod error;
pub mod grant;
pub mod local;
pub mod obs;
pub mod remote;
pub mod rpc;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		error::TransportError,
		remote::{Address, RemoteConfig, RemoteEndpoint, RemoteLedgerClient, StaticSigner},
		rpc::{LedgerTransport, RpcFuture},
	};

	/// Test account used as the signing context.
	pub const TEST_SIGNER: &str = "0x00000000000000000000000000000000000000aa";
	/// Test contract address.
	pub const TEST_CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
	/// Test recipient address.
	pub const TEST_RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

	/// One recorded JSON-RPC invocation.
	#[derive(Clone, Debug)]
	pub struct RecordedCall {
		/// JSON-RPC method name.
		pub method: &'static str,
		/// Positional parameters.
		pub params: serde_json::Value,
	}

	/// Transport that replays scripted replies per method and records every call.
	///
	/// Methods without a scripted reply resolve to JSON `null`.
	#[derive(Clone, Default)]
	pub struct ScriptedTransport {
		replies: Arc<Mutex<HashMap<&'static str, VecDeque<Result<serde_json::Value, i64>>>>>,
		calls: Arc<Mutex<Vec<RecordedCall>>>,
	}
	impl ScriptedTransport {
		/// Queues a successful result for `method`.
		pub fn reply(&self, method: &'static str, value: serde_json::Value) -> &Self {
			self.replies.lock().entry(method).or_default().push_back(Ok(value));

			self
		}

		/// Queues a JSON-RPC error with `code` for `method`.
		pub fn fail(&self, method: &'static str, code: i64) -> &Self {
			self.replies.lock().entry(method).or_default().push_back(Err(code));

			self
		}

		/// Queues two balance reads returning `before` then `after`.
		pub fn balances(&self, before: u64, after: u64) -> &Self {
			self.reply("eth_call", serde_json::Value::String(word(before)))
				.reply("eth_call", serde_json::Value::String(word(after)))
		}

		/// Returns every call observed so far.
		pub fn calls(&self) -> Vec<RecordedCall> {
			self.calls.lock().clone()
		}

		/// Returns the method names observed so far, in order.
		pub fn methods(&self) -> Vec<&'static str> {
			self.calls.lock().iter().map(|call| call.method).collect()
		}
	}
	impl LedgerTransport for ScriptedTransport {
		fn call(&self, method: &'static str, params: serde_json::Value) -> RpcFuture<'_> {
			self.calls.lock().push(RecordedCall { method, params });

			let next = self.replies.lock().get_mut(method).and_then(VecDeque::pop_front);

			Box::pin(async move {
				match next {
					Some(Ok(value)) => Ok(value),
					Some(Err(code)) =>
						Err(TransportError::Rpc { code, message: format!("scripted error {code}") }),
					None => Ok(serde_json::Value::Null),
				}
			})
		}
	}

	/// Encodes `value` as a 32-byte ABI word in `0x` hex form.
	pub fn word(value: u64) -> String {
		format!("0x{value:064x}")
	}

	/// Builds a remote client over `transport` that signs as [`TEST_SIGNER`] and polls quickly.
	pub fn scripted_remote_client(transport: ScriptedTransport) -> RemoteLedgerClient {
		let endpoint = RemoteEndpoint::new(
			Url::parse("http://127.0.0.1:8545").expect("Test network URL should parse."),
			TEST_CONTRACT.parse::<Address>().expect("Test contract address should parse."),
		);
		let config = RemoteConfig::builder(endpoint)
			.poll_interval(Duration::milliseconds(5))
			.confirmation_timeout(Duration::milliseconds(200))
			.build()
			.expect("Test remote config should be valid.");
		let signer = StaticSigner::new(
			TEST_SIGNER.parse::<Address>().expect("Test signer address should parse."),
		);

		RemoteLedgerClient::with_transport(config, Arc::new(transport), Arc::new(signer))
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
