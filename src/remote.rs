//! Verify-after-write client for the cupcake vending machine contract.
//!
//! A remote dispense runs, in order: parse the identity as an address, resolve the signing
//! context, read the balance, submit `giveCupcakeTo`, wait for the receipt, read the balance
//! again. The dispense counts as granted only when the second read is exactly one above the
//! first. Cooldown enforcement belongs to the contract; a refusal surfaces as
//! [`Error::Rejected`] or as a balance that did not move.
//!
//! Reads and waits run on the tokio timer, so the futures must be polled inside a tokio runtime.

pub mod abi;
pub mod address;
pub mod config;
pub mod contract;
pub mod signer;

pub use address::*;
pub use config::*;
pub use contract::{ContractHandle, Receipt, TxHash};
pub use signer::{NodeAccountSigner, SigningContext, SigningProvider, StaticSigner};

// self
use crate::{
	_prelude::*,
	dispenser::{Dispenser, DispenserFuture},
	error::WaitStage,
	grant::{BackendKind, Balance, GrantResult, Identity},
	rpc::LedgerTransport,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, rpc::ReqwestTransport};

type GuardMap = Mutex<HashMap<Address, Arc<AsyncMutex<()>>>>;

/// Dispenser backed by the vending machine contract on a JSON-RPC node.
pub struct RemoteLedgerClient {
	config: RemoteConfig,
	transport: Arc<dyn LedgerTransport>,
	signer: Arc<dyn SigningProvider>,
	dispense_guards: GuardMap,
}
impl RemoteLedgerClient {
	/// Field label shown next to the identity input.
	pub const IDENTITY_LABEL: &'static str = "Address";

	/// Connects to `config.endpoint` over reqwest and signs with the node's first account.
	#[cfg(feature = "reqwest")]
	pub fn new(config: RemoteConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;
		let transport: Arc<dyn LedgerTransport> =
			Arc::new(ReqwestTransport::with_client(client, config.endpoint.network.clone()));
		let signer = Arc::new(NodeAccountSigner::new(transport.clone()));

		Ok(Self::with_transport(config, transport, signer))
	}

	/// Builds a client over caller-supplied transport and signer.
	pub fn with_transport(
		config: RemoteConfig,
		transport: Arc<dyn LedgerTransport>,
		signer: Arc<dyn SigningProvider>,
	) -> Self {
		Self { config, transport, signer, dispense_guards: Default::default() }
	}

	/// Settings this client was built with.
	pub fn config(&self) -> &RemoteConfig {
		&self.config
	}

	/// Grants one cupcake to `identity` and verifies the balance moved by exactly one.
	///
	/// Dispenses to the same address from this client are serialized so the before/after reads
	/// bracket a single submission.
	pub async fn give_cupcake_to(&self, identity: &Identity) -> Result<()> {
		let recipient = identity.parse::<Address>()?;
		let context = self.signing_context().await?;
		let contract =
			ContractHandle::signed(self.transport.as_ref(), self.config.endpoint.contract, context);
		let slot = self.dispense_slot(recipient);
		let _in_flight = slot.lock.lock().await;

		self.verified_grant(&contract, &recipient).await
	}

	/// Reads the contract balance of `identity`; no signer is needed.
	pub async fn cupcake_balance_for(&self, identity: &Identity) -> Result<Balance> {
		let recipient = identity.parse::<Address>()?;

		ContractHandle::read_only(self.transport.as_ref(), self.config.endpoint.contract)
			.cupcake_balance(&recipient)
			.await
	}

	/// Resolves the signing context, bounded by the approval timeout when one is set.
	pub async fn signing_context(&self) -> Result<SigningContext> {
		match self.config.approval_timeout {
			Some(limit) => tokio::time::timeout(limit.unsigned_abs(), self.signer.resolve())
				.await
				.map_err(|_| Error::Timeout { stage: WaitStage::Approval })?,
			None => self.signer.resolve().await,
		}
	}

	async fn verified_grant(&self, contract: &ContractHandle<'_>, recipient: &Address) -> Result<()> {
		let before = contract.cupcake_balance(recipient).await?;
		let tx = contract.give_cupcake_to(recipient).await?;

		#[cfg(feature = "tracing")]
		tracing::debug!(%tx, %recipient, %before, "Submitted giveCupcakeTo.");

		let receipt = tokio::time::timeout(
			self.config.confirmation_timeout.unsigned_abs(),
			self.poll_receipt(contract, &tx),
		)
		.await
		.map_err(|_| Error::Timeout { stage: WaitStage::Confirmation })??;

		if !receipt.succeeded() {
			return Err(Error::Rejected { reason: format!("transaction {tx} reverted") });
		}

		let after = contract.cupcake_balance(recipient).await?;

		if before.gained_one(after) {
			Ok(())
		} else {
			#[cfg(feature = "tracing")]
			tracing::warn!(%tx, %recipient, %before, %after, "Balance did not gain exactly one.");

			Err(Error::VerificationMismatch { before, after })
		}
	}

	async fn poll_receipt(&self, contract: &ContractHandle<'_>, tx: &TxHash) -> Result<Receipt> {
		loop {
			match contract.receipt(tx).await {
				Ok(Some(receipt)) => return Ok(receipt),
				Ok(None) => (),
				// The transaction may still land; only the confirmation timeout ends the wait.
				Err(Error::Transport(err)) => {
					#[cfg(feature = "tracing")]
					tracing::debug!(%tx, error = %err, "Receipt poll failed, still waiting.");
					#[cfg(not(feature = "tracing"))]
					let _ = err;
				},
				Err(err) => return Err(err),
			}

			tokio::time::sleep(self.config.poll_interval.unsigned_abs()).await;
		}
	}

	fn dispense_slot(&self, recipient: Address) -> DispenseSlot<'_> {
		let lock = self
			.dispense_guards
			.lock()
			.entry(recipient)
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone();

		DispenseSlot { guards: &self.dispense_guards, recipient, lock }
	}
}
impl Debug for RemoteLedgerClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RemoteLedgerClient").field("config", &self.config).finish()
	}
}
impl Dispenser for RemoteLedgerClient {
	fn dispense<'a>(&'a self, identity: &'a Identity) -> DispenserFuture<'a, GrantResult> {
		Box::pin(async move {
			match self.give_cupcake_to(identity).await {
				Ok(()) => GrantResult::Granted,
				Err(err) => GrantResult::Failed(err),
			}
		})
	}

	fn balance_of<'a>(&'a self, identity: &'a Identity) -> DispenserFuture<'a, Result<Balance>> {
		Box::pin(self.cupcake_balance_for(identity))
	}

	fn default_identity(&self) -> DispenserFuture<'_, Result<Option<Identity>>> {
		Box::pin(async move {
			let context = self.signing_context().await?;

			Ok(Some(Identity::new(context.account.to_string())?))
		})
	}

	fn identity_label(&self) -> &'static str {
		Self::IDENTITY_LABEL
	}

	fn backend_kind(&self) -> BackendKind {
		BackendKind::Remote
	}
}

/// Claim on one address's dispense lock; drops the map entry once nobody else holds a claim.
struct DispenseSlot<'a> {
	guards: &'a GuardMap,
	recipient: Address,
	lock: Arc<AsyncMutex<()>>,
}
impl Drop for DispenseSlot<'_> {
	fn drop(&mut self) {
		let mut guards = self.guards.lock();

		// The map entry plus this claim.
		if Arc::strong_count(&self.lock) == 2 {
			guards.remove(&self.recipient);
		}
	}
}
