//! Contract handle bound to a node, a vending machine address, and optionally a signer.

// crates.io
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	error::{SignerError, TransportError},
	grant::Balance,
	remote::{
		Address,
		abi::{self, GET_CUPCAKE_BALANCE_FOR, GIVE_CUPCAKE_TO},
		signer::{self, SigningContext},
	},
	rpc::LedgerTransport,
};

/// Hash of a submitted transaction, as returned by the node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);
impl TxHash {
	/// Borrows the `0x`-prefixed hash.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for TxHash {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Mined transaction receipt, reduced to what the dispenser checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
	/// Receipt status; `None` for nodes that predate status codes.
	pub status: Option<u64>,
}
impl Receipt {
	/// Whether the transaction executed without reverting.
	///
	/// A missing status counts as success; the balance re-read is the real check.
	pub fn succeeded(&self) -> bool {
		self.status != Some(0)
	}
}

/// Calls into one vending machine contract.
pub struct ContractHandle<'a> {
	transport: &'a dyn LedgerTransport,
	contract: Address,
	from: Option<Address>,
}
impl<'a> ContractHandle<'a> {
	/// Binds a handle that can only read.
	pub fn read_only(transport: &'a dyn LedgerTransport, contract: Address) -> Self {
		Self { transport, contract, from: None }
	}

	/// Binds a handle that sends mutating calls from the signing account.
	pub fn signed(
		transport: &'a dyn LedgerTransport,
		contract: Address,
		context: SigningContext,
	) -> Self {
		Self { transport, contract, from: Some(context.account) }
	}

	/// Reads `getCupcakeBalanceFor(recipient)` at the latest block.
	pub async fn cupcake_balance(&self, recipient: &Address) -> Result<Balance> {
		const METHOD: &str = "eth_call";

		let call = json!({
			"to": self.contract.to_string(),
			"data": abi::encode_address_call(GET_CUPCAKE_BALANCE_FOR, recipient),
		});
		let result = self.transport.call(METHOD, json!([call, "latest"])).await?;

		Ok(abi::decode_balance(METHOD, &result)?)
	}

	/// Submits `giveCupcakeTo(recipient)` and returns the transaction hash.
	pub async fn give_cupcake_to(&self, recipient: &Address) -> Result<TxHash> {
		const METHOD: &str = "eth_sendTransaction";

		let from = self.from.ok_or_else(|| SignerError::Unavailable {
			reason: "contract handle is read-only".into(),
		})?;
		let transaction = json!({
			"from": from.to_string(),
			"to": self.contract.to_string(),
			"data": abi::encode_address_call(GIVE_CUPCAKE_TO, recipient),
		});
		let result =
			self.transport.call(METHOD, json!([transaction])).await.map_err(map_submit_error)?;

		match result {
			Value::String(hash) if hash.starts_with("0x") => Ok(TxHash(hash)),
			other => Err(TransportError::unexpected(
				METHOD,
				format!("expected a transaction hash, got {other}"),
			)
			.into()),
		}
	}

	/// Fetches the receipt for `tx`, or `None` while it is still pending.
	pub async fn receipt(&self, tx: &TxHash) -> Result<Option<Receipt>> {
		const METHOD: &str = "eth_getTransactionReceipt";

		let result = self.transport.call(METHOD, json!([tx.as_str()])).await?;

		match result {
			Value::Null => Ok(None),
			Value::Object(fields) => {
				let status = match fields.get("status") {
					None | Some(Value::Null) => None,
					Some(status) => Some(abi::decode_quantity(METHOD, status)?),
				};

				Ok(Some(Receipt { status }))
			},
			other => Err(TransportError::unexpected(
				METHOD,
				format!("expected a receipt object, got {other}"),
			)
			.into()),
		}
	}
}
impl Debug for ContractHandle<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ContractHandle")
			.field("contract", &self.contract)
			.field("from", &self.from)
			.finish()
	}
}

fn map_submit_error(err: TransportError) -> Error {
	match err {
		TransportError::Rpc { code: signer::USER_REJECTED | signer::UNAUTHORIZED, .. } =>
			signer::map_signer_rpc_error(err),
		TransportError::Rpc { message, .. } => Error::Rejected { reason: message },
		other => other.into(),
	}
}
