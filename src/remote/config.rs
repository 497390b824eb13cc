//! Remote ledger endpoint and timing configuration.

// self
use crate::{_prelude::*, error::ConfigError, remote::Address};

/// Node URL plus the contract the dispenser talks to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoint {
	/// JSON-RPC node URL (`http` or `https`).
	pub network: Url,
	/// Vending machine contract address.
	pub contract: Address,
}
impl RemoteEndpoint {
	/// Pairs a node URL with a contract address.
	pub fn new(network: Url, contract: Address) -> Self {
		Self { network, contract }
	}

	fn validate(&self) -> Result<(), ConfigError> {
		match self.network.scheme() {
			"http" | "https" => Ok(()),
			_ => Err(ConfigError::UnsupportedScheme { url: self.network.to_string() }),
		}
	}
}
impl FromStr for RemoteEndpoint {
	type Err = ConfigError;

	/// Parses `<contract-address>@<network-url>`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (contract, network) = s
			.split_once('@')
			.ok_or_else(|| ConfigError::MalformedEndpoint { value: s.to_owned() })?;
		let contract = contract
			.trim()
			.parse::<Address>()
			.map_err(|source| ConfigError::InvalidContractAddress { source })?;
		let network =
			Url::parse(network.trim()).map_err(|source| ConfigError::InvalidNetworkUrl { source })?;
		let endpoint = Self::new(network, contract);

		endpoint.validate()?;

		Ok(endpoint)
	}
}
impl Display for RemoteEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}@{}", self.contract, self.network)
	}
}

/// Validated settings for a [`RemoteLedgerClient`](crate::remote::RemoteLedgerClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
	/// Node and contract to talk to.
	pub endpoint: RemoteEndpoint,
	/// Upper bound on waiting for the user to approve account access; `None` waits until the
	/// signer answers or the caller drops the future.
	pub approval_timeout: Option<Duration>,
	/// Upper bound on waiting for a submitted transaction to be mined.
	pub confirmation_timeout: Duration,
	/// Delay between receipt polls.
	pub poll_interval: Duration,
}
impl RemoteConfig {
	/// Default bound on confirmation waits.
	pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::seconds(120);
	/// Default delay between receipt polls.
	pub const DEFAULT_POLL_INTERVAL: Duration = Duration::seconds(1);

	/// Creates a builder seeded with defaults for `endpoint`.
	pub fn builder(endpoint: RemoteEndpoint) -> RemoteConfigBuilder {
		RemoteConfigBuilder::new(endpoint)
	}
}

/// Builder for [`RemoteConfig`] values.
#[derive(Debug)]
pub struct RemoteConfigBuilder {
	endpoint: RemoteEndpoint,
	approval_timeout: Option<Duration>,
	confirmation_timeout: Duration,
	poll_interval: Duration,
}
impl RemoteConfigBuilder {
	/// Creates a builder seeded with defaults for `endpoint`.
	pub fn new(endpoint: RemoteEndpoint) -> Self {
		Self {
			endpoint,
			approval_timeout: None,
			confirmation_timeout: RemoteConfig::DEFAULT_CONFIRMATION_TIMEOUT,
			poll_interval: RemoteConfig::DEFAULT_POLL_INTERVAL,
		}
	}

	/// Bounds the wait for signer approval.
	pub fn approval_timeout(mut self, timeout: Duration) -> Self {
		self.approval_timeout = Some(timeout);

		self
	}

	/// Bounds the wait for transaction confirmation.
	pub fn confirmation_timeout(mut self, timeout: Duration) -> Self {
		self.confirmation_timeout = timeout;

		self
	}

	/// Overrides the receipt polling interval.
	pub fn poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<RemoteConfig, ConfigError> {
		self.endpoint.validate()?;

		if matches!(self.approval_timeout, Some(timeout) if !timeout.is_positive()) {
			return Err(ConfigError::NonPositiveDuration { field: "approval_timeout" });
		}
		if !self.confirmation_timeout.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "confirmation_timeout" });
		}
		if !self.poll_interval.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "poll_interval" });
		}
		if self.poll_interval > self.confirmation_timeout {
			return Err(ConfigError::PollIntervalExceedsTimeout);
		}

		Ok(RemoteConfig {
			endpoint: self.endpoint,
			approval_timeout: self.approval_timeout,
			confirmation_timeout: self.confirmation_timeout,
			poll_interval: self.poll_interval,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

	fn endpoint() -> RemoteEndpoint {
		format!("{CONTRACT}@http://localhost:8545").parse().expect("Endpoint fixture should parse.")
	}

	#[test]
	fn compact_endpoint_round_trips_through_display() {
		let endpoint = endpoint();

		assert_eq!(endpoint.network.as_str(), "http://localhost:8545/");
		assert_eq!(endpoint.contract.to_string(), CONTRACT);
		assert_eq!(endpoint.to_string(), format!("{CONTRACT}@http://localhost:8545/"));
	}

	#[test]
	fn compact_endpoint_rejects_bad_parts() {
		assert!(matches!(
			"http://localhost:8545".parse::<RemoteEndpoint>(),
			Err(ConfigError::MalformedEndpoint { .. })
		));
		assert!(matches!(
			"0x12@http://localhost:8545".parse::<RemoteEndpoint>(),
			Err(ConfigError::InvalidContractAddress { .. })
		));
		assert!(matches!(
			format!("{CONTRACT}@not a url").parse::<RemoteEndpoint>(),
			Err(ConfigError::InvalidNetworkUrl { .. })
		));
		assert!(matches!(
			format!("{CONTRACT}@ws://localhost:8546").parse::<RemoteEndpoint>(),
			Err(ConfigError::UnsupportedScheme { .. })
		));
	}

	#[test]
	fn builder_applies_defaults_and_validates_durations() {
		let config = RemoteConfig::builder(endpoint()).build().expect("Defaults should be valid.");

		assert_eq!(config.approval_timeout, None);
		assert_eq!(config.confirmation_timeout, RemoteConfig::DEFAULT_CONFIRMATION_TIMEOUT);
		assert_eq!(config.poll_interval, RemoteConfig::DEFAULT_POLL_INTERVAL);
		assert!(matches!(
			RemoteConfig::builder(endpoint()).approval_timeout(Duration::ZERO).build(),
			Err(ConfigError::NonPositiveDuration { field: "approval_timeout" })
		));
		assert!(matches!(
			RemoteConfig::builder(endpoint()).poll_interval(Duration::seconds(-1)).build(),
			Err(ConfigError::NonPositiveDuration { field: "poll_interval" })
		));
		assert!(matches!(
			RemoteConfig::builder(endpoint())
				.confirmation_timeout(Duration::milliseconds(500))
				.poll_interval(Duration::seconds(1))
				.build(),
			Err(ConfigError::PollIntervalExceedsTimeout)
		));
	}
}
