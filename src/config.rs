//! Client configuration for the chain node endpoint and polling behavior.
//!
//! The Sacco contract itself is addressed by [`crate::contract::ContractDescriptor`];
//! this module only configures how the node is reached and how patiently
//! transactions and events are polled.

use crate::error::{Result, SaccoError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network the Sacco deployment lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    /// Citrea testnet, where the cooperative contract is deployed
    Testnet,
    /// Custom network with a user-defined endpoint
    Custom,
}

impl Network {
    /// Get the default JSON-RPC URL for this network
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://rpc.testnet.citrea.xyz",
            Network::Custom => "",
        }
    }

    /// Get the default chain id for this network
    pub fn default_chain_id(&self) -> u64 {
        match self {
            Network::Testnet => 5115,
            Network::Custom => 0,
        }
    }

    /// Get the block explorer base URL for this network
    pub fn explorer_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://explorer.testnet.citrea.xyz",
            Network::Custom => "",
        }
    }
}

/// Configuration for the Sacco client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Network to connect to
    pub network: Network,

    /// JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Chain id used when building transactions
    pub chain_id: u64,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Maximum number of retries for failed requests
    pub max_retries: usize,

    /// Initial retry delay (in milliseconds)
    pub retry_initial_delay_ms: u64,

    /// Maximum retry delay (in milliseconds)
    pub retry_max_delay_ms: u64,

    /// Retry backoff multiplier
    pub retry_multiplier: f64,

    /// Transaction receipt polling interval (in milliseconds)
    pub tx_poll_interval_ms: u64,

    /// Transaction monitoring timeout (in seconds)
    pub tx_timeout_secs: u64,

    /// Receipt confirmations required before a transaction counts as confirmed
    pub confirmations: u64,

    /// Event log polling interval (in milliseconds)
    pub event_poll_interval_ms: u64,
}

impl ClientConfig {
    /// Create a new configuration for the specified network
    pub fn new(network: Network) -> Self {
        Self {
            network,
            rpc_url: network.default_rpc_url().to_string(),
            chain_id: network.default_chain_id(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_initial_delay_ms: 100,
            retry_max_delay_ms: 5000,
            retry_multiplier: 2.0,
            tx_poll_interval_ms: 1000,
            tx_timeout_secs: 60,
            confirmations: 1,
            event_poll_interval_ms: 2000,
        }
    }

    /// Create configuration for the Citrea testnet deployment
    pub fn testnet() -> Self {
        Self::new(Network::Testnet)
    }

    /// Create a custom configuration
    pub fn custom(rpc_url: String, chain_id: u64) -> Result<Self> {
        if rpc_url.is_empty() {
            return Err(SaccoError::Config("RPC URL cannot be empty".to_string()));
        }

        let mut config = Self::new(Network::Custom);
        config.rpc_url = rpc_url;
        config.chain_id = chain_id;
        Ok(config)
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set maximum retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set retry delays
    pub fn with_retry_config(
        mut self,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
    ) -> Self {
        self.retry_initial_delay_ms = initial_delay_ms;
        self.retry_max_delay_ms = max_delay_ms;
        self.retry_multiplier = multiplier;
        self
    }

    /// Set transaction polling configuration
    pub fn with_tx_config(mut self, poll_interval_ms: u64, timeout_secs: u64) -> Self {
        self.tx_poll_interval_ms = poll_interval_ms;
        self.tx_timeout_secs = timeout_secs;
        self
    }

    /// Set the required confirmation count
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Set the event log polling interval
    pub fn with_event_poll_interval(mut self, interval_ms: u64) -> Self {
        self.event_poll_interval_ms = interval_ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(SaccoError::Config("RPC URL cannot be empty".to_string()));
        }
        url::Url::parse(&self.rpc_url)
            .map_err(|e| SaccoError::Config(format!("invalid RPC URL: {}", e)))?;
        if self.chain_id == 0 {
            return Err(SaccoError::Config(
                "chain id must be greater than 0".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(SaccoError::Config(
                "max retries must be greater than 0".to_string(),
            ));
        }
        if self.retry_initial_delay_ms == 0 {
            return Err(SaccoError::Config(
                "retry initial delay must be greater than 0".to_string(),
            ));
        }
        if self.retry_multiplier <= 1.0 {
            return Err(SaccoError::Config(
                "retry multiplier must be greater than 1.0".to_string(),
            ));
        }
        if self.tx_poll_interval_ms == 0 {
            return Err(SaccoError::Config(
                "transaction poll interval must be greater than 0".to_string(),
            ));
        }
        if self.tx_timeout_secs == 0 {
            return Err(SaccoError::Config(
                "transaction timeout must be greater than 0".to_string(),
            ));
        }
        if self.confirmations == 0 {
            return Err(SaccoError::Config(
                "confirmations must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_defaults() {
        assert_eq!(
            Network::Testnet.default_rpc_url(),
            "https://rpc.testnet.citrea.xyz"
        );
        assert_eq!(Network::Testnet.default_chain_id(), 5115);
        assert!(Network::Testnet.explorer_url().contains("explorer"));
    }

    #[test]
    fn test_testnet_config() {
        let config = ClientConfig::testnet();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.chain_id, 5115);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = ClientConfig::custom("https://rpc.example.com".to_string(), 1234).unwrap();
        assert_eq!(config.network, Network::Custom);
        assert_eq!(config.rpc_url, "https://rpc.example.com");
        assert_eq!(config.chain_id, 1234);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config_empty_url() {
        assert!(ClientConfig::custom("".to_string(), 1234).is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::testnet()
            .with_request_timeout(Duration::from_secs(60))
            .with_max_retries(5)
            .with_retry_config(200, 10000, 2.5)
            .with_tx_config(2000, 120)
            .with_confirmations(3)
            .with_event_poll_interval(500);

        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_initial_delay_ms, 200);
        assert_eq!(config.retry_max_delay_ms, 10000);
        assert_eq!(config.retry_multiplier, 2.5);
        assert_eq!(config.tx_poll_interval_ms, 2000);
        assert_eq!(config.tx_timeout_secs, 120);
        assert_eq!(config.confirmations, 3);
        assert_eq!(config.event_poll_interval_ms, 500);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::testnet();
        assert!(config.validate().is_ok());

        config.max_retries = 0;
        assert!(config.validate().is_err());

        config.max_retries = 3;
        config.retry_multiplier = 0.5;
        assert!(config.validate().is_err());

        config.retry_multiplier = 2.0;
        config.rpc_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.network, Network::Testnet);
        assert!(config.validate().is_ok());
    }
}
