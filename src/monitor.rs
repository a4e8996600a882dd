//! Transaction monitoring and lifecycle tracking.
//!
//! A submitted write moves through pending (no receipt), confirming (receipt
//! below the configured depth), and a terminal confirmed or failed state.
//! Timing out is not terminal: the transaction may still land, so monitoring
//! reports `StillProcessing` instead of an error.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::rpc::{ReceiptInfo, RpcClient};
use crate::types::TxPhase;
use alloy_primitives::B256;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Transaction monitor polling the node for receipts
#[derive(Debug, Clone)]
pub struct TransactionMonitor {
    /// Node client
    rpc: RpcClient,
    /// Configuration
    config: Arc<ClientConfig>,
}

/// Monitoring options
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Poll interval (in milliseconds)
    pub poll_interval_ms: u64,
    /// Timeout (in seconds)
    pub timeout_secs: u64,
    /// Confirmations required for a terminal confirmed state
    pub confirmations: u64,
}

impl MonitorOptions {
    /// Create from client config
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            poll_interval_ms: config.tx_poll_interval_ms,
            timeout_secs: config.tx_timeout_secs,
            confirmations: config.confirmations,
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set custom confirmation depth
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }
}

/// Terminal outcome of monitoring a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Confirmed at the required depth
    Confirmed(ReceiptInfo),
    /// Execution failed with a human-readable reason
    Failed(String),
    /// Monitoring timed out; the transaction may still land
    StillProcessing,
}

impl TransactionMonitor {
    /// Create a new monitor
    pub fn new(rpc: RpcClient, config: Arc<ClientConfig>) -> Self {
        Self { rpc, config }
    }

    /// Monitor a transaction until a terminal outcome or timeout
    pub async fn monitor(&self, hash: B256, options: MonitorOptions) -> Result<MonitorOutcome> {
        info!(
            "monitoring transaction {} (timeout: {}s, confirmations: {})",
            hash, options.timeout_secs, options.confirmations
        );

        let start = Instant::now();
        let timeout = Duration::from_secs(options.timeout_secs);
        let poll_interval = Duration::from_millis(options.poll_interval_ms);

        loop {
            if start.elapsed() >= timeout {
                warn!("monitoring timed out for {}, transaction may still land", hash);
                return Ok(MonitorOutcome::StillProcessing);
            }

            match self.phase_with(hash, options.confirmations).await {
                Ok(TxPhase::Confirmed) => {
                    info!("transaction confirmed: {}", hash);
                    // Receipt must exist for the phase to be Confirmed
                    if let Some(receipt) = self.rpc.transaction_receipt(hash).await? {
                        return Ok(MonitorOutcome::Confirmed(receipt));
                    }
                }
                Ok(TxPhase::Failed(reason)) => {
                    warn!("transaction failed: {} ({})", hash, reason);
                    return Ok(MonitorOutcome::Failed(reason));
                }
                Ok(TxPhase::Pending) => {
                    debug!("transaction still pending: {}", hash);
                }
                Ok(TxPhase::Confirming { confirmations }) => {
                    debug!(
                        "transaction confirming: {} ({}/{})",
                        hash, confirmations, options.confirmations
                    );
                }
                Err(e) => {
                    // Transient fetch errors keep the poll loop alive
                    debug!("error fetching transaction state: {:?}", e);
                }
            }

            sleep(poll_interval).await;
        }
    }

    /// Single status check (no polling)
    pub async fn phase(&self, hash: B256) -> Result<TxPhase> {
        self.phase_with(hash, self.config.confirmations).await
    }

    async fn phase_with(&self, hash: B256, required: u64) -> Result<TxPhase> {
        let receipt = match self.rpc.transaction_receipt(hash).await? {
            Some(receipt) => receipt,
            None => return Ok(TxPhase::Pending),
        };

        if !receipt.succeeded {
            return Ok(TxPhase::Failed("transaction reverted".to_string()));
        }

        let head = self.rpc.block_number().await?;
        let confirmations = head.saturating_sub(receipt.block_number) + 1;
        if confirmations >= required {
            Ok(TxPhase::Confirmed)
        } else {
            Ok(TxPhase::Confirming { confirmations })
        }
    }

    /// Wait for confirmation with defaults from the config.
    ///
    /// Returns true only on a confirmed outcome.
    pub async fn wait_for_confirmation(&self, hash: B256) -> Result<bool> {
        let options = MonitorOptions::from_config(&self.config);
        let outcome = self.monitor(hash, options).await?;
        Ok(matches!(outcome, MonitorOutcome::Confirmed(_)))
    }
}

/// Handle to one submitted write.
///
/// Owned by the flow that created it; dropping the handle does not cancel
/// the transaction (on-chain submission is not revocable).
#[derive(Debug, Clone)]
pub struct TransactionHandle {
    hash: B256,
    monitor: TransactionMonitor,
    options: MonitorOptions,
}

impl TransactionHandle {
    pub(crate) fn new(hash: B256, monitor: TransactionMonitor, options: MonitorOptions) -> Self {
        Self {
            hash,
            monitor,
            options,
        }
    }

    /// Transaction hash
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Current lifecycle phase (single check)
    pub async fn phase(&self) -> Result<TxPhase> {
        self.monitor.phase(self.hash).await
    }

    /// Drive the transaction to a terminal outcome
    pub async fn wait(&self) -> Result<MonitorOutcome> {
        self.monitor.monitor(self.hash, self.options.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Arc<ClientConfig> {
        Arc::new(
            ClientConfig::testnet()
                .with_request_timeout(Duration::from_secs(10))
                .with_max_retries(1),
        )
    }

    #[test]
    fn test_monitor_creation() {
        let config = create_test_config();
        let rpc = RpcClient::new(config.clone()).unwrap();
        let _monitor = TransactionMonitor::new(rpc, config);
    }

    #[test]
    fn test_monitor_options_from_config() {
        let config = ClientConfig::testnet();
        let options = MonitorOptions::from_config(&config);
        assert_eq!(options.poll_interval_ms, config.tx_poll_interval_ms);
        assert_eq!(options.timeout_secs, config.tx_timeout_secs);
        assert_eq!(options.confirmations, config.confirmations);
    }

    #[test]
    fn test_monitor_options_builder() {
        let options = MonitorOptions::from_config(&ClientConfig::testnet())
            .with_poll_interval(500)
            .with_timeout(120)
            .with_confirmations(6);

        assert_eq!(options.poll_interval_ms, 500);
        assert_eq!(options.timeout_secs, 120);
        assert_eq!(options.confirmations, 6);
    }

    // Receipt-driven phase transitions are covered by the wiremock
    // integration tests in tests/
}
