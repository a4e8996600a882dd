//! Error types for the Sacco contract interaction layer.
//!
//! Every failure mode a caller can observe is a variant here. The first four
//! variants are the user-facing taxonomy surfaced by form flows; the rest are
//! transport and configuration failures.

use alloy_primitives::U256;
use thiserror::Error;

/// Main error type for Sacco client operations
#[derive(Error, Debug)]
pub enum SaccoError {
    /// No signing identity is connected; write operations cannot proceed
    #[error("no wallet connected")]
    NotConnected,

    /// Client-side input validation failed; never reaches the network
    #[error("validation error: {0}")]
    Validation(String),

    /// The contract call reverted or the node rejected the transaction
    #[error("remote rejection: {0}")]
    RemoteRejection(String),

    /// Advisory guarantee-capacity check failed before submission
    #[error("guarantee amount {requested} exceeds capacity {capacity}")]
    ExceedsCapacity {
        /// Amount the caller asked to pledge
        requested: U256,
        /// Cached guarantee capacity of the member
        capacity: U256,
    },

    /// Network communication error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON-RPC error object returned by the node
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// Node responded with a non-success HTTP status
    #[error("node error: {0}")]
    Node(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed calldata or return data
    #[error("abi error: {0}")]
    Abi(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Response shape did not match what the node is expected to return
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Receipt for a submitted transaction is not yet visible
    #[error("receipt not found for transaction {0}")]
    ReceiptNotFound(String),

    /// Transaction monitoring gave up after the configured timeout
    #[error("transaction timeout after {0} seconds")]
    TransactionTimeout(u64),

    /// Max retries exceeded
    #[error("max retries ({0}) exceeded")]
    MaxRetriesExceeded(usize),
}

/// Result type alias for Sacco client operations
pub type Result<T> = std::result::Result<T, SaccoError>;

/// Error context accumulated across retry attempts
#[derive(Debug, Clone, Default)]
pub struct RetryContext {
    /// Number of attempts made
    pub attempts: usize,
    /// Last error encountered
    pub last_error: String,
    /// Total time spent retrying (in milliseconds)
    pub total_time_ms: u64,
}

impl RetryContext {
    /// Create a new retry context
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt
    pub fn record_attempt(&mut self, error: &str, duration_ms: u64) {
        self.attempts += 1;
        self.last_error = error.to_string();
        self.total_time_ms += duration_ms;
    }
}
