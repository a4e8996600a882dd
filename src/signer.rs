//! The wallet seam.
//!
//! The crate never holds key material. A [`Signer`] is supplied by the host
//! application (browser wallet bridge, hardware wallet, test double) and
//! turns an unsigned call into a raw signed transaction the node accepts.
//! [`WalletSession`] tracks whether a signer is currently connected.

use crate::error::{Result, SaccoError};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::info;

/// An unsigned contract call, ready for signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Target contract
    pub to: Address,
    /// ABI-encoded calldata, 0x-prefixed hex
    pub data: String,
    /// Native value attached to the call
    pub value: U256,
    /// Chain id the transaction is valid on
    pub chain_id: u64,
}

/// A connected signing identity
#[async_trait]
pub trait Signer: Send + Sync {
    /// The account this signer controls
    fn address(&self) -> Address;

    /// Produce a raw signed transaction for submission via
    /// `eth_sendRawTransaction`
    async fn sign_transaction(&self, request: &TransactionRequest) -> Result<String>;
}

impl std::fmt::Debug for dyn Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .finish()
    }
}

/// Session-scoped wallet connection state, shared across clones
#[derive(Clone, Default)]
pub struct WalletSession {
    signer: Arc<RwLock<Option<Arc<dyn Signer>>>>,
}

impl WalletSession {
    /// Create a session with no wallet connected
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a signer
    pub fn connect(&self, signer: Arc<dyn Signer>) {
        info!("wallet connected: {}", signer.address());
        *self.signer.write().expect("session lock poisoned") = Some(signer);
    }

    /// Drop the current signer
    pub fn disconnect(&self) {
        info!("wallet disconnected");
        *self.signer.write().expect("session lock poisoned") = None;
    }

    /// Whether a signer is connected
    pub fn is_connected(&self) -> bool {
        self.signer
            .read()
            .expect("session lock poisoned")
            .is_some()
    }

    /// Address of the connected wallet, if any
    pub fn address(&self) -> Option<Address> {
        self.signer
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.address())
    }

    /// The connected signer, or `NotConnected`
    pub fn current(&self) -> Result<Arc<dyn Signer>> {
        self.signer
            .read()
            .expect("session lock poisoned")
            .clone()
            .ok_or(SaccoError::NotConnected)
    }
}
