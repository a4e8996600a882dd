//! Contract event catalogue, log decoding and fan-out.
//!
//! [`EventPoller`] tails `eth_getLogs` for the contract and feeds decoded
//! events into an [`EventBus`]. Subscribers react per event kind; the client
//! facade uses this to invalidate cached reads when on-chain state moves.

use crate::abi::{event_topic, AbiReader};
use crate::config::ClientConfig;
use crate::contract::ContractDescriptor;
use crate::error::Result;
use crate::rpc::{LogEntry, RpcClient};
use alloy_primitives::{Address, B256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Every event the contract emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaccoEventKind {
    MemberRegistered,
    SharesPurchased,
    SavingsDeposited,
    SavingsWithdrawn,
    LoanRequested,
    GuaranteeProvided,
    LoanIssued,
    LoanRepaid,
    GuaranteeReleased,
    DividendPaid,
    BoardMemberAdded,
    BoardMemberRemoved,
    CommitteeBidSubmitted,
    CommitteeBidVoted,
    CommitteeBidAccepted,
}

impl SaccoEventKind {
    /// All kinds, for catalogue iteration
    pub const ALL: [SaccoEventKind; 15] = [
        SaccoEventKind::MemberRegistered,
        SaccoEventKind::SharesPurchased,
        SaccoEventKind::SavingsDeposited,
        SaccoEventKind::SavingsWithdrawn,
        SaccoEventKind::LoanRequested,
        SaccoEventKind::GuaranteeProvided,
        SaccoEventKind::LoanIssued,
        SaccoEventKind::LoanRepaid,
        SaccoEventKind::GuaranteeReleased,
        SaccoEventKind::DividendPaid,
        SaccoEventKind::BoardMemberAdded,
        SaccoEventKind::BoardMemberRemoved,
        SaccoEventKind::CommitteeBidSubmitted,
        SaccoEventKind::CommitteeBidVoted,
        SaccoEventKind::CommitteeBidAccepted,
    ];

    /// Event name as declared by the contract
    pub fn name(&self) -> &'static str {
        match self {
            SaccoEventKind::MemberRegistered => "MemberRegistered",
            SaccoEventKind::SharesPurchased => "SharesPurchased",
            SaccoEventKind::SavingsDeposited => "SavingsDeposited",
            SaccoEventKind::SavingsWithdrawn => "SavingsWithdrawn",
            SaccoEventKind::LoanRequested => "LoanRequested",
            SaccoEventKind::GuaranteeProvided => "GuaranteeProvided",
            SaccoEventKind::LoanIssued => "LoanIssued",
            SaccoEventKind::LoanRepaid => "LoanRepaid",
            SaccoEventKind::GuaranteeReleased => "GuaranteeReleased",
            SaccoEventKind::DividendPaid => "DividendPaid",
            SaccoEventKind::BoardMemberAdded => "BoardMemberAdded",
            SaccoEventKind::BoardMemberRemoved => "BoardMemberRemoved",
            SaccoEventKind::CommitteeBidSubmitted => "CommitteeBidSubmitted",
            SaccoEventKind::CommitteeBidVoted => "CommitteeBidVoted",
            SaccoEventKind::CommitteeBidAccepted => "CommitteeBidAccepted",
        }
    }

    /// Canonical event signature. The leading address parameter is indexed;
    /// everything else rides in the data payload.
    pub fn signature(&self) -> &'static str {
        match self {
            SaccoEventKind::MemberRegistered => "MemberRegistered(address,uint256)",
            SaccoEventKind::SharesPurchased => "SharesPurchased(address,uint256,uint256)",
            SaccoEventKind::SavingsDeposited => "SavingsDeposited(address,uint256)",
            SaccoEventKind::SavingsWithdrawn => "SavingsWithdrawn(address,uint256)",
            SaccoEventKind::LoanRequested => "LoanRequested(address,uint256,uint256)",
            SaccoEventKind::GuaranteeProvided => "GuaranteeProvided(address,uint256,uint256)",
            SaccoEventKind::LoanIssued => "LoanIssued(address,uint256,uint256)",
            SaccoEventKind::LoanRepaid => "LoanRepaid(address,uint256,uint256)",
            SaccoEventKind::GuaranteeReleased => "GuaranteeReleased(address,uint256,uint256)",
            SaccoEventKind::DividendPaid => "DividendPaid(address,uint256)",
            SaccoEventKind::BoardMemberAdded => "BoardMemberAdded(address,uint256)",
            SaccoEventKind::BoardMemberRemoved => "BoardMemberRemoved(address)",
            SaccoEventKind::CommitteeBidSubmitted => "CommitteeBidSubmitted(address,uint256,uint256)",
            SaccoEventKind::CommitteeBidVoted => "CommitteeBidVoted(address,uint256,uint256)",
            SaccoEventKind::CommitteeBidAccepted => "CommitteeBidAccepted(address,uint256)",
        }
    }

    /// `topics[0]` value identifying this event in a log
    pub fn topic(&self) -> B256 {
        event_topic(self.signature())
    }

    /// Resolve a kind from a log's first topic
    pub fn from_topic(topic: B256) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.topic() == topic)
    }
}

/// A decoded contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaccoEvent {
    MemberRegistered { member: Address, shares: U256 },
    SharesPurchased { member: Address, shares: U256, amount: U256 },
    SavingsDeposited { member: Address, amount: U256 },
    SavingsWithdrawn { member: Address, amount: U256 },
    LoanRequested { borrower: Address, amount: U256, loan_id: u64 },
    GuaranteeProvided { guarantor: Address, loan_id: u64, amount: U256 },
    LoanIssued { borrower: Address, amount: U256, loan_id: u64 },
    LoanRepaid { borrower: Address, loan_id: u64, amount: U256 },
    GuaranteeReleased { guarantor: Address, loan_id: u64, amount: U256 },
    DividendPaid { member: Address, amount: U256 },
    BoardMemberAdded { member: Address, votes: U256 },
    BoardMemberRemoved { member: Address },
    CommitteeBidSubmitted { bidder: Address, bid_id: u64, amount: U256 },
    CommitteeBidVoted { voter: Address, bid_id: u64, votes: U256 },
    CommitteeBidAccepted { bidder: Address, bid_id: u64 },
}

impl SaccoEvent {
    /// The catalogue kind of this event
    pub fn kind(&self) -> SaccoEventKind {
        match self {
            SaccoEvent::MemberRegistered { .. } => SaccoEventKind::MemberRegistered,
            SaccoEvent::SharesPurchased { .. } => SaccoEventKind::SharesPurchased,
            SaccoEvent::SavingsDeposited { .. } => SaccoEventKind::SavingsDeposited,
            SaccoEvent::SavingsWithdrawn { .. } => SaccoEventKind::SavingsWithdrawn,
            SaccoEvent::LoanRequested { .. } => SaccoEventKind::LoanRequested,
            SaccoEvent::GuaranteeProvided { .. } => SaccoEventKind::GuaranteeProvided,
            SaccoEvent::LoanIssued { .. } => SaccoEventKind::LoanIssued,
            SaccoEvent::LoanRepaid { .. } => SaccoEventKind::LoanRepaid,
            SaccoEvent::GuaranteeReleased { .. } => SaccoEventKind::GuaranteeReleased,
            SaccoEvent::DividendPaid { .. } => SaccoEventKind::DividendPaid,
            SaccoEvent::BoardMemberAdded { .. } => SaccoEventKind::BoardMemberAdded,
            SaccoEvent::BoardMemberRemoved { .. } => SaccoEventKind::BoardMemberRemoved,
            SaccoEvent::CommitteeBidSubmitted { .. } => SaccoEventKind::CommitteeBidSubmitted,
            SaccoEvent::CommitteeBidVoted { .. } => SaccoEventKind::CommitteeBidVoted,
            SaccoEvent::CommitteeBidAccepted { .. } => SaccoEventKind::CommitteeBidAccepted,
        }
    }

    /// The account the event is about
    pub fn subject(&self) -> Address {
        match self {
            SaccoEvent::MemberRegistered { member, .. }
            | SaccoEvent::SharesPurchased { member, .. }
            | SaccoEvent::SavingsDeposited { member, .. }
            | SaccoEvent::SavingsWithdrawn { member, .. }
            | SaccoEvent::DividendPaid { member, .. }
            | SaccoEvent::BoardMemberAdded { member, .. }
            | SaccoEvent::BoardMemberRemoved { member } => *member,
            SaccoEvent::LoanRequested { borrower, .. }
            | SaccoEvent::LoanIssued { borrower, .. }
            | SaccoEvent::LoanRepaid { borrower, .. } => *borrower,
            SaccoEvent::GuaranteeProvided { guarantor, .. }
            | SaccoEvent::GuaranteeReleased { guarantor, .. } => *guarantor,
            SaccoEvent::CommitteeBidSubmitted { bidder, .. }
            | SaccoEvent::CommitteeBidAccepted { bidder, .. } => *bidder,
            SaccoEvent::CommitteeBidVoted { voter, .. } => *voter,
        }
    }
}

fn topic_address(topics: &[B256]) -> Option<Address> {
    topics.get(1).map(|t| Address::from_slice(&t[12..]))
}

/// Decode a raw log against the event catalogue.
///
/// Logs whose first topic is not a known event hash are skipped with
/// `Ok(None)`; a known event with a malformed payload is an error.
pub fn decode_log(log: &LogEntry) -> Result<Option<SaccoEvent>> {
    let kind = match log.topics.first().copied().and_then(SaccoEventKind::from_topic) {
        Some(kind) => kind,
        None => return Ok(None),
    };

    let subject = match topic_address(&log.topics) {
        Some(address) => address,
        None => {
            warn!("log for {} missing indexed address topic", kind.name());
            return Ok(None);
        }
    };

    let reader = AbiReader::from_hex(&log.data)?;

    let event = match kind {
        SaccoEventKind::MemberRegistered => SaccoEvent::MemberRegistered {
            member: subject,
            shares: reader.uint(0)?,
        },
        SaccoEventKind::SharesPurchased => SaccoEvent::SharesPurchased {
            member: subject,
            shares: reader.uint(0)?,
            amount: reader.uint(1)?,
        },
        SaccoEventKind::SavingsDeposited => SaccoEvent::SavingsDeposited {
            member: subject,
            amount: reader.uint(0)?,
        },
        SaccoEventKind::SavingsWithdrawn => SaccoEvent::SavingsWithdrawn {
            member: subject,
            amount: reader.uint(0)?,
        },
        SaccoEventKind::LoanRequested => SaccoEvent::LoanRequested {
            borrower: subject,
            amount: reader.uint(0)?,
            loan_id: reader.u64(1)?,
        },
        SaccoEventKind::GuaranteeProvided => SaccoEvent::GuaranteeProvided {
            guarantor: subject,
            loan_id: reader.u64(0)?,
            amount: reader.uint(1)?,
        },
        SaccoEventKind::LoanIssued => SaccoEvent::LoanIssued {
            borrower: subject,
            amount: reader.uint(0)?,
            loan_id: reader.u64(1)?,
        },
        SaccoEventKind::LoanRepaid => SaccoEvent::LoanRepaid {
            borrower: subject,
            loan_id: reader.u64(0)?,
            amount: reader.uint(1)?,
        },
        SaccoEventKind::GuaranteeReleased => SaccoEvent::GuaranteeReleased {
            guarantor: subject,
            loan_id: reader.u64(0)?,
            amount: reader.uint(1)?,
        },
        SaccoEventKind::DividendPaid => SaccoEvent::DividendPaid {
            member: subject,
            amount: reader.uint(0)?,
        },
        SaccoEventKind::BoardMemberAdded => SaccoEvent::BoardMemberAdded {
            member: subject,
            votes: reader.uint(0)?,
        },
        SaccoEventKind::BoardMemberRemoved => SaccoEvent::BoardMemberRemoved { member: subject },
        SaccoEventKind::CommitteeBidSubmitted => SaccoEvent::CommitteeBidSubmitted {
            bidder: subject,
            bid_id: reader.u64(0)?,
            amount: reader.uint(1)?,
        },
        SaccoEventKind::CommitteeBidVoted => SaccoEvent::CommitteeBidVoted {
            voter: subject,
            bid_id: reader.u64(0)?,
            votes: reader.uint(1)?,
        },
        SaccoEventKind::CommitteeBidAccepted => SaccoEvent::CommitteeBidAccepted {
            bidder: subject,
            bid_id: reader.u64(0)?,
        },
    };

    Ok(Some(event))
}

type Handler = Arc<dyn Fn(&SaccoEvent) + Send + Sync>;

/// A live subscription; pass back to [`EventBus::unsubscribe`] to detach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    kind: SaccoEventKind,
    id: u64,
}

#[derive(Default)]
struct BusInner {
    handlers: Mutex<HashMap<SaccoEventKind, Vec<(u64, Handler)>>>,
    next_id: AtomicU64,
}

/// Per-kind event fan-out, shared across clones
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind
    pub fn subscribe<F>(&self, kind: SaccoEventKind, handler: F) -> Subscription
    where
        F: Fn(&SaccoEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .handlers
            .lock()
            .expect("bus lock poisoned")
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription { kind, id }
    }

    /// Detach a previously registered handler
    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut handlers = self.inner.handlers.lock().expect("bus lock poisoned");
        if let Some(list) = handlers.get_mut(&subscription.kind) {
            list.retain(|(id, _)| *id != subscription.id);
        }
    }

    /// Deliver an event to every handler subscribed to its kind
    pub fn publish(&self, event: &SaccoEvent) {
        let handlers: Vec<Handler> = {
            let map = self.inner.handlers.lock().expect("bus lock poisoned");
            map.get(&event.kind())
                .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };
        debug!("publishing {} to {} handlers", event.kind().name(), handlers.len());
        for handler in handlers {
            handler(event);
        }
    }
}

/// Polls the node for contract logs and publishes decoded events.
///
/// Each pass covers the block range since the previous pass; the first pass
/// starts at the current head so history is not replayed.
pub struct EventPoller {
    rpc: RpcClient,
    bus: EventBus,
    contract: Address,
    poll_interval: Duration,
    last_block: Mutex<Option<u64>>,
}

impl EventPoller {
    /// Create a poller for the contract
    pub fn new(
        rpc: RpcClient,
        bus: EventBus,
        descriptor: &ContractDescriptor,
        config: &ClientConfig,
    ) -> Self {
        Self {
            rpc,
            bus,
            contract: descriptor.address,
            poll_interval: Duration::from_millis(config.event_poll_interval_ms),
            last_block: Mutex::new(None),
        }
    }

    /// Fetch and publish logs emitted since the previous pass.
    ///
    /// Returns the number of events published.
    pub async fn poll_once(&self) -> Result<usize> {
        let head = self.rpc.block_number().await?;

        let from_block = {
            let mut last = self.last_block.lock().expect("poller lock poisoned");
            match *last {
                Some(seen) if seen >= head => return Ok(0),
                Some(seen) => seen + 1,
                None => {
                    // First pass establishes the baseline
                    *last = Some(head);
                    return Ok(0);
                }
            }
        };

        let logs = self.rpc.logs(self.contract, from_block, head).await?;
        debug!("{} logs in blocks {}-{}", logs.len(), from_block, head);

        let mut published = 0;
        for log in &logs {
            match decode_log(log) {
                Ok(Some(event)) => {
                    self.bus.publish(&event);
                    published += 1;
                }
                Ok(None) => {}
                Err(e) => warn!("undecodable log at block {}: {:?}", log.block_number, e),
            }
        }

        *self.last_block.lock().expect("poller lock poisoned") = Some(head);
        Ok(published)
    }

    /// Run the poll loop until the task is dropped
    pub async fn run(&self) {
        info!(
            "event poller started for {} (interval: {:?})",
            self.contract, self.poll_interval
        );
        loop {
            if let Err(e) = self.poll_once().await {
                warn!("event poll pass failed: {:?}", e);
            }
            sleep(self.poll_interval).await;
        }
    }
}
