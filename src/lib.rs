//! Client library for the Sacco cooperative contract on Citrea testnet.
//!
//! A Sacco is a member-owned savings and credit cooperative: members buy
//! shares, save, borrow against their savings, guarantee each other's loans
//! and govern through proposals. This crate is the typed client for one such
//! contract deployment:
//!
//! - [`SaccoClient`] - unified facade: cached reads, signed writes, events
//! - [`config::ClientConfig`] - node endpoint and polling configuration
//! - [`signer::Signer`] - the wallet seam; key material stays with the host
//! - [`monitor::TransactionHandle`] - lifecycle of one submitted write
//! - [`events::EventPoller`] - log tailing that keeps cached reads fresh
//! - [`form::FormPhase`] - state machines for user-facing write flows
//!
//! # Example
//!
//! ```no_run
//! use sacco_client::{ClientConfig, ContractDescriptor, SaccoClient};
//! use alloy_primitives::Address;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::testnet();
//! let contract = ContractDescriptor::new(Address::ZERO, config.chain_id);
//! let client = SaccoClient::new(config, contract)?;
//!
//! let totals = client.totals().await?;
//! println!("shares issued: {}", totals.total_shares);
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod cache;
pub mod config;
pub mod contract;
pub mod dashboard;
pub mod derived;
pub mod error;
pub mod events;
pub mod form;
pub mod monitor;
pub mod retry;
pub mod rpc;
pub mod signer;
pub mod types;

pub use config::{ClientConfig, Network};
pub use contract::{constants, ContractDescriptor, SaccoFunction};
pub use error::{Result, SaccoError};
pub use events::{EventBus, EventPoller, SaccoEvent, SaccoEventKind};
pub use monitor::{MonitorOptions, MonitorOutcome, TransactionHandle, TransactionMonitor};
pub use rpc::{LogEntry, ReceiptInfo, RpcClient};
pub use signer::{Signer, TransactionRequest, WalletSession};
pub use types::{
    BidId, BoardMember, CommitteeBid, Loan, LoanGuarantee, LoanId, MemberInfo, Proposal,
    ProposalId, ProposalType, ReadValue, Totals, TxPhase,
};

use crate::abi::{AbiReader, Token};
use crate::cache::{CacheKey, ReadCache};
use crate::contract::constants::{MINIMUM_SHARES, SHARE_PRICE};
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info};

/// Unified client for the Sacco contract.
///
/// Cheap to clone; clones share the cache, the event bus and the wallet
/// session. Reads go through the cache and can be observed without blocking
/// via the `cached_*` accessors; writes require a connected [`Signer`] and
/// return a [`TransactionHandle`].
#[derive(Clone)]
pub struct SaccoClient {
    config: Arc<ClientConfig>,
    descriptor: ContractDescriptor,
    rpc: RpcClient,
    cache: ReadCache,
    bus: EventBus,
    monitor: TransactionMonitor,
    session: WalletSession,
}

/// View functions whose cached values an event kind makes stale
fn invalidated_views(kind: SaccoEventKind) -> &'static [&'static str] {
    match kind {
        SaccoEventKind::MemberRegistered => &[
            "getMemberInfo",
            "getMemberShares",
            "isMemberActive",
            "getTotalShares",
        ],
        SaccoEventKind::SharesPurchased => {
            &["getMemberInfo", "getMemberShares", "getTotalShares"]
        }
        SaccoEventKind::SavingsDeposited
        | SaccoEventKind::SavingsWithdrawn
        | SaccoEventKind::DividendPaid => &[
            "getMemberInfo",
            "getMemberSavings",
            "getTotalSavings",
            "getMaxLoanAmount",
        ],
        SaccoEventKind::LoanRequested => &[
            "getLoan",
            "getMemberLoans",
            "getNextLoanId",
            "getLoanGuarantees",
        ],
        SaccoEventKind::GuaranteeProvided => &[
            "getLoan",
            "getLoanGuarantees",
            "getMemberInfo",
            "getMaxLoanAmount",
        ],
        SaccoEventKind::LoanIssued => &["getLoan", "getMemberLoans", "getMemberInfo"],
        SaccoEventKind::LoanRepaid => &[
            "getLoan",
            "getMemberLoans",
            "getMemberInfo",
            "getLoanGuarantees",
        ],
        SaccoEventKind::GuaranteeReleased => &[
            "getLoanGuarantees",
            "getMemberInfo",
            "getMaxLoanAmount",
        ],
        SaccoEventKind::BoardMemberAdded | SaccoEventKind::BoardMemberRemoved => {
            &["isBoardMember", "getBoardMembers"]
        }
        SaccoEventKind::CommitteeBidSubmitted
        | SaccoEventKind::CommitteeBidVoted
        | SaccoEventKind::CommitteeBidAccepted => &["getCommitteeBids"],
    }
}

impl SaccoClient {
    /// Create a client for one contract deployment.
    ///
    /// Wires event-driven cache invalidation: every decoded contract event
    /// drops the cached reads it makes stale.
    pub fn new(config: ClientConfig, descriptor: ContractDescriptor) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let rpc = RpcClient::new(config.clone())?;
        let cache = ReadCache::new();
        let bus = EventBus::new();
        let monitor = TransactionMonitor::new(rpc.clone(), config.clone());

        for kind in SaccoEventKind::ALL {
            let cache = cache.clone();
            bus.subscribe(kind, move |event| {
                for function in invalidated_views(event.kind()) {
                    cache.invalidate_function(function);
                }
            });
        }

        info!(
            "sacco client created for {} on chain {}",
            descriptor.address, descriptor.chain_id
        );

        Ok(Self {
            config,
            descriptor,
            rpc,
            cache,
            bus,
            monitor,
            session: WalletSession::new(),
        })
    }

    /// The client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The contract deployment this client talks to
    pub fn descriptor(&self) -> ContractDescriptor {
        self.descriptor
    }

    /// The wallet session; connect a [`Signer`] here before writing
    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// The event bus carrying decoded contract events
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Build a poller that tails contract logs into the event bus.
    ///
    /// Run it on a background task; decoded events both reach external
    /// subscribers and invalidate stale cached reads.
    pub fn poller(&self) -> EventPoller {
        EventPoller::new(
            self.rpc.clone(),
            self.bus.clone(),
            &self.descriptor,
            &self.config,
        )
    }

    /// Verify the node responds
    pub async fn health_check(&self) -> Result<bool> {
        self.rpc.health_check().await
    }

    // ---- reads ----

    fn cache_key(function: SaccoFunction, args: &[Token]) -> CacheKey {
        let data = abi::encode_call(function.signature(), args);
        // Key on the argument words only; the selector is implied by the name
        CacheKey::new(function.name(), data[10..].to_string())
    }

    async fn view(&self, function: SaccoFunction, args: &[Token]) -> Result<AbiReader> {
        let data = abi::encode_call(function.signature(), args);
        debug!("view call {}", function.name());
        let raw = self.rpc.call(self.descriptor.address, &data).await?;
        AbiReader::from_hex(&raw)
    }

    /// Fetch the member record for an account
    pub async fn member_info(&self, member: Address) -> Result<MemberInfo> {
        let args = [Token::Addr(member)];
        let key = Self::cache_key(SaccoFunction::GetMemberInfo, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetMemberInfo, &args).await?;
        let info = decode_member_info(&reader)?;
        self.cache.complete(&key, generation, &info);
        Ok(info)
    }

    /// Member record from cache, without touching the network
    pub fn cached_member_info(&self, member: Address) -> ReadValue<MemberInfo> {
        let args = [Token::Addr(member)];
        self.cache
            .get(&Self::cache_key(SaccoFunction::GetMemberInfo, &args))
    }

    /// Shares held by an account
    pub async fn member_shares(&self, member: Address) -> Result<U256> {
        let args = [Token::Addr(member)];
        let key = Self::cache_key(SaccoFunction::GetMemberShares, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetMemberShares, &args).await?;
        let shares = reader.uint(0)?;
        self.cache.complete(&key, generation, &shares);
        Ok(shares)
    }

    /// Savings balance of an account
    pub async fn member_savings(&self, member: Address) -> Result<U256> {
        let args = [Token::Addr(member)];
        let key = Self::cache_key(SaccoFunction::GetMemberSavings, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetMemberSavings, &args).await?;
        let savings = reader.uint(0)?;
        self.cache.complete(&key, generation, &savings);
        Ok(savings)
    }

    /// Whether the account is an active member
    pub async fn is_member_active(&self, member: Address) -> Result<bool> {
        let args = [Token::Addr(member)];
        let key = Self::cache_key(SaccoFunction::IsMemberActive, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::IsMemberActive, &args).await?;
        let active = reader.bool(0)?;
        self.cache.complete(&key, generation, &active);
        Ok(active)
    }

    /// Total shares issued across the cooperative
    pub async fn total_shares(&self) -> Result<U256> {
        let key = Self::cache_key(SaccoFunction::GetTotalShares, &[]);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetTotalShares, &[]).await?;
        let total = reader.uint(0)?;
        self.cache.complete(&key, generation, &total);
        Ok(total)
    }

    /// Total savings held across the cooperative
    pub async fn total_savings(&self) -> Result<U256> {
        let key = Self::cache_key(SaccoFunction::GetTotalSavings, &[]);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetTotalSavings, &[]).await?;
        let total = reader.uint(0)?;
        self.cache.complete(&key, generation, &total);
        Ok(total)
    }

    /// Number of proposals created so far
    pub async fn total_proposals(&self) -> Result<u64> {
        let key = Self::cache_key(SaccoFunction::GetTotalProposals, &[]);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetTotalProposals, &[]).await?;
        let total = reader.u64(0)?;
        self.cache.complete(&key, generation, &total);
        Ok(total)
    }

    /// Cooperative-wide aggregates in one struct
    pub async fn totals(&self) -> Result<Totals> {
        let (total_shares, total_savings, total_proposals) = tokio::try_join!(
            self.total_shares(),
            self.total_savings(),
            self.total_proposals()
        )?;
        Ok(Totals {
            total_shares,
            total_savings,
            total_proposals,
        })
    }

    /// Fetch one loan by id
    pub async fn loan(&self, loan_id: LoanId) -> Result<Loan> {
        let args = [Token::Uint(U256::from(loan_id))];
        let key = Self::cache_key(SaccoFunction::GetLoan, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetLoan, &args).await?;
        let loan = decode_loan(&reader)?;
        self.cache.complete(&key, generation, &loan);
        Ok(loan)
    }

    /// Ids of all loans held by a member
    pub async fn member_loans(&self, member: Address) -> Result<Vec<LoanId>> {
        let args = [Token::Addr(member)];
        let key = Self::cache_key(SaccoFunction::GetMemberLoans, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetMemberLoans, &args).await?;
        let ids = decode_loan_ids(&reader)?;
        self.cache.complete(&key, generation, &ids);
        Ok(ids)
    }

    /// Contract-computed maximum loan for a member
    pub async fn max_loan_amount(&self, member: Address) -> Result<U256> {
        let args = [Token::Addr(member)];
        let key = Self::cache_key(SaccoFunction::GetMaxLoanAmount, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetMaxLoanAmount, &args).await?;
        let max = reader.uint(0)?;
        self.cache.complete(&key, generation, &max);
        Ok(max)
    }

    /// Guarantees pledged against a loan
    pub async fn loan_guarantees(&self, loan_id: LoanId) -> Result<Vec<LoanGuarantee>> {
        let args = [Token::Uint(U256::from(loan_id))];
        let key = Self::cache_key(SaccoFunction::GetLoanGuarantees, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetLoanGuarantees, &args).await?;
        let guarantees = decode_guarantees(&reader)?;
        self.cache.complete(&key, generation, &guarantees);
        Ok(guarantees)
    }

    /// Id the next requested loan will receive
    pub async fn next_loan_id(&self) -> Result<LoanId> {
        let key = Self::cache_key(SaccoFunction::GetNextLoanId, &[]);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetNextLoanId, &[]).await?;
        let id = reader.u64(0)?;
        self.cache.complete(&key, generation, &id);
        Ok(id)
    }

    /// Fetch one proposal by id
    pub async fn proposal(&self, proposal_id: ProposalId) -> Result<Proposal> {
        let args = [Token::Uint(U256::from(proposal_id))];
        let key = Self::cache_key(SaccoFunction::GetProposal, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetProposal, &args).await?;
        let proposal = decode_proposal(&reader)?;
        self.cache.complete(&key, generation, &proposal);
        Ok(proposal)
    }

    /// Whether the account holds a board seat
    pub async fn is_board_member(&self, member: Address) -> Result<bool> {
        let args = [Token::Addr(member)];
        let key = Self::cache_key(SaccoFunction::IsBoardMember, &args);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::IsBoardMember, &args).await?;
        let seated = reader.bool(0)?;
        self.cache.complete(&key, generation, &seated);
        Ok(seated)
    }

    /// The current board
    pub async fn board_members(&self) -> Result<Vec<BoardMember>> {
        let key = Self::cache_key(SaccoFunction::GetBoardMembers, &[]);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetBoardMembers, &[]).await?;
        let board = decode_board_members(&reader)?;
        self.cache.complete(&key, generation, &board);
        Ok(board)
    }

    /// All committee bids
    pub async fn committee_bids(&self) -> Result<Vec<CommitteeBid>> {
        let key = Self::cache_key(SaccoFunction::GetCommitteeBids, &[]);
        let generation = self.cache.begin(&key);
        let reader = self.view(SaccoFunction::GetCommitteeBids, &[]).await?;
        let bids = decode_committee_bids(&reader)?;
        self.cache.complete(&key, generation, &bids);
        Ok(bids)
    }

    // ---- writes ----

    async fn submit(
        &self,
        function: SaccoFunction,
        args: &[Token],
        value: U256,
    ) -> Result<TransactionHandle> {
        let signer = self.session.current()?;
        let request = TransactionRequest {
            to: self.descriptor.address,
            data: abi::encode_call(function.signature(), args),
            value,
            chain_id: self.descriptor.chain_id,
        };

        info!("submitting {} from {}", function.name(), signer.address());
        let raw = signer.sign_transaction(&request).await?;
        let hash = self.rpc.send_raw_transaction(&raw).await?;

        Ok(TransactionHandle::new(
            hash,
            self.monitor.clone(),
            MonitorOptions::from_config(&self.config),
        ))
    }

    /// Buy shares. Attaches `count * SHARE_PRICE` of native value.
    pub async fn purchase_shares(&self, count: u64) -> Result<TransactionHandle> {
        if count < MINIMUM_SHARES {
            return Err(SaccoError::Validation(format!(
                "at least {} share(s) required",
                MINIMUM_SHARES
            )));
        }
        let value = SHARE_PRICE.saturating_mul(U256::from(count));
        self.submit(
            SaccoFunction::PurchaseShares,
            &[Token::Uint(U256::from(count))],
            value,
        )
        .await
    }

    /// Propose an account for membership
    pub async fn propose_membership(&self, candidate: Address) -> Result<TransactionHandle> {
        self.submit(
            SaccoFunction::ProposeMembership,
            &[Token::Addr(candidate)],
            U256::ZERO,
        )
        .await
    }

    /// Alias for [`Self::propose_membership`]: registration happens by
    /// membership proposal, there is no direct-registration entry point.
    pub async fn register_member(&self, candidate: Address) -> Result<TransactionHandle> {
        self.propose_membership(candidate).await
    }

    /// Deposit savings; the deposit is the attached value
    pub async fn deposit_savings(&self, amount: U256) -> Result<TransactionHandle> {
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "deposit amount must be greater than zero".to_string(),
            ));
        }
        self.submit(SaccoFunction::DepositSavings, &[], amount).await
    }

    /// Withdraw savings
    pub async fn withdraw_savings(&self, amount: U256) -> Result<TransactionHandle> {
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "withdrawal amount must be greater than zero".to_string(),
            ));
        }
        self.submit(
            SaccoFunction::WithdrawSavings,
            &[Token::Uint(amount)],
            U256::ZERO,
        )
        .await
    }

    /// Request a loan of `amount` over `duration_secs`
    pub async fn request_loan(
        &self,
        amount: U256,
        duration_secs: u64,
    ) -> Result<TransactionHandle> {
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "loan amount must be greater than zero".to_string(),
            ));
        }
        if duration_secs == 0 {
            return Err(SaccoError::Validation(
                "loan duration must be greater than zero".to_string(),
            ));
        }
        self.submit(
            SaccoFunction::RequestLoan,
            &[Token::Uint(amount), Token::Uint(U256::from(duration_secs))],
            U256::ZERO,
        )
        .await
    }

    /// Repay part or all of a loan; the repayment is the attached value
    pub async fn repay_loan(&self, loan_id: LoanId, amount: U256) -> Result<TransactionHandle> {
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "repayment amount must be greater than zero".to_string(),
            ));
        }
        self.submit(
            SaccoFunction::RepayLoan,
            &[Token::Uint(U256::from(loan_id))],
            amount,
        )
        .await
    }

    /// Pledge a guarantee against another member's loan.
    ///
    /// Checked against the guarantor's cached capacity before anything is
    /// signed or sent; the contract re-checks authoritatively. An unloaded
    /// capacity does not block submission.
    pub async fn provide_guarantee(
        &self,
        loan_id: LoanId,
        amount: U256,
    ) -> Result<TransactionHandle> {
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "guarantee amount must be greater than zero".to_string(),
            ));
        }

        let signer = self.session.current()?;
        if let Some(info) = self.cached_member_info(signer.address()).value() {
            if amount > info.guarantee_capacity {
                return Err(SaccoError::ExceedsCapacity {
                    requested: amount,
                    capacity: info.guarantee_capacity,
                });
            }
        }

        self.submit(
            SaccoFunction::ProvideGuarantee,
            &[Token::Uint(U256::from(loan_id))],
            amount,
        )
        .await
    }

    /// Create a governance proposal
    pub async fn create_proposal(
        &self,
        description: &str,
        kind: ProposalType,
    ) -> Result<TransactionHandle> {
        if description.trim().is_empty() {
            return Err(SaccoError::Validation(
                "proposal description is empty".to_string(),
            ));
        }
        let handle = self
            .submit(
                SaccoFunction::CreateProposal,
                &[
                    Token::Str(description.trim().to_string()),
                    Token::Uint(U256::from(kind as u8)),
                ],
                U256::ZERO,
            )
            .await?;
        // Proposal state has no dedicated event; drop it eagerly
        self.cache.invalidate_function("getTotalProposals");
        Ok(handle)
    }

    /// Vote on a proposal
    pub async fn vote(&self, proposal_id: ProposalId, support: bool) -> Result<TransactionHandle> {
        let handle = self
            .submit(
                SaccoFunction::Vote,
                &[Token::Uint(U256::from(proposal_id)), Token::Bool(support)],
                U256::ZERO,
            )
            .await?;
        self.cache.invalidate_function("getProposal");
        Ok(handle)
    }

    /// Execute a passed proposal
    pub async fn execute_proposal(&self, proposal_id: ProposalId) -> Result<TransactionHandle> {
        let handle = self
            .submit(
                SaccoFunction::ExecuteProposal,
                &[Token::Uint(U256::from(proposal_id))],
                U256::ZERO,
            )
            .await?;
        self.cache.invalidate_function("getProposal");
        Ok(handle)
    }

    /// Submit a bid to serve on the credit committee
    pub async fn submit_committee_bid(&self, proposal: &str) -> Result<TransactionHandle> {
        if proposal.trim().is_empty() {
            return Err(SaccoError::Validation(
                "bid proposal is empty".to_string(),
            ));
        }
        self.submit(
            SaccoFunction::SubmitCommitteeBid,
            &[Token::Str(proposal.trim().to_string())],
            U256::ZERO,
        )
        .await
    }

    /// Vote on a committee bid
    pub async fn vote_on_committee_bid(
        &self,
        bid_id: BidId,
        votes: U256,
    ) -> Result<TransactionHandle> {
        if votes.is_zero() {
            return Err(SaccoError::Validation(
                "vote weight must be greater than zero".to_string(),
            ));
        }
        self.submit(
            SaccoFunction::VoteOnCommitteeBid,
            &[Token::Uint(U256::from(bid_id)), Token::Uint(votes)],
            U256::ZERO,
        )
        .await
    }
}

fn decode_member_info(reader: &AbiReader) -> Result<MemberInfo> {
    Ok(MemberInfo {
        shares: reader.uint(0)?,
        savings: reader.uint(1)?,
        join_date: reader.u64(2)?,
        is_active: reader.bool(3)?,
        total_loans_received: reader.uint(4)?,
        guarantee_capacity: reader.uint(5)?,
    })
}

fn decode_loan(reader: &AbiReader) -> Result<Loan> {
    Ok(Loan {
        amount: reader.uint(0)?,
        repayment_amount: reader.uint(1)?,
        duration: reader.u64(2)?,
        start_time: reader.u64(3)?,
        next_repayment_time: reader.u64(4)?,
        repaid_amount: reader.uint(5)?,
        repaid: reader.bool(6)?,
        borrower: reader.address(7)?,
        guarantee_required: reader.uint(8)?,
        guarantee_provided: reader.uint(9)?,
    })
}

fn decode_proposal(reader: &AbiReader) -> Result<Proposal> {
    Ok(Proposal {
        description: reader.string(0)?,
        proposer: reader.address(1)?,
        kind: ProposalType::try_from(reader.u8(2)?)?,
        yes_votes: reader.uint(3)?,
        no_votes: reader.uint(4)?,
        executed: reader.bool(5)?,
        deadline: reader.u64(6)?,
    })
}

fn decode_loan_ids(reader: &AbiReader) -> Result<Vec<LoanId>> {
    let (first, len) = reader.array(0)?;
    (0..len).map(|i| reader.u64(first + i)).collect()
}

fn decode_guarantees(reader: &AbiReader) -> Result<Vec<LoanGuarantee>> {
    let (first, len) = reader.array(0)?;
    (0..len)
        .map(|i| {
            let base = first + i * 3;
            Ok(LoanGuarantee {
                guarantor: reader.address(base)?,
                amount: reader.uint(base + 1)?,
                active: reader.bool(base + 2)?,
            })
        })
        .collect()
}

fn decode_board_members(reader: &AbiReader) -> Result<Vec<BoardMember>> {
    let (first, len) = reader.array(0)?;
    (0..len)
        .map(|i| {
            let base = first + i * 4;
            Ok(BoardMember {
                member: reader.address(base)?,
                appointed_date: reader.u64(base + 1)?,
                votes: reader.uint(base + 2)?,
                is_active: reader.bool(base + 3)?,
            })
        })
        .collect()
}

fn decode_committee_bids(reader: &AbiReader) -> Result<Vec<CommitteeBid>> {
    let (first, len) = reader.array(0)?;
    // Elements carry a dynamic string, so each head word is an offset
    // relative to the start of the array contents
    let contents_base = first * 32;
    (0..len)
        .map(|i| {
            let relative = reader.u64(first + i)? as usize;
            let element = reader.scoped(contents_base + relative)?;
            Ok(CommitteeBid {
                bidder: element.address(0)?,
                proposal: element.string(1)?,
                bid_amount: element.uint(2)?,
                submission_date: element.u64(3)?,
                votes: element.uint(4)?,
                is_active: element.bool(5)?,
            })
        })
        .collect()
}
