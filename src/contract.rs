//! Static description of the deployed Sacco contract.
//!
//! Pure data: the deployment address, the typed function catalogue, and the
//! policy constants mirrored client-side for display. Swapping deployments
//! means constructing a different [`ContractDescriptor`]; nothing else in the
//! crate hard-codes an address.

use alloy_primitives::{Address, U256};

use crate::abi;

/// Address and chain of one Sacco deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractDescriptor {
    /// Deployed contract address
    pub address: Address,
    /// Chain id of the deployment
    pub chain_id: u64,
}

impl ContractDescriptor {
    /// Describe a deployment
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self { address, chain_id }
    }
}

/// The complete function catalogue of the Sacco contract.
///
/// One canonical schema; earlier interface revisions with incompatible
/// signatures are deliberately not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaccoFunction {
    // Views
    /// `getMemberInfo(address)` -> 6-word member tuple
    GetMemberInfo,
    /// `getMemberShares(address)` -> uint256
    GetMemberShares,
    /// `getMemberSavings(address)` -> uint256
    GetMemberSavings,
    /// `isMemberActive(address)` -> bool
    IsMemberActive,
    /// `getTotalShares()` -> uint256
    GetTotalShares,
    /// `getTotalSavings()` -> uint256
    GetTotalSavings,
    /// `getTotalProposals()` -> uint256
    GetTotalProposals,
    /// `getLoan(uint256)` -> loan tuple
    GetLoan,
    /// `getMemberLoans(address)` -> uint256[]
    GetMemberLoans,
    /// `getMaxLoanAmount(address)` -> uint256
    GetMaxLoanAmount,
    /// `getLoanGuarantees(uint256)` -> guarantee tuple array
    GetLoanGuarantees,
    /// `getNextLoanId()` -> uint256
    GetNextLoanId,
    /// `getProposal(uint256)` -> proposal tuple
    GetProposal,
    /// `isBoardMember(address)` -> bool
    IsBoardMember,
    /// `getBoardMembers()` -> board member tuple array
    GetBoardMembers,
    /// `getCommitteeBids()` -> committee bid tuple array
    GetCommitteeBids,

    // Writes
    /// `purchaseShares(uint256)`, payable
    PurchaseShares,
    /// `proposeMembership(address)`
    ProposeMembership,
    /// `depositSavings()`, payable
    DepositSavings,
    /// `withdrawSavings(uint256)`
    WithdrawSavings,
    /// `requestLoan(uint256,uint256)`
    RequestLoan,
    /// `repayLoan(uint256)`, payable
    RepayLoan,
    /// `provideGuarantee(uint256)`, payable
    ProvideGuarantee,
    /// `createProposal(string,uint8)`
    CreateProposal,
    /// `vote(uint256,bool)`
    Vote,
    /// `executeProposal(uint256)`
    ExecuteProposal,
    /// `submitCommitteeBid(string)`
    SubmitCommitteeBid,
    /// `voteOnCommitteeBid(uint256,uint256)`
    VoteOnCommitteeBid,
}

impl SaccoFunction {
    /// Function name as it appears in the contract interface
    pub fn name(&self) -> &'static str {
        match self {
            SaccoFunction::GetMemberInfo => "getMemberInfo",
            SaccoFunction::GetMemberShares => "getMemberShares",
            SaccoFunction::GetMemberSavings => "getMemberSavings",
            SaccoFunction::IsMemberActive => "isMemberActive",
            SaccoFunction::GetTotalShares => "getTotalShares",
            SaccoFunction::GetTotalSavings => "getTotalSavings",
            SaccoFunction::GetTotalProposals => "getTotalProposals",
            SaccoFunction::GetLoan => "getLoan",
            SaccoFunction::GetMemberLoans => "getMemberLoans",
            SaccoFunction::GetMaxLoanAmount => "getMaxLoanAmount",
            SaccoFunction::GetLoanGuarantees => "getLoanGuarantees",
            SaccoFunction::GetNextLoanId => "getNextLoanId",
            SaccoFunction::GetProposal => "getProposal",
            SaccoFunction::IsBoardMember => "isBoardMember",
            SaccoFunction::GetBoardMembers => "getBoardMembers",
            SaccoFunction::GetCommitteeBids => "getCommitteeBids",
            SaccoFunction::PurchaseShares => "purchaseShares",
            SaccoFunction::ProposeMembership => "proposeMembership",
            SaccoFunction::DepositSavings => "depositSavings",
            SaccoFunction::WithdrawSavings => "withdrawSavings",
            SaccoFunction::RequestLoan => "requestLoan",
            SaccoFunction::RepayLoan => "repayLoan",
            SaccoFunction::ProvideGuarantee => "provideGuarantee",
            SaccoFunction::CreateProposal => "createProposal",
            SaccoFunction::Vote => "vote",
            SaccoFunction::ExecuteProposal => "executeProposal",
            SaccoFunction::SubmitCommitteeBid => "submitCommitteeBid",
            SaccoFunction::VoteOnCommitteeBid => "voteOnCommitteeBid",
        }
    }

    /// Canonical signature used for selector derivation
    pub fn signature(&self) -> &'static str {
        match self {
            SaccoFunction::GetMemberInfo => "getMemberInfo(address)",
            SaccoFunction::GetMemberShares => "getMemberShares(address)",
            SaccoFunction::GetMemberSavings => "getMemberSavings(address)",
            SaccoFunction::IsMemberActive => "isMemberActive(address)",
            SaccoFunction::GetTotalShares => "getTotalShares()",
            SaccoFunction::GetTotalSavings => "getTotalSavings()",
            SaccoFunction::GetTotalProposals => "getTotalProposals()",
            SaccoFunction::GetLoan => "getLoan(uint256)",
            SaccoFunction::GetMemberLoans => "getMemberLoans(address)",
            SaccoFunction::GetMaxLoanAmount => "getMaxLoanAmount(address)",
            SaccoFunction::GetLoanGuarantees => "getLoanGuarantees(uint256)",
            SaccoFunction::GetNextLoanId => "getNextLoanId()",
            SaccoFunction::GetProposal => "getProposal(uint256)",
            SaccoFunction::IsBoardMember => "isBoardMember(address)",
            SaccoFunction::GetBoardMembers => "getBoardMembers()",
            SaccoFunction::GetCommitteeBids => "getCommitteeBids()",
            SaccoFunction::PurchaseShares => "purchaseShares(uint256)",
            SaccoFunction::ProposeMembership => "proposeMembership(address)",
            SaccoFunction::DepositSavings => "depositSavings()",
            SaccoFunction::WithdrawSavings => "withdrawSavings(uint256)",
            SaccoFunction::RequestLoan => "requestLoan(uint256,uint256)",
            SaccoFunction::RepayLoan => "repayLoan(uint256)",
            SaccoFunction::ProvideGuarantee => "provideGuarantee(uint256)",
            SaccoFunction::CreateProposal => "createProposal(string,uint8)",
            SaccoFunction::Vote => "vote(uint256,bool)",
            SaccoFunction::ExecuteProposal => "executeProposal(uint256)",
            SaccoFunction::SubmitCommitteeBid => "submitCommitteeBid(string)",
            SaccoFunction::VoteOnCommitteeBid => "voteOnCommitteeBid(uint256,uint256)",
        }
    }

    /// 4-byte selector
    pub fn selector(&self) -> [u8; 4] {
        abi::selector(self.signature())
    }

    /// Whether this is a view function (read, no transaction)
    pub fn is_view(&self) -> bool {
        matches!(
            self,
            SaccoFunction::GetMemberInfo
                | SaccoFunction::GetMemberShares
                | SaccoFunction::GetMemberSavings
                | SaccoFunction::IsMemberActive
                | SaccoFunction::GetTotalShares
                | SaccoFunction::GetTotalSavings
                | SaccoFunction::GetTotalProposals
                | SaccoFunction::GetLoan
                | SaccoFunction::GetMemberLoans
                | SaccoFunction::GetMaxLoanAmount
                | SaccoFunction::GetLoanGuarantees
                | SaccoFunction::GetNextLoanId
                | SaccoFunction::GetProposal
                | SaccoFunction::IsBoardMember
                | SaccoFunction::GetBoardMembers
                | SaccoFunction::GetCommitteeBids
        )
    }

    /// Whether this write accepts an attached value
    pub fn is_payable(&self) -> bool {
        matches!(
            self,
            SaccoFunction::PurchaseShares
                | SaccoFunction::DepositSavings
                | SaccoFunction::RepayLoan
                | SaccoFunction::ProvideGuarantee
        )
    }
}

/// Policy constants mirrored client-side for display.
///
/// The contract computes the authoritative figures; these only feed cost
/// previews and the advisory derived-state helpers.
pub mod constants {
    use super::U256;

    /// Decimals of the chain's native currency
    pub const NATIVE_DECIMALS: u8 = 18;

    /// Price per share in the smallest currency unit (0.001 native)
    pub const SHARE_PRICE: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

    /// Minimum share purchase accepted by the contract
    pub const MINIMUM_SHARES: u64 = 1;

    /// Display multiplier for the maximum loan relative to savings
    pub const LOAN_MULTIPLIER: u64 = 3;

    /// Annual savings interest rate, percent
    pub const SAVINGS_INTEREST_RATE: u64 = 5;

    /// Annual loan interest rate, percent
    pub const LOAN_INTEREST_RATE: u64 = 10;

    /// Seconds in a (non-leap) year, matching the contract's accrual math
    pub const SECONDS_PER_YEAR: u64 = 31_536_000;
}
