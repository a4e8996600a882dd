//! Client-side mirrors of remote Sacco state.
//!
//! Every entity here is a transient, read-only snapshot of what the contract
//! reported; nothing is mutated locally or persisted across sessions. The
//! authoritative state lives on chain.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SaccoError};

/// Loan identifier assigned by the remote contract
pub type LoanId = u64;

/// Proposal identifier assigned by the remote contract
pub type ProposalId = u64;

/// Committee bid identifier assigned by the remote contract
pub type BidId = u64;

/// A cached read result. "No data yet" is a state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadValue<T> {
    /// The read has not completed (or was invalidated and not yet refetched)
    NotLoaded,
    /// The read completed with this value
    Loaded(T),
}

impl<T> ReadValue<T> {
    /// Whether a value is present
    pub fn is_loaded(&self) -> bool {
        matches!(self, ReadValue::Loaded(_))
    }

    /// Borrow the value if present
    pub fn value(&self) -> Option<&T> {
        match self {
            ReadValue::Loaded(v) => Some(v),
            ReadValue::NotLoaded => None,
        }
    }

    /// Map the loaded value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadValue<U> {
        match self {
            ReadValue::Loaded(v) => ReadValue::Loaded(f(v)),
            ReadValue::NotLoaded => ReadValue::NotLoaded,
        }
    }
}

impl<T> Default for ReadValue<T> {
    fn default() -> Self {
        ReadValue::NotLoaded
    }
}

/// Lifecycle phase of a submitted write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPhase {
    /// Accepted by the node, no receipt yet
    Pending,
    /// Receipt seen, waiting for the configured confirmation count
    Confirming {
        /// Confirmations observed so far
        confirmations: u64,
    },
    /// Confirmed at the required depth
    Confirmed,
    /// Terminal failure with a human-readable reason
    Failed(String),
}

impl fmt::Display for TxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxPhase::Pending => write!(f, "pending"),
            TxPhase::Confirming { confirmations } => {
                write!(f, "confirming ({} confirmations)", confirmations)
            }
            TxPhase::Confirmed => write!(f, "confirmed"),
            TxPhase::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Member record as reported by `getMemberInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Share count held by the member
    pub shares: U256,
    /// Savings balance in the smallest currency unit
    pub savings: U256,
    /// Unix timestamp of joining
    pub join_date: u64,
    /// Whether the membership is active
    pub is_active: bool,
    /// Total loans received over the membership lifetime
    pub total_loans_received: U256,
    /// Remaining capacity to guarantee other members' loans
    pub guarantee_capacity: U256,
}

impl MemberInfo {
    /// Join date as a UTC datetime, when the timestamp is representable
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.join_date as i64, 0).single()
    }
}

/// Loan record as reported by `getLoan`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Principal amount
    pub amount: U256,
    /// Total amount due including interest
    pub repayment_amount: U256,
    /// Loan duration in seconds
    pub duration: u64,
    /// Unix timestamp when the loan was issued
    pub start_time: u64,
    /// Unix timestamp of the next repayment deadline
    pub next_repayment_time: u64,
    /// Amount repaid so far
    pub repaid_amount: U256,
    /// Whether the loan is fully repaid
    pub repaid: bool,
    /// Borrowing member
    pub borrower: Address,
    /// Guarantee amount the contract requires before issuance
    pub guarantee_required: U256,
    /// Guarantee amount pledged so far
    pub guarantee_provided: U256,
}

impl Loan {
    /// Outstanding balance still owed
    pub fn outstanding(&self) -> U256 {
        self.repayment_amount.saturating_sub(self.repaid_amount)
    }
}

/// A single guarantee pledged against a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanGuarantee {
    /// Member pledging the guarantee
    pub guarantor: Address,
    /// Pledged amount
    pub amount: U256,
    /// Whether the guarantee is still held (released on repayment)
    pub active: bool,
}

/// Governance proposal categories, mirroring the contract enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProposalType {
    /// Free-form proposal
    General = 0,
    /// Admit a new member
    MemberRegistration = 1,
    /// Change an interest rate parameter
    InterestRateChange = 2,
    /// Distribute accumulated dividends
    DividendDistribution = 3,
    /// Add a board member
    BoardMemberAddition = 4,
    /// Remove a board member
    BoardMemberRemoval = 5,
}

impl ProposalType {
    /// All proposal categories in contract order
    pub const ALL: [ProposalType; 6] = [
        ProposalType::General,
        ProposalType::MemberRegistration,
        ProposalType::InterestRateChange,
        ProposalType::DividendDistribution,
        ProposalType::BoardMemberAddition,
        ProposalType::BoardMemberRemoval,
    ];
}

impl TryFrom<u8> for ProposalType {
    type Error = SaccoError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ProposalType::General),
            1 => Ok(ProposalType::MemberRegistration),
            2 => Ok(ProposalType::InterestRateChange),
            3 => Ok(ProposalType::DividendDistribution),
            4 => Ok(ProposalType::BoardMemberAddition),
            5 => Ok(ProposalType::BoardMemberRemoval),
            other => Err(SaccoError::InvalidResponse(format!(
                "unknown proposal type {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalType::General => "General",
            ProposalType::MemberRegistration => "Member Registration",
            ProposalType::InterestRateChange => "Interest Rate Change",
            ProposalType::DividendDistribution => "Dividend Distribution",
            ProposalType::BoardMemberAddition => "Board Member Addition",
            ProposalType::BoardMemberRemoval => "Board Member Removal",
        };
        write!(f, "{}", name)
    }
}

/// Governance proposal as reported by `getProposal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Free-text description
    pub description: String,
    /// Proposing member
    pub proposer: Address,
    /// Proposal category
    pub kind: ProposalType,
    /// Votes in favor
    pub yes_votes: U256,
    /// Votes against
    pub no_votes: U256,
    /// Whether the proposal has been executed
    pub executed: bool,
    /// Voting deadline as a unix timestamp
    pub deadline: u64,
}

impl Proposal {
    /// Voting deadline as a UTC datetime, when representable
    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.deadline as i64, 0).single()
    }

    /// Whether voting is still open at the given timestamp
    pub fn is_open_at(&self, now: u64) -> bool {
        !self.executed && now < self.deadline
    }
}

/// Board member record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMember {
    /// Member address
    pub member: Address,
    /// Unix timestamp of appointment
    pub appointed_date: u64,
    /// Votes received when appointed
    pub votes: U256,
    /// Whether the seat is active
    pub is_active: bool,
}

/// Committee bid record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeBid {
    /// Bidding member
    pub bidder: Address,
    /// Bid proposal text
    pub proposal: String,
    /// Bid amount
    pub bid_amount: U256,
    /// Unix timestamp of submission
    pub submission_date: u64,
    /// Votes received so far
    pub votes: U256,
    /// Whether the bid is still open
    pub is_active: bool,
}

/// Cooperative-wide aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Total shares issued
    pub total_shares: U256,
    /// Total savings held
    pub total_savings: U256,
    /// Total proposals created
    pub total_proposals: u64,
}

/// Parse a decimal amount string into the smallest currency unit.
///
/// `"1.5"` with 18 decimals becomes `1_500_000_000_000_000_000`. Rejects
/// empty input, more fractional digits than `decimals`, and anything that is
/// not a plain decimal number.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(SaccoError::Validation("amount is empty".to_string()));
    }

    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if frac.len() > decimals as usize {
        return Err(SaccoError::Validation(format!(
            "too many decimal places (max {})",
            decimals
        )));
    }
    if whole.is_empty() && frac.is_empty() {
        return Err(SaccoError::Validation("amount is empty".to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(SaccoError::Validation(format!(
            "'{}' is not a valid amount",
            amount
        )));
    }

    let scale = U256::from(10u64).pow(U256::from(decimals as u64));
    let whole_part = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10)
            .map_err(|_| SaccoError::Validation(format!("'{}' is not a valid amount", amount)))?
    };

    let frac_part = if frac.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        U256::from_str_radix(&padded, 10)
            .map_err(|_| SaccoError::Validation(format!("'{}' is not a valid amount", amount)))?
    };

    whole_part
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_part))
        .ok_or_else(|| SaccoError::Validation("amount overflows".to_string()))
}

/// Format a smallest-unit amount as a decimal string, trimming trailing zeros.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals as u64));
    let whole = amount / scale;
    let frac = amount % scale;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_value() {
        let v: ReadValue<u32> = ReadValue::NotLoaded;
        assert!(!v.is_loaded());
        assert_eq!(v.value(), None);

        let v = ReadValue::Loaded(7u32);
        assert!(v.is_loaded());
        assert_eq!(v.value(), Some(&7));
        assert_eq!(v.map(|n| n * 2), ReadValue::Loaded(14));
    }

    #[test]
    fn test_tx_phase_display() {
        assert_eq!(TxPhase::Pending.to_string(), "pending");
        assert_eq!(
            TxPhase::Confirming { confirmations: 2 }.to_string(),
            "confirming (2 confirmations)"
        );
        assert_eq!(TxPhase::Confirmed.to_string(), "confirmed");
        assert_eq!(
            TxPhase::Failed("reverted".to_string()).to_string(),
            "failed: reverted"
        );
    }

    #[test]
    fn test_proposal_type_roundtrip() {
        for kind in ProposalType::ALL {
            assert_eq!(ProposalType::try_from(kind as u8).unwrap(), kind);
        }
        assert!(ProposalType::try_from(6).is_err());
    }

    #[test]
    fn test_proposal_is_open() {
        let proposal = Proposal {
            description: "general matters".to_string(),
            proposer: Address::ZERO,
            kind: ProposalType::General,
            yes_votes: U256::ZERO,
            no_votes: U256::ZERO,
            executed: false,
            deadline: 1_000,
        };
        assert!(proposal.is_open_at(999));
        assert!(!proposal.is_open_at(1_000));

        let executed = Proposal {
            executed: true,
            ..proposal
        };
        assert!(!executed.is_open_at(999));
    }

    #[test]
    fn test_loan_outstanding() {
        let loan = Loan {
            amount: U256::from(100),
            repayment_amount: U256::from(110),
            duration: 3600,
            start_time: 0,
            next_repayment_time: 3600,
            repaid_amount: U256::from(40),
            repaid: false,
            borrower: Address::ZERO,
            guarantee_required: U256::from(50),
            guarantee_provided: U256::from(50),
        };
        assert_eq!(loan.outstanding(), U256::from(70));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(
            parse_units("1.5", 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u64)
        );
        assert_eq!(
            parse_units("0.001", 18).unwrap(),
            U256::from(1_000_000_000_000_000u64)
        );
        assert_eq!(parse_units("2", 18).unwrap(), U256::from(2) * U256::from(10u64).pow(U256::from(18)));
        assert_eq!(parse_units(".5", 1).unwrap(), U256::from(5));
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units("abc", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("1.2345", 2).is_err());
        assert!(parse_units(".", 18).is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_000_000_000_000_000u64), 18), "0.001");
        assert_eq!(format_units(U256::from(1_500_000_000_000_000_000u64), 18), "1.5");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(
            format_units(U256::from(3) * U256::from(10u64).pow(U256::from(18)), 18),
            "3"
        );
    }

    #[test]
    fn test_units_roundtrip() {
        let amount = parse_units("12.25", 8).unwrap();
        assert_eq!(format_units(amount, 8), "12.25");
    }

    #[test]
    fn test_member_info_serde() {
        let info = MemberInfo {
            shares: U256::from(10),
            savings: U256::from(500),
            join_date: 1_700_000_000,
            is_active: true,
            total_loans_received: U256::ZERO,
            guarantee_capacity: U256::from(250),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: MemberInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
        assert!(info.joined_at().is_some());
    }
}
