//! Read-only dashboard snapshots.
//!
//! Each snapshot gathers the reads one screen needs in parallel and freezes
//! them into a plain struct. Snapshots are point-in-time: reload after the
//! event poller reports activity, or on a timer.

use crate::error::Result;
use crate::types::{
    BoardMember, CommitteeBid, Loan, LoanId, MemberInfo, Proposal, ProposalId, Totals,
};
use crate::SaccoClient;
use alloy_primitives::{Address, U256};
use futures::future::try_join_all;

/// Everything the member screen shows for one account
#[derive(Debug, Clone)]
pub struct MemberDashboard {
    /// The account the snapshot describes
    pub member: Address,
    /// Member record
    pub info: MemberInfo,
    /// The member's loans with their ids
    pub loans: Vec<(LoanId, Loan)>,
    /// Contract-computed maximum loan
    pub max_loan: U256,
    /// Whether the member holds a board seat
    pub board_seat: bool,
}

/// Condensed summary derived from a [`MemberDashboard`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStanding {
    /// Whether the membership is active
    pub active: bool,
    /// Shares held
    pub shares: U256,
    /// Savings balance
    pub savings: U256,
    /// Total outstanding across unrepaid loans
    pub outstanding_debt: U256,
    /// Remaining guarantee capacity
    pub guarantee_capacity: U256,
}

impl MemberDashboard {
    /// Load a fresh snapshot for one account
    pub async fn load(client: &SaccoClient, member: Address) -> Result<Self> {
        let (info, loan_ids, max_loan, board_seat) = tokio::try_join!(
            client.member_info(member),
            client.member_loans(member),
            client.max_loan_amount(member),
            client.is_board_member(member),
        )?;

        let loans = try_join_all(loan_ids.iter().map(|id| client.loan(*id))).await?;
        let loans = loan_ids.into_iter().zip(loans).collect();

        Ok(Self {
            member,
            info,
            loans,
            max_loan,
            board_seat,
        })
    }

    /// Summarize the snapshot
    pub fn standing(&self) -> MemberStanding {
        let outstanding_debt = self
            .loans
            .iter()
            .filter(|(_, loan)| !loan.repaid)
            .fold(U256::ZERO, |acc, (_, loan)| {
                acc.saturating_add(loan.outstanding())
            });

        MemberStanding {
            active: self.info.is_active,
            shares: self.info.shares,
            savings: self.info.savings,
            outstanding_debt,
            guarantee_capacity: self.info.guarantee_capacity,
        }
    }
}

/// Cooperative-wide figures for the overview screen
#[derive(Debug, Clone)]
pub struct CooperativeOverview {
    /// Aggregate totals
    pub totals: Totals,
    /// Current board
    pub board: Vec<BoardMember>,
    /// Id the next loan will receive
    pub next_loan_id: LoanId,
}

impl CooperativeOverview {
    /// Load a fresh overview snapshot
    pub async fn load(client: &SaccoClient) -> Result<Self> {
        let (totals, board, next_loan_id) = tokio::try_join!(
            client.totals(),
            client.board_members(),
            client.next_loan_id(),
        )?;

        Ok(Self {
            totals,
            board,
            next_loan_id,
        })
    }

    /// Board seats currently active
    pub fn active_board(&self) -> impl Iterator<Item = &BoardMember> {
        self.board.iter().filter(|seat| seat.is_active)
    }
}

/// Governance state for the proposals screen
#[derive(Debug, Clone)]
pub struct ProposalBoard {
    /// Every proposal with its id, in creation order
    pub proposals: Vec<(ProposalId, Proposal)>,
    /// Every committee bid
    pub bids: Vec<CommitteeBid>,
}

impl ProposalBoard {
    /// Load every proposal and committee bid.
    ///
    /// Proposal ids are dense starting from zero, so the count from
    /// `getTotalProposals` enumerates them.
    pub async fn load(client: &SaccoClient) -> Result<Self> {
        let (total, bids) = tokio::try_join!(client.total_proposals(), client.committee_bids())?;

        let ids: Vec<ProposalId> = (0..total).collect();
        let proposals = try_join_all(ids.iter().map(|id| client.proposal(*id))).await?;
        let proposals = ids.into_iter().zip(proposals).collect();

        Ok(Self { proposals, bids })
    }

    /// Proposals still open for voting at `now`
    pub fn open_at(&self, now: u64) -> impl Iterator<Item = &(ProposalId, Proposal)> {
        self.proposals
            .iter()
            .filter(move |(_, proposal)| proposal.is_open_at(now))
    }

    /// Committee bids still accepting votes
    pub fn active_bids(&self) -> impl Iterator<Item = &CommitteeBid> {
        self.bids.iter().filter(|bid| bid.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProposalType;

    fn loan(outstanding: u64, repaid: bool) -> Loan {
        Loan {
            amount: U256::from(outstanding),
            repayment_amount: U256::from(outstanding),
            duration: 3_600,
            start_time: 0,
            next_repayment_time: 3_600,
            repaid_amount: U256::ZERO,
            repaid,
            borrower: Address::ZERO,
            guarantee_required: U256::ZERO,
            guarantee_provided: U256::ZERO,
        }
    }

    #[test]
    fn test_standing_sums_unrepaid_loans_only() {
        let dashboard = MemberDashboard {
            member: Address::repeat_byte(0x01),
            info: MemberInfo {
                shares: U256::from(10),
                savings: U256::from(1_000),
                join_date: 0,
                is_active: true,
                total_loans_received: U256::from(3),
                guarantee_capacity: U256::from(500),
            },
            loans: vec![(1, loan(200, false)), (2, loan(300, true)), (3, loan(50, false))],
            max_loan: U256::from(3_000),
            board_seat: false,
        };

        let standing = dashboard.standing();
        assert!(standing.active);
        assert_eq!(standing.outstanding_debt, U256::from(250));
        assert_eq!(standing.guarantee_capacity, U256::from(500));
    }

    #[test]
    fn test_proposal_board_open_filter() {
        let proposal = |deadline: u64, executed: bool| Proposal {
            description: "x".to_string(),
            proposer: Address::ZERO,
            kind: ProposalType::General,
            yes_votes: U256::ZERO,
            no_votes: U256::ZERO,
            executed,
            deadline,
        };

        let board = ProposalBoard {
            proposals: vec![
                (0, proposal(100, false)),
                (1, proposal(300, false)),
                (2, proposal(300, true)),
            ],
            bids: vec![],
        };

        let open: Vec<ProposalId> = board.open_at(200).map(|(id, _)| *id).collect();
        assert_eq!(open, vec![1]);
    }

    #[test]
    fn test_active_board_filter() {
        let seat = |active: bool| BoardMember {
            member: Address::ZERO,
            appointed_date: 0,
            votes: U256::ZERO,
            is_active: active,
        };
        let overview = CooperativeOverview {
            totals: Totals {
                total_shares: U256::ZERO,
                total_savings: U256::ZERO,
                total_proposals: 0,
            },
            board: vec![seat(true), seat(false), seat(true)],
            next_loan_id: 1,
        };
        assert_eq!(overview.active_board().count(), 2);
    }
}
