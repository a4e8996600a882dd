//! State machines for user-facing write flows.
//!
//! Each form mirrors one modal of the cooperative's interface: free-text
//! fields, client-side validation, then a submission that tracks the
//! transaction to a terminal state. Validation failures never reach the
//! network, and a failed submission returns the form to editing with the
//! entered fields intact.

use crate::contract::constants::{MINIMUM_SHARES, NATIVE_DECIMALS, SHARE_PRICE};
use crate::error::{Result, SaccoError};
use crate::monitor::MonitorOutcome;
use crate::types::{parse_units, LoanId, ProposalType, TxPhase};
use crate::SaccoClient;
use alloy_primitives::{Address, U256};

const SECONDS_PER_DAY: u64 = 86_400;

/// Where a form is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    /// Fields are editable
    Editing,
    /// A transaction is in flight
    Submitting(TxPhase),
    /// The write confirmed and the form is done
    Closed,
}

impl Default for FormPhase {
    fn default() -> Self {
        FormPhase::Editing
    }
}

/// Parse a 0x-prefixed, 40-hex-digit address field
pub fn validate_address(input: &str) -> Result<Address> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SaccoError::Validation("address is empty".to_string()));
    }
    input
        .parse::<Address>()
        .map_err(|_| SaccoError::Validation(format!("'{}' is not a valid address", input)))
}

/// Drive a prepared submission to a terminal form state.
///
/// `submit` is the facade call producing the transaction handle; the returned
/// pair is the next phase and the error message to display, if any. A timeout
/// leaves the phase in-flight because the transaction may still land.
async fn run_submission<F, Fut>(submit: F) -> (FormPhase, Option<String>)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<crate::TransactionHandle>>,
{
    let handle = match submit().await {
        Ok(handle) => handle,
        Err(e) => return (FormPhase::Editing, Some(e.to_string())),
    };

    match handle.wait().await {
        Ok(MonitorOutcome::Confirmed(_)) => (FormPhase::Closed, None),
        Ok(MonitorOutcome::Failed(reason)) => (FormPhase::Editing, Some(reason)),
        Ok(MonitorOutcome::StillProcessing) => (
            FormPhase::Submitting(TxPhase::Pending),
            Some("transaction is still processing, check back shortly".to_string()),
        ),
        Err(e) => (FormPhase::Editing, Some(e.to_string())),
    }
}

/// Share purchase flow
#[derive(Debug, Clone, Default)]
pub struct PurchaseSharesForm {
    /// Number of shares, as entered
    pub shares: String,
    /// Validation or submission error to display
    pub error: Option<String>,
    /// Lifecycle phase
    pub phase: FormPhase,
}

impl PurchaseSharesForm {
    /// Empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate the share count
    pub fn validate(&self) -> Result<u64> {
        let count: u64 = self
            .shares
            .trim()
            .parse()
            .map_err(|_| SaccoError::Validation("share count must be a whole number".to_string()))?;
        if count < MINIMUM_SHARES {
            return Err(SaccoError::Validation(format!(
                "at least {} share(s) required",
                MINIMUM_SHARES
            )));
        }
        Ok(count)
    }

    /// Cost preview for the entered count, if it parses
    pub fn cost(&self) -> Option<U256> {
        self.validate()
            .ok()
            .map(|count| SHARE_PRICE.saturating_mul(U256::from(count)))
    }

    /// Validate, submit and track the purchase
    pub async fn submit(&mut self, client: &SaccoClient) {
        let count = match self.validate() {
            Ok(count) => count,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.error = None;
        self.phase = FormPhase::Submitting(TxPhase::Pending);
        let (phase, error) = run_submission(|| client.purchase_shares(count)).await;
        if phase == FormPhase::Closed {
            self.shares.clear();
        }
        self.phase = phase;
        self.error = error;
    }
}

/// Savings deposit flow
#[derive(Debug, Clone, Default)]
pub struct DepositSavingsForm {
    /// Deposit amount in native currency, as entered
    pub amount: String,
    pub error: Option<String>,
    pub phase: FormPhase,
}

impl DepositSavingsForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate the amount
    pub fn validate(&self) -> Result<U256> {
        let amount = parse_units(&self.amount, NATIVE_DECIMALS)?;
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "deposit amount must be greater than zero".to_string(),
            ));
        }
        Ok(amount)
    }

    /// Validate, submit and track the deposit
    pub async fn submit(&mut self, client: &SaccoClient) {
        let amount = match self.validate() {
            Ok(amount) => amount,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.error = None;
        self.phase = FormPhase::Submitting(TxPhase::Pending);
        let (phase, error) = run_submission(|| client.deposit_savings(amount)).await;
        if phase == FormPhase::Closed {
            self.amount.clear();
        }
        self.phase = phase;
        self.error = error;
    }
}

/// Loan request flow
#[derive(Debug, Clone, Default)]
pub struct RequestLoanForm {
    /// Principal in native currency, as entered
    pub amount: String,
    /// Duration in days, as entered
    pub duration_days: String,
    pub error: Option<String>,
    pub phase: FormPhase,
}

impl RequestLoanForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate both fields, returning `(amount, duration_secs)`
    pub fn validate(&self) -> Result<(U256, u64)> {
        let amount = parse_units(&self.amount, NATIVE_DECIMALS)?;
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "loan amount must be greater than zero".to_string(),
            ));
        }
        let days: u64 = self.duration_days.trim().parse().map_err(|_| {
            SaccoError::Validation("duration must be a whole number of days".to_string())
        })?;
        if days == 0 {
            return Err(SaccoError::Validation(
                "duration must be at least one day".to_string(),
            ));
        }
        Ok((amount, days * SECONDS_PER_DAY))
    }

    /// Validate, submit and track the loan request
    pub async fn submit(&mut self, client: &SaccoClient) {
        let (amount, duration_secs) = match self.validate() {
            Ok(parsed) => parsed,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.error = None;
        self.phase = FormPhase::Submitting(TxPhase::Pending);
        let (phase, error) = run_submission(|| client.request_loan(amount, duration_secs)).await;
        if phase == FormPhase::Closed {
            self.amount.clear();
            self.duration_days.clear();
        }
        self.phase = phase;
        self.error = error;
    }
}

/// Guarantee pledge flow
#[derive(Debug, Clone, Default)]
pub struct ProvideGuaranteeForm {
    /// Loan id, as entered
    pub loan_id: String,
    /// Guarantee amount in native currency, as entered
    pub amount: String,
    pub error: Option<String>,
    pub phase: FormPhase,
}

impl ProvideGuaranteeForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate both fields, returning `(loan_id, amount)`
    pub fn validate(&self) -> Result<(LoanId, U256)> {
        let loan_id: LoanId = self
            .loan_id
            .trim()
            .parse()
            .map_err(|_| SaccoError::Validation("loan id must be a whole number".to_string()))?;
        let amount = parse_units(&self.amount, NATIVE_DECIMALS)?;
        if amount.is_zero() {
            return Err(SaccoError::Validation(
                "guarantee amount must be greater than zero".to_string(),
            ));
        }
        Ok((loan_id, amount))
    }

    /// Validate, submit and track the pledge. The facade applies the
    /// capacity check before anything is signed.
    pub async fn submit(&mut self, client: &SaccoClient) {
        let (loan_id, amount) = match self.validate() {
            Ok(parsed) => parsed,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.error = None;
        self.phase = FormPhase::Submitting(TxPhase::Pending);
        let (phase, error) = run_submission(|| client.provide_guarantee(loan_id, amount)).await;
        if phase == FormPhase::Closed {
            self.loan_id.clear();
            self.amount.clear();
        }
        self.phase = phase;
        self.error = error;
    }
}

/// Membership proposal flow
#[derive(Debug, Clone, Default)]
pub struct ProposeMembershipForm {
    /// Candidate address, as entered
    pub candidate: String,
    pub error: Option<String>,
    pub phase: FormPhase,
}

impl ProposeMembershipForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate the candidate address
    pub fn validate(&self) -> Result<Address> {
        validate_address(&self.candidate)
    }

    /// Validate, submit and track the proposal
    pub async fn submit(&mut self, client: &SaccoClient) {
        let candidate = match self.validate() {
            Ok(candidate) => candidate,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.error = None;
        self.phase = FormPhase::Submitting(TxPhase::Pending);
        let (phase, error) = run_submission(|| client.propose_membership(candidate)).await;
        if phase == FormPhase::Closed {
            self.candidate.clear();
        }
        self.phase = phase;
        self.error = error;
    }
}

/// Governance proposal flow
#[derive(Debug, Clone)]
pub struct CreateProposalForm {
    /// Free-text description, as entered
    pub description: String,
    /// Selected proposal category
    pub kind: ProposalType,
    pub error: Option<String>,
    pub phase: FormPhase,
}

impl Default for CreateProposalForm {
    fn default() -> Self {
        Self {
            description: String::new(),
            kind: ProposalType::General,
            error: None,
            phase: FormPhase::Editing,
        }
    }
}

impl CreateProposalForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the description
    pub fn validate(&self) -> Result<&str> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(SaccoError::Validation(
                "proposal description is empty".to_string(),
            ));
        }
        Ok(description)
    }

    /// Validate, submit and track the proposal
    pub async fn submit(&mut self, client: &SaccoClient) {
        let description = match self.validate() {
            Ok(description) => description.to_string(),
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.error = None;
        self.phase = FormPhase::Submitting(TxPhase::Pending);
        let (phase, error) =
            run_submission(|| client.create_proposal(&description, self.kind)).await;
        if phase == FormPhase::Closed {
            self.description.clear();
        }
        self.phase = phase;
        self.error = error;
    }
}
