//! Derived member state.
//!
//! Pure functions over cached reads. A missing read never panics and never
//! blocks: every helper degrades to the conservative answer (not a member,
//! nothing held, zero capacity) until the data loads. The figures here are
//! advisory for display; the contract recomputes everything authoritatively.

use crate::contract::constants::LOAN_MULTIPLIER;
use crate::types::{MemberInfo, ReadValue};
use alloy_primitives::U256;

/// Whether the account has a member record at all
pub fn is_member(info: &ReadValue<MemberInfo>) -> bool {
    info.value().map(|m| !m.shares.is_zero()).unwrap_or(false)
}

/// Whether the account is a registered, active member.
///
/// Membership (shares held) and the active flag are both required; an
/// activated record with no shares is not a member.
pub fn is_active_member(info: &ReadValue<MemberInfo>) -> bool {
    is_member(info) && info.value().map(|m| m.is_active).unwrap_or(false)
}

/// Whether the member holds any savings
pub fn has_savings(info: &ReadValue<MemberInfo>) -> bool {
    info.value().map(|m| !m.savings.is_zero()).unwrap_or(false)
}

/// Share count held, zero until loaded
pub fn share_count(info: &ReadValue<MemberInfo>) -> U256 {
    info.value().map(|m| m.shares).unwrap_or(U256::ZERO)
}

/// Savings balance held, zero until loaded
pub fn savings_balance(info: &ReadValue<MemberInfo>) -> U256 {
    info.value().map(|m| m.savings).unwrap_or(U256::ZERO)
}

/// Remaining guarantee capacity, zero until loaded
pub fn guarantee_capacity(info: &ReadValue<MemberInfo>) -> U256 {
    info.value()
        .map(|m| m.guarantee_capacity)
        .unwrap_or(U256::ZERO)
}

/// Display estimate of the maximum loan: savings times the policy multiplier.
/// Saturates instead of overflowing; the contract enforces the real limit.
pub fn max_loan_amount(info: &ReadValue<MemberInfo>) -> U256 {
    savings_balance(info).saturating_mul(U256::from(LOAN_MULTIPLIER))
}
