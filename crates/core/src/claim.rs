//! Claim lifecycle for grid squares and their transactions.
//!
//! A square is always in exactly one of three states. The legal transitions
//! are:
//!
//! ```text
//! Unclaimed -> Claimed     cash claim (no provider round-trip)
//! Unclaimed -> Reserved    checkout claim (awaiting provider outcome)
//! Reserved  -> Claimed     provider reported success
//! Reserved  -> Unclaimed   provider reported failure/expiry, or released
//! ```
//!
//! Repositories enforce these transitions in SQL `WHERE` clauses; this
//! module is the single place the transition table is written down, so the
//! API layer and the repair endpoints agree on what is legal.

use serde::{Deserialize, Serialize};

/// State of a single grid square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimState {
    /// Free for anyone to claim.
    Unclaimed,
    /// Held by an in-flight transaction awaiting a provider outcome.
    Reserved,
    /// Committed to a donor.
    Claimed,
}

impl ClaimState {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimState::Unclaimed => "unclaimed",
            ClaimState::Reserved => "reserved",
            ClaimState::Claimed => "claimed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unclaimed" => Some(ClaimState::Unclaimed),
            "reserved" => Some(ClaimState::Reserved),
            "claimed" => Some(ClaimState::Claimed),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ClaimState) -> bool {
        matches!(
            (self, next),
            (ClaimState::Unclaimed, ClaimState::Reserved)
                | (ClaimState::Unclaimed, ClaimState::Claimed)
                | (ClaimState::Reserved, ClaimState::Claimed)
                | (ClaimState::Reserved, ClaimState::Unclaimed)
        )
    }
}

/// Payment status recorded on a square.
///
/// `pending -> completed` on provider success; a released square returns to
/// `pending`. `failed` is only reachable for squares a provider explicitly
/// declined while they stay attached to their transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Status of a donor transaction.
///
/// `Refunded` is modeled for completeness but no handler currently produces
/// it; refunds are an operator action against the provider dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            "refunded" => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }

    /// A terminal transaction can no longer be moved by reconciliation.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// Payment channel chosen by the donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "paypal" => Some(PaymentMethod::Paypal),
            _ => None,
        }
    }
}

/// The donor identifier written to `claimed_by` when a claim commits.
///
/// Anonymous donors are recorded under a fixed marker instead of their email
/// so public grid reads never leak the address.
pub fn claim_owner(donor_email: &str, anonymous: bool) -> String {
    if anonymous {
        "anonymous".to_string()
    } else {
        donor_email.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        assert!(ClaimState::Unclaimed.can_transition_to(ClaimState::Reserved));
        assert!(ClaimState::Unclaimed.can_transition_to(ClaimState::Claimed));
        assert!(ClaimState::Reserved.can_transition_to(ClaimState::Claimed));
        assert!(ClaimState::Reserved.can_transition_to(ClaimState::Unclaimed));
    }

    #[test]
    fn illegal_transitions() {
        // A committed claim never moves again.
        assert!(!ClaimState::Claimed.can_transition_to(ClaimState::Unclaimed));
        assert!(!ClaimState::Claimed.can_transition_to(ClaimState::Reserved));
        // A reservation cannot be re-reserved.
        assert!(!ClaimState::Reserved.can_transition_to(ClaimState::Reserved));
        assert!(!ClaimState::Unclaimed.can_transition_to(ClaimState::Unclaimed));
    }

    #[test]
    fn state_round_trips_through_strings() {
        for state in [
            ClaimState::Unclaimed,
            ClaimState::Reserved,
            ClaimState::Claimed,
        ] {
            assert_eq!(ClaimState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ClaimState::parse("temp_123"), None);
    }

    #[test]
    fn transaction_terminality() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(TransactionStatus::Refunded.is_terminal());
    }

    #[test]
    fn anonymous_donors_are_masked() {
        assert_eq!(claim_owner("jane@example.com", false), "jane@example.com");
        assert_eq!(claim_owner("jane@example.com", true), "anonymous");
    }
}
