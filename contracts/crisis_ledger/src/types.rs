//! # Types
//!
//! Records owned by the crisis ledger.
//!
//! ## Config / State split
//!
//! A [`Report`] is stored as two separate ledger entries:
//!
//! - [`ReportConfig`] — written once at submission; never mutated.
//! - [`ReportState`] — rewritten on every approval.
//!
//! The public API returns the reconstructed [`Report`].
//!
//! ### Verification as a one-way switch
//!
//! ```text
//! Unverified ──(3rd distinct approval)──► Verified
//! ```
//!
//! `approvers` only grows and `verified` never flips back.
//!
//! [`Donation`] records are written once and never touched again.

use soroban_sdk::{contracttype, Address, Map, String, Vec};

/// Immutable report fields, written once at submission.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportConfig {
    pub id: u64,
    pub submitter: Address,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_hash: String,
    pub content_ref: String,
    pub created_at: u64,
}

/// Mutable report state, updated on each approval.
///
/// `approvers` is keyed by identity so membership is unique by construction.
/// The value is the ledger timestamp of the approval.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportState {
    pub verified: bool,
    pub approvers: Map<Address, u64>,
}

/// Full view of a crisis report.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    /// Sequential identifier, starting at 0.
    pub id: u64,
    /// Identity that submitted the report.
    pub submitter: Address,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Content-addressed pointer to the report image (may be empty).
    pub image_hash: String,
    /// Content-addressed pointer to the full report payload (may be empty).
    pub content_ref: String,
    /// Ledger timestamp at submission.
    pub created_at: u64,
    /// `true` once `approvers` reached the verification threshold.
    pub verified: bool,
    /// Distinct trusted identities that endorsed this report.
    pub approvers: Vec<Address>,
}

impl Report {
    pub fn from_parts(config: ReportConfig, state: ReportState) -> Self {
        Report {
            id: config.id,
            submitter: config.submitter,
            title: config.title,
            description: config.description,
            location: config.location,
            image_hash: config.image_hash,
            content_ref: config.content_ref,
            created_at: config.created_at,
            verified: state.verified,
            approvers: state.approvers.keys(),
        }
    }
}

/// A recorded donation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Donation {
    pub id: u64,
    pub donor: Address,
    /// Amount in settlement-token base units; always positive.
    pub amount: i128,
    pub message: String,
    pub created_at: u64,
}
