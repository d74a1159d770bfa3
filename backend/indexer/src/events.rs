//! Canonical event types emitted by the crisis ledger contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/crisis_ledger/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the crisis ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new crisis report was submitted (`submitted` topic).
    ReportSubmitted,
    /// A trusted reporter approved a report (`approved` topic).
    ReportApproved,
    /// A report reached the verification threshold (`verified` topic).
    ReportVerified,
    /// A donation was recorded (`donated` topic).
    DonationReceived,
    /// The administrator changed a reporter's trust flag (`trusted` topic).
    TrustUpdated,
    /// Held donations were withdrawn (`withdrawn` topic).
    FundsWithdrawn,
    /// The administrator role was assigned (`admin_set` topic).
    AdminTransferred,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

/// What the second topic of an event identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Report,
    Donation,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Donation => "donation",
        }
    }
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "submitted" => Self::ReportSubmitted,
            "approved" => Self::ReportApproved,
            "verified" => Self::ReportVerified,
            "donated" => Self::DonationReceived,
            "trusted" => Self::TrustUpdated,
            "withdrawn" => Self::FundsWithdrawn,
            "admin_set" => Self::AdminTransferred,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReportSubmitted => "report_submitted",
            Self::ReportApproved => "report_approved",
            Self::ReportVerified => "report_verified",
            Self::DonationReceived => "donation_received",
            Self::TrustUpdated => "trust_updated",
            Self::FundsWithdrawn => "funds_withdrawn",
            Self::AdminTransferred => "admin_transferred",
            Self::Unknown => "unknown",
        }
    }

    /// The record kind named by the event's second topic, if any.
    pub fn subject(&self) -> Option<SubjectKind> {
        match self {
            Self::ReportSubmitted | Self::ReportApproved | Self::ReportVerified => {
                Some(SubjectKind::Report)
            }
            Self::DonationReceived => Some(SubjectKind::Donation),
            _ => None,
        }
    }
}

/// A fully decoded ledger event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub event_type: String,
    pub subject_kind: Option<String>,
    pub subject_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    /// Kind-specific extra: report title, donation message, approval count,
    /// trust flag, or previous admin.
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub subject_kind: Option<String>,
    pub subject_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
