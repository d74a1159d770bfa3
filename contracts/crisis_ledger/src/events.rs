//! # Events
//!
//! Notifications published by the ledger. Off-chain listeners (see
//! `backend/indexer`) key on the leading topic symbol:
//!
//! | Topic                        | Data               |
//! |------------------------------|--------------------|
//! | `("submitted", report_id)`   | [`ReportSubmitted`]  |
//! | `("approved", report_id)`    | [`ReportApproved`]   |
//! | `("verified", report_id)`    | [`ReportVerified`]   |
//! | `("donated", donation_id)`   | [`DonationReceived`] |
//! | `("trusted", identity)`      | [`TrustUpdated`]     |
//! | `("withdrawn",)`             | [`FundsWithdrawn`]   |
//! | `("admin_set",)`             | [`AdminTransferred`] |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportSubmitted {
    pub report_id: u64,
    pub submitter: Address,
    pub title: String,
    pub content_ref: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportApproved {
    pub report_id: u64,
    pub approver: Address,
    pub approvals: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportVerified {
    pub report_id: u64,
    pub approvals: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DonationReceived {
    pub donation_id: u64,
    pub donor: Address,
    pub amount: i128,
    pub message: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustUpdated {
    pub identity: Address,
    pub trusted: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsWithdrawn {
    pub admin: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferred {
    pub previous: Option<Address>,
    pub new_admin: Address,
}

pub fn emit_report_submitted(
    env: &Env,
    report_id: u64,
    submitter: Address,
    title: String,
    content_ref: String,
) {
    let topics = (symbol_short!("submitted"), report_id);
    let data = ReportSubmitted {
        report_id,
        submitter,
        title,
        content_ref,
    };
    env.events().publish(topics, data);
}

pub fn emit_report_approved(env: &Env, report_id: u64, approver: Address, approvals: u32) {
    let topics = (symbol_short!("approved"), report_id);
    let data = ReportApproved {
        report_id,
        approver,
        approvals,
    };
    env.events().publish(topics, data);
}

pub fn emit_report_verified(env: &Env, report_id: u64, approvals: u32) {
    let topics = (symbol_short!("verified"), report_id);
    env.events().publish(
        topics,
        ReportVerified {
            report_id,
            approvals,
        },
    );
}

pub fn emit_donation_received(
    env: &Env,
    donation_id: u64,
    donor: Address,
    amount: i128,
    message: String,
) {
    let topics = (symbol_short!("donated"), donation_id);
    let data = DonationReceived {
        donation_id,
        donor,
        amount,
        message,
    };
    env.events().publish(topics, data);
}

pub fn emit_trust_updated(env: &Env, identity: Address, trusted: bool) {
    let topics = (symbol_short!("trusted"), identity.clone());
    env.events()
        .publish(topics, TrustUpdated { identity, trusted });
}

pub fn emit_funds_withdrawn(env: &Env, admin: Address, amount: i128) {
    let topics = (symbol_short!("withdrawn"),);
    env.events().publish(topics, FundsWithdrawn { admin, amount });
}

pub fn emit_admin_transferred(env: &Env, previous: Option<Address>, new_admin: Address) {
    let topics = (symbol_short!("admin_set"),);
    env.events()
        .publish(topics, AdminTransferred { previous, new_admin });
}
