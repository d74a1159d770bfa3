//! # Crisis Ledger Contract
//!
//! Registry of citizen crisis reports and relief donations. Reports move from
//! unverified to verified once [`VERIFICATION_THRESHOLD`] distinct trusted
//! reporters approve them; donations accumulate into a running total that the
//! administrator may withdraw.
//!
//! | Phase        | Entry Point(s)                                        |
//! |--------------|-------------------------------------------------------|
//! | Bootstrap    | [`CrisisLedger::init`]                                |
//! | Admin        | `set_trusted`, `transfer_admin`, `withdraw`           |
//! | Reporting    | [`CrisisLedger::submit_report`]                       |
//! | Verification | [`CrisisLedger::verify_report`]                       |
//! | Funding      | [`CrisisLedger::donate`]                              |
//! | Queries      | `get_report`, `list_reports`, `list_donations`, ...   |
//!
//! ## Architecture
//!
//! Administrator and trust checks live in [`admin`]. Storage access lives in
//! `storage`. Every failing entry point panics with an [`Error`] code and the
//! host discards all of its writes and events.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, token, Address, Env, String, Vec,
};

pub mod admin;
pub mod events;
mod storage;
mod types;
mod validation;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

use types::{ReportConfig, ReportState};
pub use types::{Donation, Report};
pub use validation::MAX_TEXT_LEN;

/// Distinct approvals required before a report is marked verified.
pub const VERIFICATION_THRESHOLD: u32 = 3;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    EmptyTitle = 3,
    EmptyDescription = 4,
    TextTooLong = 5,
    InvalidAmount = 6,
    ReportNotFound = 7,
    DonationNotFound = 8,
    NotAuthorized = 9,
    NotTrusted = 10,
    SelfVerification = 11,
    DuplicateVerification = 12,
    NothingToWithdraw = 13,
    Overflow = 14,
}

#[contract]
pub struct CrisisLedger;

#[contractimpl]
impl CrisisLedger {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the ledger.
    ///
    /// Must be called exactly once after deployment; a second call panics
    /// with `Error::AlreadyInitialized`.
    ///
    /// - `admin` becomes the administrator and must sign the transaction.
    /// - `settlement_token` is the token donations are paid in.
    pub fn init(env: Env, admin: Address, settlement_token: Address) {
        admin.require_auth();
        admin::init_admin(&env, &admin);
        storage::set_settlement_token(&env, &settlement_token);
    }

    // ─────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────

    /// Set or clear the trusted-reporter flag for `identity`.
    ///
    /// - `caller` must be the administrator.
    pub fn set_trusted(env: Env, caller: Address, identity: Address, trusted: bool) {
        admin::set_trusted(&env, &caller, &identity, trusted);
    }

    /// Hand the administrator role to `new_admin`.
    pub fn transfer_admin(env: Env, caller: Address, new_admin: Address) {
        admin::transfer_admin(&env, &caller, &new_admin);
    }

    /// Transfer every held donation to the administrator.
    ///
    /// - `caller` must be the administrator.
    /// - Panics with `Error::NothingToWithdraw` when nothing is held.
    ///
    /// `total_donated` is left untouched; only the held balance is zeroed.
    pub fn withdraw(env: Env, caller: Address) -> i128 {
        admin::require_admin(&env, &caller);

        let amount = storage::held_balance(&env);
        if amount <= 0 {
            panic_with_error!(&env, Error::NothingToWithdraw);
        }

        let token_client = token::Client::new(&env, &Self::require_settlement_token(&env));
        token_client.transfer(&env.current_contract_address(), &caller, &amount);
        storage::set_held_balance(&env, 0);

        events::emit_funds_withdrawn(&env, caller, amount);
        amount
    }

    // ─────────────────────────────────────────────────────────
    // Reports
    // ─────────────────────────────────────────────────────────

    /// Submit a new crisis report and return its id.
    ///
    /// Open to any identity. `title` and `description` must contain
    /// non-whitespace text; `image_hash` and `content_ref` may be empty.
    pub fn submit_report(
        env: Env,
        submitter: Address,
        title: String,
        description: String,
        location: String,
        image_hash: String,
        content_ref: String,
    ) -> u64 {
        submitter.require_auth();

        validation::require_non_blank(&env, &title, Error::EmptyTitle);
        validation::require_non_blank(&env, &description, Error::EmptyDescription);
        validation::require_within_limit(&env, &location);
        validation::require_within_limit(&env, &image_hash);
        validation::require_within_limit(&env, &content_ref);

        let Some(id) = storage::next_report_id(&env) else {
            panic_with_error!(&env, Error::Overflow)
        };

        let config = ReportConfig {
            id,
            submitter: submitter.clone(),
            title: title.clone(),
            description,
            location,
            image_hash,
            content_ref: content_ref.clone(),
            created_at: env.ledger().timestamp(),
        };
        storage::save_new_report(&env, &config);
        storage::push_submitter_report(&env, &submitter, id);

        events::emit_report_submitted(&env, id, submitter, title, content_ref);
        id
    }

    /// Record `approver`'s endorsement of report `report_id`.
    ///
    /// Checks, in order: the report exists, `approver` is trusted, `approver`
    /// is not the submitter, `approver` has not already approved. The report
    /// becomes verified when its approver count reaches
    /// [`VERIFICATION_THRESHOLD`].
    pub fn verify_report(env: Env, report_id: u64, approver: Address) {
        approver.require_auth();

        let (config, mut state) = Self::require_report(&env, report_id);
        admin::require_trusted(&env, &approver);

        if approver == config.submitter {
            panic_with_error!(&env, Error::SelfVerification);
        }
        if state.approvers.contains_key(approver.clone()) {
            panic_with_error!(&env, Error::DuplicateVerification);
        }

        state
            .approvers
            .set(approver.clone(), env.ledger().timestamp());
        let approvals = state.approvers.len();

        let newly_verified = !state.verified && approvals >= VERIFICATION_THRESHOLD;
        if newly_verified {
            state.verified = true;
        }
        storage::save_report_state(&env, report_id, &state);

        events::emit_report_approved(&env, report_id, approver, approvals);
        if newly_verified {
            events::emit_report_verified(&env, report_id, approvals);
        }
    }

    pub fn get_report(env: Env, id: u64) -> Report {
        let (config, state) = Self::require_report(&env, id);
        Report::from_parts(config, state)
    }

    /// All reports ordered by id.
    pub fn list_reports(env: Env) -> Vec<Report> {
        let mut reports = Vec::new(&env);
        for id in 0..storage::report_count(&env) {
            reports.push_back(Self::get_report(env.clone(), id));
        }
        reports
    }

    /// Ids of the reports submitted by `submitter`, in submission order.
    pub fn reports_by_submitter(env: Env, submitter: Address) -> Vec<u64> {
        storage::reports_by_submitter(&env, &submitter)
    }

    pub fn report_count(env: Env) -> u64 {
        storage::report_count(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Donations
    // ─────────────────────────────────────────────────────────

    /// Pay `amount` of the settlement token into the ledger and record it.
    ///
    /// Open to any identity. Returns the new donation id.
    pub fn donate(env: Env, donor: Address, amount: i128, message: String) -> u64 {
        donor.require_auth();

        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        validation::require_within_limit(&env, &message);

        let Some(total) = storage::total_donated(&env).checked_add(amount) else {
            panic_with_error!(&env, Error::Overflow)
        };
        let Some(held) = storage::held_balance(&env).checked_add(amount) else {
            panic_with_error!(&env, Error::Overflow)
        };
        let Some(id) = storage::next_donation_id(&env) else {
            panic_with_error!(&env, Error::Overflow)
        };

        let token_client = token::Client::new(&env, &Self::require_settlement_token(&env));
        token_client.transfer(&donor, &env.current_contract_address(), &amount);

        let donation = Donation {
            id,
            donor: donor.clone(),
            amount,
            message: message.clone(),
            created_at: env.ledger().timestamp(),
        };
        storage::save_donation(&env, &donation);
        storage::push_donor_donation(&env, &donor, id);
        storage::set_total_donated(&env, total);
        storage::set_held_balance(&env, held);

        events::emit_donation_received(&env, id, donor, amount, message);
        id
    }

    pub fn get_donation(env: Env, id: u64) -> Donation {
        match storage::load_donation(&env, id) {
            Some(donation) => donation,
            None => panic_with_error!(&env, Error::DonationNotFound),
        }
    }

    /// All donations ordered by id.
    pub fn list_donations(env: Env) -> Vec<Donation> {
        let mut donations = Vec::new(&env);
        for id in 0..storage::donation_count(&env) {
            donations.push_back(Self::get_donation(env.clone(), id));
        }
        donations
    }

    /// Ids of the donations made by `donor`, in donation order.
    pub fn donations_by_donor(env: Env, donor: Address) -> Vec<u64> {
        storage::donations_by_donor(&env, &donor)
    }

    pub fn donation_count(env: Env) -> u64 {
        storage::donation_count(&env)
    }

    /// Sum of every recorded donation. Never decreases.
    pub fn total_donated(env: Env) -> i128 {
        storage::total_donated(&env)
    }

    /// Donated funds currently held by the contract, awaiting withdrawal.
    pub fn held_balance(env: Env) -> i128 {
        storage::held_balance(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Trust and configuration queries
    // ─────────────────────────────────────────────────────────

    pub fn is_trusted(env: Env, identity: Address) -> bool {
        storage::is_trusted(&env, &identity)
    }

    pub fn get_admin(env: Env) -> Address {
        admin::get_admin(&env)
    }

    pub fn settlement_token(env: Env) -> Address {
        Self::require_settlement_token(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────

    fn require_report(env: &Env, id: u64) -> (ReportConfig, ReportState) {
        match storage::load_report_pair(env, id) {
            Some(pair) => pair,
            None => panic_with_error!(env, Error::ReportNotFound),
        }
    }

    fn require_settlement_token(env: &Env) -> Address {
        match storage::get_settlement_token(env) {
            Some(token) => token,
            None => panic_with_error!(env, Error::NotInitialized),
        }
    }
}
