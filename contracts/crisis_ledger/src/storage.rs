//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the ledger.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key               | Type      | Description                          |
//! |-------------------|-----------|--------------------------------------|
//! | `Admin`           | `Address` | Ledger administrator                 |
//! | `SettlementToken` | `Address` | Token donations are paid in          |
//! | `ReportCount`     | `u64`     | Next report id                       |
//! | `DonationCount`   | `u64`     | Next donation id                     |
//! | `TotalDonated`    | `i128`    | Sum of all recorded donations        |
//! | `HeldBalance`     | `i128`    | Donated funds not yet withdrawn      |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                      | Type           | Description                   |
//! |--------------------------|----------------|-------------------------------|
//! | `ReportConfig(id)`       | `ReportConfig` | Immutable report fields       |
//! | `ReportState(id)`        | `ReportState`  | Verification flag + approvers |
//! | `Donation(id)`           | `Donation`     | Donation record               |
//! | `Trusted(addr)`          | `bool`         | Trusted-reporter flag         |
//! | `SubmitterReports(addr)` | `Vec<u64>`     | Report ids by submitter       |
//! | `DonorDonations(addr)`   | `Vec<u64>`     | Donation ids by donor         |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Map, Vec};

use crate::types::{Donation, ReportConfig, ReportState};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    SettlementToken,
    ReportCount,
    DonationCount,
    TotalDonated,
    HeldBalance,
    ReportConfig(u64),
    ReportState(u64),
    Donation(u64),
    Trusted(Address),
    SubmitterReports(Address),
    DonorDonations(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Option<Address> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    bump_instance(env);
}

pub fn get_settlement_token(env: &Env) -> Option<Address> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::SettlementToken)
}

pub fn set_settlement_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::SettlementToken, token);
    bump_instance(env);
}

pub fn report_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::ReportCount)
        .unwrap_or(0)
}

pub fn donation_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::DonationCount)
        .unwrap_or(0)
}

/// Reads the report counter and stores `current + 1`.
/// Returns the id for the new report, or `None` on counter overflow.
pub fn next_report_id(env: &Env) -> Option<u64> {
    let current = report_count(env);
    let next = current.checked_add(1)?;
    env.storage().instance().set(&DataKey::ReportCount, &next);
    Some(current)
}

/// Same as [`next_report_id`] for the donation counter.
pub fn next_donation_id(env: &Env) -> Option<u64> {
    let current = donation_count(env);
    let next = current.checked_add(1)?;
    env.storage().instance().set(&DataKey::DonationCount, &next);
    Some(current)
}

pub fn total_donated(env: &Env) -> i128 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::TotalDonated)
        .unwrap_or(0)
}

pub fn set_total_donated(env: &Env, total: i128) {
    env.storage().instance().set(&DataKey::TotalDonated, &total);
}

pub fn held_balance(env: &Env) -> i128 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::HeldBalance)
        .unwrap_or(0)
}

pub fn set_held_balance(env: &Env, balance: i128) {
    env.storage().instance().set(&DataKey::HeldBalance, &balance);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn load_persistent<T>(env: &Env, key: DataKey) -> Option<T>
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value: Option<T> = env.storage().persistent().get(&key);
    if value.is_some() {
        bump_persistent(env, &key);
    }
    value
}

fn save_persistent<T>(env: &Env, key: DataKey, value: &T)
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(&key, value);
    bump_persistent(env, &key);
}

/// Save the immutable config and the initial (unverified, no approvers) state.
pub fn save_new_report(env: &Env, config: &ReportConfig) {
    let state = ReportState {
        verified: false,
        approvers: Map::new(env),
    };
    save_persistent(env, DataKey::ReportConfig(config.id), config);
    save_persistent(env, DataKey::ReportState(config.id), &state);
}

pub fn load_report_config(env: &Env, id: u64) -> Option<ReportConfig> {
    load_persistent(env, DataKey::ReportConfig(id))
}

pub fn load_report_state(env: &Env, id: u64) -> Option<ReportState> {
    load_persistent(env, DataKey::ReportState(id))
}

/// Load config and state together. `None` if the report does not exist.
pub fn load_report_pair(env: &Env, id: u64) -> Option<(ReportConfig, ReportState)> {
    let config = load_report_config(env, id)?;
    let state = load_report_state(env, id)?;
    Some((config, state))
}

pub fn save_report_state(env: &Env, id: u64, state: &ReportState) {
    save_persistent(env, DataKey::ReportState(id), state);
}

pub fn save_donation(env: &Env, donation: &Donation) {
    save_persistent(env, DataKey::Donation(donation.id), donation);
}

pub fn load_donation(env: &Env, id: u64) -> Option<Donation> {
    load_persistent(env, DataKey::Donation(id))
}

// ── Trust set ────────────────────────────────────────────────────────

pub fn is_trusted(env: &Env, identity: &Address) -> bool {
    load_persistent(env, DataKey::Trusted(identity.clone())).unwrap_or(false)
}

/// Distrust removes the entry; an absent entry reads as `false`.
pub fn set_trusted(env: &Env, identity: &Address, trusted: bool) {
    let key = DataKey::Trusted(identity.clone());
    if trusted {
        save_persistent(env, key, &true);
    } else {
        env.storage().persistent().remove(&key);
    }
}

// ── Secondary indexes ────────────────────────────────────────────────

pub fn reports_by_submitter(env: &Env, submitter: &Address) -> Vec<u64> {
    load_persistent(env, DataKey::SubmitterReports(submitter.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn push_submitter_report(env: &Env, submitter: &Address, report_id: u64) {
    let mut ids = reports_by_submitter(env, submitter);
    ids.push_back(report_id);
    save_persistent(env, DataKey::SubmitterReports(submitter.clone()), &ids);
}

pub fn donations_by_donor(env: &Env, donor: &Address) -> Vec<u64> {
    load_persistent(env, DataKey::DonorDonations(donor.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn push_donor_donation(env: &Env, donor: &Address, donation_id: u64) {
    let mut ids = donations_by_donor(env, donor);
    ids.push_back(donation_id);
    save_persistent(env, DataKey::DonorDonations(donor.clone()), &ids);
}
