//! # Admin — administrator identity and trusted-reporter set
//!
//! The ledger has exactly one privileged identity, the administrator.
//! It alone may change the trust set, withdraw held donations, and hand the
//! role over to another address.
//!
//! ## Storage layout
//!
//! - `DataKey::Admin` → `Address` — the current administrator.
//! - `DataKey::Trusted(addr)` → `bool` — present only while `addr` is trusted.
//!
//! ## Event emissions
//!
//! | Event topic prefix | Trigger |
//! |--------------------|---------|
//! | `admin_set`        | `init`, `transfer_admin` |
//! | `trusted`          | `set_trusted` |
//!
//! Trust grants approval rights only. Submitting and donating are open to
//! every identity.

use soroban_sdk::{Address, Env};

use crate::{events, storage, Error};

// ─────────────────────────────────────────────────────────
// Initialisation
// ─────────────────────────────────────────────────────────

/// Set the first administrator. Panics with `Error::AlreadyInitialized`
/// if an administrator already exists.
pub fn init_admin(env: &Env, admin: &Address) {
    if storage::has_admin(env) {
        panic_with_error_admin(env, Error::AlreadyInitialized);
    }
    storage::set_admin(env, admin);
    events::emit_admin_transferred(env, None, admin.clone());
}

/// Read the administrator. Panics with `Error::NotInitialized` before `init`.
pub fn get_admin(env: &Env) -> Address {
    match storage::get_admin(env) {
        Some(admin) => admin,
        None => panic_with_error_admin(env, Error::NotInitialized),
    }
}

// ─────────────────────────────────────────────────────────
// Access guards
// ─────────────────────────────────────────────────────────

/// Assert that `caller` is the administrator and has signed the invocation.
pub fn require_admin(env: &Env, caller: &Address) {
    caller.require_auth();
    if *caller != get_admin(env) {
        panic_with_error_admin(env, Error::NotAuthorized);
    }
}

/// Assert that `identity` is a trusted reporter.
#[inline]
pub fn require_trusted(env: &Env, identity: &Address) {
    if !storage::is_trusted(env, identity) {
        panic_with_error_admin(env, Error::NotTrusted);
    }
}

// ─────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────

/// Hand the administrator role to `new_admin`. The previous administrator
/// loses every privilege immediately.
pub fn transfer_admin(env: &Env, current: &Address, new_admin: &Address) {
    require_admin(env, current);
    storage::set_admin(env, new_admin);
    events::emit_admin_transferred(env, Some(current.clone()), new_admin.clone());
}

/// Overwrite the trust flag for `identity`. No history is kept.
pub fn set_trusted(env: &Env, caller: &Address, identity: &Address, trusted: bool) {
    require_admin(env, caller);
    storage::set_trusted(env, identity, trusted);
    events::emit_trust_updated(env, identity.clone(), trusted);
}

/// Thin wrapper so the guards can raise contract errors without the macro.
#[inline(always)]
fn panic_with_error_admin(env: &Env, err: Error) -> ! {
    soroban_sdk::panic_with_error!(env, err)
}
