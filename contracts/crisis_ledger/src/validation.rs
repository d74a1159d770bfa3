//! Input checks for user-supplied text.

use soroban_sdk::{panic_with_error, Env, String};

use crate::Error;

/// Upper bound, in bytes, for every text field stored by the ledger.
pub const MAX_TEXT_LEN: u32 = 2048;

/// Panics with `Error::TextTooLong` if `text` exceeds [`MAX_TEXT_LEN`].
pub fn require_within_limit(env: &Env, text: &String) {
    if text.len() > MAX_TEXT_LEN {
        panic_with_error!(env, Error::TextTooLong);
    }
}

/// Panics with `err` if `text` is empty or whitespace only.
/// Also enforces [`MAX_TEXT_LEN`].
pub fn require_non_blank(env: &Env, text: &String, err: Error) {
    require_within_limit(env, text);
    if is_blank(text) {
        panic_with_error!(env, err);
    }
}

/// `true` when `text` has no byte outside ASCII whitespace.
/// Callers must have checked the length against [`MAX_TEXT_LEN`].
fn is_blank(text: &String) -> bool {
    let len = text.len() as usize;
    let mut buf = [0u8; MAX_TEXT_LEN as usize];
    let bytes = &mut buf[..len];
    text.copy_into_slice(bytes);
    bytes.iter().all(|b| b.is_ascii_whitespace())
}
