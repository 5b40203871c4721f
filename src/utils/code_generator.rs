//! Short code generation and validation.
//!
//! Codes are 7 characters drawn uniformly from the 62-symbol alphanumeric
//! alphabet, giving 62^7 (about 3.5 * 10^12) possible codes. That keeps the
//! collision probability low enough for optimistic generate-and-verify; the
//! storage layer's unique index is the authoritative backstop.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Length of every short code, on the wire and in storage.
pub const CODE_LENGTH: usize = 7;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Wire-format invariant: exactly 7 alphanumeric characters, case-sensitive.
static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]{7}$").unwrap());

/// Generates one candidate short code.
///
/// Pure function of no persisted state; uniqueness is the caller's problem.
/// The thread-local RNG is identifier-grade, not a cryptographic secret.
pub fn generate_code() -> String {
    let mut rng = rand::rng();

    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

/// Checks whether a path segment is a well-formed short code.
///
/// Used by the redirect dispatcher to reject malformed codes before any
/// store lookup happens.
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}
