//! Content fingerprinting for deduplication.
//!
//! A fingerprint is the hex-encoded SHA-256 of an update's trimmed title
//! concatenated with its trimmed link. Title + link tolerates formatting
//! churn elsewhere on the page while still treating genuinely distinct
//! items as distinct. The function is pure and seed-free: the same title
//! and link produce the same fingerprint in every run, on every machine.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Compute the dedup fingerprint for an update.
///
/// Inputs are whitespace-trimmed before hashing; case is preserved.
/// Returns 64 lowercase hex characters.
pub fn fingerprint(title: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.trim().as_bytes());
    hasher.update(link.trim().as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
