//! Subscription identifier generation.
//!
//! A sid is a short hash of the subscription's identity. Collisions with ids
//! already in use are resolved by re-hashing the candidate together with the
//! name until a free value turns up.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

/// Number of hex characters kept from the digest.
pub const SID_LENGTH: usize = 8;

/// Upper bound on candidates tried before giving up.
pub const MAX_SID_ATTEMPTS: usize = 64;

/// Errors from sid generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SidError {
    #[error("No free sid for '{name}' after {attempts} attempts")]
    Exhausted { name: String, attempts: usize },
}

/// Deterministic short hash of `parts`.
///
/// Parts are separated by a NUL byte so `("ab", "c")` and `("a", "bc")` differ.
pub fn hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(part.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..SID_LENGTH].to_string()
}

/// Derive a sid for `(name, keywords)` that is not in `existing`.
///
/// `keywords` must already be sorted; the caller owns that invariant.
pub fn generate_sid(
    name: &str,
    keywords: &[String],
    existing: &HashSet<String>,
) -> Result<String, SidError> {
    let mut sid = hash(&[name, &keywords.join(",")]);
    for _ in 1..MAX_SID_ATTEMPTS {
        if !existing.contains(&sid) {
            return Ok(sid);
        }
        sid = hash(&[name, &sid]);
    }
    if existing.contains(&sid) {
        return Err(SidError::Exhausted {
            name: name.to_string(),
            attempts: MAX_SID_ATTEMPTS,
        });
    }
    Ok(sid)
}
