//! Small helpers

use sha2::{Digest, Sha256};

/// Digest a user identifier before it crosses the store boundary
///
/// The store only needs a stable opaque token per account; the account id
/// itself never leaves the process in clear form. An optional salt lets
/// deployments keep digests unlinkable across applications.
pub fn user_digest(salt: Option<&str>, user_id: &str) -> String {
    let mut hasher = Sha256::new();
    if let Some(salt) = salt {
        hasher.update(salt.as_bytes());
        hasher.update(b"|");
    }
    hasher.update(user_id.as_bytes());
    hex::encode(hasher.finalize())
}
