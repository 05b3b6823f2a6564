//! Cryptographic helpers used when assembling and checking wire structures.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of the given data.
///
/// WebAuthn uses this digest for the relying party id hash at the head of
/// the authenticator data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}
