//! Password digest adapter.

use sha2::{Digest, Sha256};

use crate::domain::ports::PasswordHasher;

/// SHA-256 digest hasher matching the digests the directory stores.
///
/// The comparison folds over every byte so it cannot short-circuit on
/// the first mismatch.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256PasswordHasher;

impl PasswordHasher for Sha256PasswordHasher {
    fn digest(&self, password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let computed = self.digest(password);
        if computed.len() != digest.len() {
            return false;
        }
        computed
            .bytes()
            .zip(digest.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
