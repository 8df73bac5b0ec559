//! Port for password digest computation.
//!
//! The hashing scheme is an external concern; the domain only needs to
//! produce and compare digests through this seam.

/// Computes and verifies password digests.
pub trait PasswordHasher: Send + Sync {
    /// Digest a plaintext password for storage.
    fn digest(&self, password: &str) -> String;

    /// Whether `password` matches a stored digest.
    fn verify(&self, password: &str, digest: &str) -> bool;
}
