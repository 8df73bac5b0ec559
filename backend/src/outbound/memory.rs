//! In-memory OTP store.
//!
//! A process-local TTL map keyed by email. Sufficient for a single
//! instance; a multi-instance deployment swaps in a shared store behind
//! the same port.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::ports::{OtpStore, OtpStoreError};
use crate::domain::user::Email;

struct OtpEntry {
    code: String,
    expires_at: Instant,
}

/// Process-local implementation of the `OtpStore` port.
#[derive(Default)]
pub struct InMemoryOtpStore {
    entries: Mutex<HashMap<String, OtpEntry>>,
}

impl InMemoryOtpStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, OtpEntry>>, OtpStoreError> {
        self.entries
            .lock()
            .map_err(|_| OtpStoreError::unavailable("otp store lock poisoned"))
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, email: &Email, code: &str, ttl: Duration) -> Result<(), OtpStoreError> {
        let mut entries = self.lock()?;
        entries.insert(
            email.as_ref().to_owned(),
            OtpEntry {
                code: code.to_owned(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn verify(&self, email: &Email, code: &str) -> Result<bool, OtpStoreError> {
        let mut entries = self.lock()?;
        match entries.get(email.as_ref()) {
            Some(entry) if entry.expires_at <= Instant::now() => {
                entries.remove(email.as_ref());
                Ok(false)
            }
            Some(entry) => Ok(entry.code == code),
            None => Ok(false),
        }
    }

    async fn clear(&self, email: &Email) -> Result<(), OtpStoreError> {
        let mut entries = self.lock()?;
        entries.remove(email.as_ref());
        Ok(())
    }
}
