//! Notification adapters.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notifier, NotifierError};
use crate::domain::user::Email;

/// Log-based notifier standing in for a mail gateway.
///
/// Emits the reset code to the structured log so operators can relay it
/// in environments without outbound mail. Production deployments replace
/// this with a real delivery channel behind the same port.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_reset_code(&self, email: &Email, code: &str) -> Result<(), NotifierError> {
        info!(email = %email, code, "password reset code issued");
        Ok(())
    }
}
