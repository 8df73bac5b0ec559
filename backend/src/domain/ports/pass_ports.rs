//! Driving ports for bus pass operations.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::payment::PaymentStatusSummary;
use crate::domain::route_schedule::RouteName;
use crate::domain::user::UserId;

/// Everything a client needs to render a pass, including the textual
/// payload it encodes as a QR image (image generation is a client
/// concern).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassView {
    pub holder_name: String,
    pub holder_email: String,
    pub selected_route: Option<RouteName>,
    pub summary: PaymentStatusSummary,
}

impl PassView {
    /// Text rendered into the pass QR code by clients.
    pub fn qr_payload(&self) -> String {
        let status = if self.summary.pass_active {
            "ACTIVE"
        } else {
            "INACTIVE"
        };
        format!(
            "Name: {}\nEmail: {}\nStatus: {status}",
            self.holder_name, self.holder_email
        )
    }
}

/// Mutations against a user's pass.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PassCommand: Send + Sync {
    /// Select (or change) the route on the user's pass, creating the pass
    /// when absent. Fails with Conflict when paid records lock the user
    /// to a different route.
    async fn select_route(&self, user_id: &UserId, route: RouteName) -> Result<(), Error>;
}

/// Read-only pass queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PassQuery: Send + Sync {
    /// Snapshot of the user's pass and settlement progress.
    async fn pass_view(&self, user_id: &UserId) -> Result<PassView, Error>;
}

/// Fixture command: accepts any selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePassCommand;

#[async_trait]
impl PassCommand for FixturePassCommand {
    async fn select_route(&self, _user_id: &UserId, _route: RouteName) -> Result<(), Error> {
        Ok(())
    }
}

/// Fixture query: an anonymous, inactive pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePassQuery;

#[async_trait]
impl PassQuery for FixturePassQuery {
    async fn pass_view(&self, _user_id: &UserId) -> Result<PassView, Error> {
        Ok(PassView {
            holder_name: String::new(),
            holder_email: String::new(),
            selected_route: None,
            summary: PaymentStatusSummary::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn qr_payload_reflects_activation() {
        let mut view = PassView {
            holder_name: "Ada Lovelace".to_owned(),
            holder_email: "ada@campus.edu".to_owned(),
            selected_route: None,
            summary: PaymentStatusSummary::default(),
        };
        assert!(view.qr_payload().ends_with("Status: INACTIVE"));

        view.summary.pass_active = true;
        let payload = view.qr_payload();
        assert!(payload.contains("Name: Ada Lovelace"));
        assert!(payload.contains("Email: ada@campus.edu"));
        assert!(payload.ends_with("Status: ACTIVE"));
    }
}
