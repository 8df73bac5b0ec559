//! Bus pass record.
//!
//! One pass per user, created lazily the first time a route is selected or
//! a payment is attempted. Activation is the only field the system toggles
//! automatically; everything else is caller-driven.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::route_schedule::RouteName;
use crate::domain::user::UserId;

/// Whether the pass is currently usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassStatus {
    Active,
    Inactive,
}

impl PassStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    /// Parse the storage representation, defaulting unknown values to
    /// inactive so a corrupted row can never grant access.
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "ACTIVE" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

/// A user's bus pass.
///
/// ## Invariants
/// - At most one pass per user (storage-enforced unique `user_id`).
/// - A freshly created pass is inactive with no selected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusPass {
    pub id: Uuid,
    pub user_id: UserId,
    pub selected_route: Option<RouteName>,
    pub status: PassStatus,
}

impl BusPass {
    /// New inactive pass for `user_id` with no route selected.
    pub fn new_inactive(user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            selected_route: None,
            status: PassStatus::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PassStatus::Active
    }

    pub fn activate(&mut self) {
        self.status = PassStatus::Active;
    }

    pub fn deactivate(&mut self) {
        self.status = PassStatus::Inactive;
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_pass_starts_inactive_with_no_route() {
        let pass = BusPass::new_inactive(UserId::random());
        assert!(!pass.is_active());
        assert!(pass.selected_route.is_none());
    }

    #[rstest]
    fn activation_is_idempotent() {
        let mut pass = BusPass::new_inactive(UserId::random());
        pass.activate();
        pass.activate();
        assert!(pass.is_active());
        pass.deactivate();
        pass.deactivate();
        assert!(!pass.is_active());
    }

    #[rstest]
    #[case("ACTIVE", PassStatus::Active)]
    #[case("INACTIVE", PassStatus::Inactive)]
    #[case("garbage", PassStatus::Inactive)]
    fn status_parses_leniently(#[case] raw: &str, #[case] expected: PassStatus) {
        assert_eq!(PassStatus::parse_lenient(raw), expected);
    }
}
