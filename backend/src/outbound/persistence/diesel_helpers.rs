//! Shared failure classification for Diesel repository implementations.
//!
//! Each adapter maps a [`DbFailure`] into its own port error enum, so the
//! Diesel-specific matching lives in one place and the per-port mapping
//! stays a one-screen `match`.

use tracing::debug;

use super::pool::PoolError;

/// Backend-neutral classification of a failed database operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DbFailure {
    /// Connection could not be established or was lost.
    Connection(String),
    /// Query or mutation failed during execution.
    Query(String),
    /// A unique constraint rejected the write.
    UniqueViolation {
        constraint: Option<String>,
        message: String,
    },
    /// `first()` style lookup found no row.
    NotFound,
}

impl DbFailure {
    /// Whether this violation names the given constraint.
    pub(super) fn violates(&self, name: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation {
                constraint: Some(constraint),
                ..
            } if constraint == name
        )
    }
}

/// Extract the message from a pool error; both variants mean the
/// database was unreachable.
pub(super) fn classify_pool_error(error: PoolError) -> DbFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DbFailure::Connection(message)
        }
    }
}

/// Classify a Diesel error, logging the raw failure for diagnosis.
pub(super) fn classify_diesel_error(error: diesel::result::Error) -> DbFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(
            error_type = %std::any::type_name_of_val(other),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DbFailure::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
                message: info.message().to_owned(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DbFailure::Connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => DbFailure::Query(info.message().to_owned()),
        other => DbFailure::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_classify_as_connection_failures() {
        let failure = classify_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(
            failure,
            DbFailure::Connection("connection refused".to_owned())
        );
    }

    #[rstest]
    fn missing_row_classifies_as_not_found() {
        let failure = classify_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(failure, DbFailure::NotFound);
    }

    #[rstest]
    fn query_builder_failure_classifies_as_query() {
        let failure = classify_diesel_error(diesel::result::Error::QueryBuilderError(
            "bad query".into(),
        ));
        assert!(matches!(failure, DbFailure::Query(_)));
    }

    #[rstest]
    #[case(Some("payments_paid_slot_unique".to_owned()), true)]
    #[case(Some("users_email_key".to_owned()), false)]
    #[case(None, false)]
    fn violation_matching_is_by_constraint_name(
        #[case] constraint: Option<String>,
        #[case] expected: bool,
    ) {
        let failure = DbFailure::UniqueViolation {
            constraint,
            message: "duplicate key value".to_owned(),
        };
        assert_eq!(failure.violates("payments_paid_slot_unique"), expected);
    }
}
