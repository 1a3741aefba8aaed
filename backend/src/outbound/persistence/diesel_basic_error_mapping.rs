//! Shared Diesel error mapping for the lunch repositories.
//!
//! Every repository port exposes `connection` and `query` constructors; these
//! helpers translate pool and Diesel failures into them without leaking SQL
//! details into messages returned to callers.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
pub(super) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violated")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            query("referenced record does not exist")
        }
        _ => query("database error"),
    }
}

/// Whether `error` is a unique violation, optionally of one named constraint.
pub(super) fn is_unique_violation(error: &DieselError, constraint: Option<&str>) -> bool {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            constraint.is_none_or(|name| info.constraint_name() == Some(name))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(&'static str),
    }

    struct Info {
        constraint: Option<&'static str>,
    }

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { constraint }))
    }

    #[rstest]
    #[case(DieselError::NotFound, Mapped::Query("record not found"))]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection, None),
        Mapped::Connection("database connection error")
    )]
    #[case(
        database_error(DatabaseErrorKind::UniqueViolation, None),
        Mapped::Query("unique constraint violated")
    )]
    fn diesel_errors_map_to_constructors(#[case] error: DieselError, #[case] expected: Mapped) {
        let mapped = map_basic_diesel_error(error, Mapped::Query, Mapped::Connection);
        assert_eq!(mapped, expected);
    }

    #[test]
    fn pool_errors_map_to_connection() {
        let mapped: String = map_basic_pool_error(PoolError::checkout("timed out"), |m| m);
        assert_eq!(mapped, "timed out");
    }

    #[test]
    fn unique_violation_can_match_a_named_constraint() {
        let error = database_error(DatabaseErrorKind::UniqueViolation, Some("posts_key"));
        assert!(is_unique_violation(&error, None));
        assert!(is_unique_violation(&error, Some("posts_key")));
        assert!(!is_unique_violation(&error, Some("other_key")));
        assert!(!is_unique_violation(&DieselError::NotFound, None));
    }
}
