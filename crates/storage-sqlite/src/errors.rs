//! Storage-specific error types for SQLite operations.
//!
//! This module wraps Diesel and r2d2 errors and converts them to the two
//! failure kinds the ledger exposes: constraint violations (bad input, never
//! retried) and storage unavailability (everything else, retryable).

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use ledger_core::errors::Error;
use thiserror::Error;

/// Storage-specific errors that wrap Diesel and r2d2 types.
///
/// These errors are internal to the storage layer and are converted to
/// `ledger_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be decoded into its domain type.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("{0}")]
    Core(Error),
}

/// Lets writer jobs return core errors through the transaction wrapper
/// without losing their classification.
impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::Core(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::QueryFailed(DieselError::DatabaseError(kind, info))
                if is_constraint(&kind) =>
            {
                Error::ConstraintViolation(info.message().to_string())
            }
            StorageError::Core(e) => e,
            other => Error::StorageUnavailable(other.to_string()),
        }
    }
}

fn is_constraint(kind: &DatabaseErrorKind) -> bool {
    matches!(
        kind,
        DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation
    )
}

/// Extension trait for easily converting Diesel Results to core Results.
///
/// This provides a `.into_core()` method on any `Result<T, diesel::result::Error>`
/// which handles the conversion through StorageError.
pub trait IntoCore<T> {
    fn into_core(self) -> ledger_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> ledger_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> ledger_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Info(&'static str);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
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
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, message: &'static str) -> StorageError {
        StorageError::QueryFailed(DieselError::DatabaseError(kind, Box::new(Info(message))))
    }

    #[test]
    fn test_check_violation_is_constraint() {
        let err: Error = db_error(
            DatabaseErrorKind::CheckViolation,
            "CHECK constraint failed: symbol <> ''",
        )
        .into();
        assert!(err.is_constraint_violation());
        assert!(err.to_string().contains("symbol <> ''"));
    }

    #[test]
    fn test_not_null_and_unique_are_constraints() {
        let err: Error = db_error(DatabaseErrorKind::NotNullViolation, "NOT NULL").into();
        assert!(err.is_constraint_violation());
        let err: Error = db_error(DatabaseErrorKind::UniqueViolation, "UNIQUE").into();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_other_database_errors_are_unavailable() {
        let err: Error = db_error(DatabaseErrorKind::Unknown, "database is locked").into();
        assert!(matches!(err, Error::StorageUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_io_error_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = StorageError::from(io).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: Error =
            StorageError::from(Error::ConstraintViolation("empty symbol".to_string())).into();
        assert!(err.is_constraint_violation());
    }
}
