//! Classification helpers for PostgreSQL constraint violations.

/// Returns `true` if `e` is a unique violation on any constraint.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Returns `true` if `e` is a foreign key violation.
///
/// Raised when a token that still owns URLs is deleted.
pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}
