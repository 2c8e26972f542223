//! Shared helpers for classifying Diesel errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// True when the error is a unique-constraint violation.
///
/// Both the `(book, number)` pair on pages and the user email column rely on
/// database constraints; the repositories translate this class of failure
/// into their duplicate variants.
pub(super) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
