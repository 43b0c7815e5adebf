//! Shared Diesel error mapping for the repository adapters.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error.
pub(super) fn map_pool_error_with<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// `NotFound` maps to a query error here; repositories that distinguish
/// absent rows handle `NotFound` before delegating.
pub(super) fn map_diesel_error_with<E>(
    error: diesel::result::Error,
    query: impl Fn(&'static str) -> E,
    connection: impl Fn(&'static str) -> E,
) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

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
        _ => query("database error"),
    }
}
