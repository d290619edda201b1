//! Diesel and pool error mapping for the document store adapter.

use tracing::debug;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

/// Pool failures always surface as connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> DocumentStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DocumentStoreError::connection(message)
        }
    }
}

/// Map Diesel errors into document store errors.
///
/// Database messages are logged at debug level and replaced by a generic
/// message so SQL details never reach HTTP clients.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> DocumentStoreError {
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
        DieselError::NotFound => DocumentStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => DocumentStoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentStoreError::connection("database connection error")
        }
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            DocumentStoreError::query("document encoding error")
        }
        _ => DocumentStoreError::query("database error"),
    }
}
