//! Catalog service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// No record matches the identity used for the operation.
    #[error("product not found")]
    NotFound,

    /// The rename target name is already taken by another active record.
    #[error("name already in use")]
    Conflict,

    /// A required field is missing or unparseable. Reported before any write.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    /// The caller does not hold the administrative role.
    #[error("administrative role required")]
    Forbidden,

    /// Any persistence fault not otherwise classified.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl CatalogServiceError {
    #[must_use]
    pub const fn validation(field: &'static str, message: &'static str) -> Self {
        Self::Validation { field, message }
    }
}

impl From<Error> for CatalogServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Conflict,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => {
                Self::validation("record", "violates a storage constraint")
            }
            _ => Self::Sql(error),
        }
    }
}
