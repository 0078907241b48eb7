//! Orders service errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::orders::records::OrderStatus;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    /// The order is not in a state that permits the requested transition.
    #[error("order is {current}, transition not permitted", current = .current.as_str())]
    InvalidTransition { current: OrderStatus },

    /// The caller does not hold the administrative role.
    #[error("administrative role required")]
    Forbidden,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
