//! Customers service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::Session,
    database::Db,
    domain::customers::{
        data::is_valid_email,
        errors::CustomersServiceError,
        records::{CustomerRecord, CustomerUuid},
        repository::PgCustomersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    repository: PgCustomersRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCustomersRepository::new(),
        }
    }
}

fn require_admin(session: &Session) -> Result<(), CustomersServiceError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(CustomersServiceError::Forbidden)
    }
}

#[async_trait]
impl CustomersService for PgCustomersService {
    async fn register<'a>(
        &self,
        session: &Session,
        name: &str,
        email: &str,
        phone: Option<&'a str>,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        require_admin(session)?;

        if !is_valid_email(email) {
            return Err(CustomersServiceError::InvalidEmail);
        }

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .create_customer(&mut tx, CustomerUuid::new(), name, email, phone)
            .await?;

        // Orders may predate registration; start from the true count rather
        // than zero.
        self.repository.recount_orders_for_name(&mut tx, name).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<CustomerRecord>, CustomersServiceError> {
        let mut tx = self.db.begin().await?;

        let customers = self.repository.list_customers(&mut tx).await?;

        tx.commit().await?;

        Ok(customers)
    }

    async fn remove(
        &self,
        session: &Session,
        customer: CustomerUuid,
    ) -> Result<(), CustomersServiceError> {
        require_admin(session)?;

        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_customer(&mut tx, customer).await?;

        if rows_affected == 0 {
            return Err(CustomersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CustomersService: Send + Sync {
    /// Register a customer after validating the email shape. Admin only.
    async fn register<'a>(
        &self,
        session: &Session,
        name: &str,
        email: &str,
        phone: Option<&'a str>,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// All customers, newest registration first.
    async fn list(&self) -> Result<Vec<CustomerRecord>, CustomersServiceError>;

    /// Delete a customer. Admin only.
    async fn remove(
        &self,
        session: &Session,
        customer: CustomerUuid,
    ) -> Result<(), CustomersServiceError>;
}
