//! Customers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::customers::records::{CustomerRecord, CustomerUuid};

const CREATE_CUSTOMER_SQL: &str = include_str!("sql/create_customer.sql");
const LIST_CUSTOMERS_SQL: &str = include_str!("sql/list_customers.sql");
const DELETE_CUSTOMER_SQL: &str = include_str!("sql/delete_customer.sql");
const RECOUNT_CUSTOMER_ORDERS_SQL: &str = include_str!("sql/recount_customer_orders.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCustomersRepository;

impl PgCustomersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<CustomerRecord, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(CREATE_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .bind(name)
            .bind(email)
            .bind(phone)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_customers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CustomerRecord>, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(LIST_CUSTOMERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CUSTOMER_SQL)
            .bind(customer.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Recompute the denormalized order count for the customer with `name`.
    ///
    /// A no-op when no customer carries the name; attribution is by exact
    /// name match only.
    pub(crate) async fn recount_orders_for_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<(), sqlx::Error> {
        query(RECOUNT_CUSTOMER_ORDERS_SQL)
            .bind(name)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let count_i64: i64 = row.try_get("orders_count")?;

        let orders_count = u32::try_from(count_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "orders_count".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: CustomerUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            registered_at: row.try_get::<SqlxTimestamp, _>("registered_at")?.to_jiff(),
            orders_count,
        })
    }
}
