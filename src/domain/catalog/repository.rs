//! Catalog Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::catalog::{
    data::ProductAttrs,
    records::{ProductRecord, ProductUuid},
};

const FIND_BY_NAME_SQL: &str = include_str!("sql/find_by_name.sql");
const FIND_ACTIVE_BY_NAME_SQL: &str = include_str!("sql/find_active_by_name.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DEACTIVATE_BY_NAME_SQL: &str = include_str!("sql/deactivate_by_name.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const LIST_ACTIVE_SQL: &str = include_str!("sql/list_active.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// All rows carrying `name`, active or not, in identifier order.
    ///
    /// Returning every row is what makes duplicate detection possible.
    pub(crate) async fn find_by_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(FIND_BY_NAME_SQL)
            .bind(name)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_by_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(FIND_ACTIVE_BY_NAME_SQL)
            .bind(name)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        attrs: &ProductAttrs,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(&attrs.name)
            .bind(&attrs.category)
            .bind(attrs.price)
            .bind(i64::from(attrs.stock))
            .bind(attrs.image.as_deref())
            .bind(attrs.description.as_deref())
            .bind(attrs.unit.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    /// Overwrite the attributes of one row. When `force_active` is set the
    /// row is also revived; otherwise its active flag is left as-is.
    pub(crate) async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        attrs: &ProductAttrs,
        force_active: bool,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(&attrs.name)
            .bind(&attrs.category)
            .bind(attrs.price)
            .bind(i64::from(attrs.stock))
            .bind(attrs.image.as_deref())
            .bind(attrs.description.as_deref())
            .bind(attrs.unit.as_deref())
            .bind(force_active)
            .fetch_one(&mut **tx)
            .await
    }

    /// Soft-delete every active row carrying `name`; returns rows affected.
    pub(crate) async fn deactivate_by_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_BY_NAME_SQL)
            .bind(name)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// The verification read: fetch one row by (name, identifier).
    pub(crate) async fn get(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(name)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_ACTIVE_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let stock_i64: i64 = row.try_get("stock")?;

        let stock = u32::try_from(stock_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "stock".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            price: row.try_get("price")?,
            stock,
            image: row.try_get("image")?,
            description: row.try_get("description")?,
            unit: row.try_get("unit")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
