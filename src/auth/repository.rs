//! Auth Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::auth::models::{Role, StaffTokenRecord, StaffTokenUuid};

const CREATE_STAFF_TOKEN_SQL: &str = include_str!("sql/create_staff_token.sql");
const FIND_ACTIVE_TOKEN_BY_HASH_SQL: &str = include_str!("sql/find_active_token_by_hash.sql");
const REVOKE_STAFF_TOKEN_SQL: &str = include_str!("sql/revoke_staff_token.sql");
const LIST_STAFF_TOKENS_SQL: &str = include_str!("sql/list_staff_tokens.sql");

#[derive(Debug, Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_staff_token(
        &self,
        uuid: StaffTokenUuid,
        username: &str,
        role: Role,
        token_hash: &str,
    ) -> Result<StaffTokenRecord, sqlx::Error> {
        query_as::<Postgres, StaffTokenRecord>(CREATE_STAFF_TOKEN_SQL)
            .bind(uuid.into_uuid())
            .bind(username)
            .bind(role.as_str())
            .bind(token_hash)
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn find_active_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<StaffTokenRecord>, sqlx::Error> {
        query_as::<Postgres, StaffTokenRecord>(FIND_ACTIVE_TOKEN_BY_HASH_SQL)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn revoke_staff_token(
        &self,
        uuid: StaffTokenUuid,
    ) -> Result<Option<StaffTokenRecord>, sqlx::Error> {
        query_as::<Postgres, StaffTokenRecord>(REVOKE_STAFF_TOKEN_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn list_staff_tokens(&self) -> Result<Vec<StaffTokenRecord>, sqlx::Error> {
        query_as::<Postgres, StaffTokenRecord>(LIST_STAFF_TOKENS_SQL)
            .fetch_all(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for StaffTokenRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role_text: String = row.try_get("role")?;

        let role = role_text
            .parse::<Role>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "role".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: StaffTokenUuid::from_uuid(row.try_get("uuid")?),
            username: row.try_get("username")?,
            role,
            token_hash: row.try_get("token_hash")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
