//! Catalog service: the reconciler for product writes.
//!
//! Product name is the human-facing identity; the durable identity is the row
//! UUID. The two can drift apart when racing writers leave several rows with
//! one name, so every write path here resolves the name against *all* matching
//! rows and repairs duplicates instead of assuming at most one exists.

use async_trait::async_trait;
use mockall::automock;
use tracing::warn;

use crate::{
    auth::Session,
    database::Db,
    domain::catalog::{
        data::{ProductDraft, ProductWriteRequest, WriteIntent},
        errors::CatalogServiceError,
        records::{ProductRecord, ProductUuid, Verification, WriteOutcome},
        repository::PgCatalogRepository,
    },
    retry::RetryPolicy,
};

/// Outcome of resolving a product name against the stored catalog.
///
/// `Many` is the duplicate-corruption case; keeping it a distinct variant
/// makes the repair branch explicit rather than an inferred length check.
#[derive(Debug, Clone)]
pub enum NameMatch {
    NotFound,
    One(ProductRecord),
    Many(Vec<ProductRecord>),
}

impl NameMatch {
    /// Classify rows returned by a find-by-name lookup.
    ///
    /// Rows are expected in ascending identifier order, so the last element
    /// of `Many` is the canonical (newest) record.
    #[must_use]
    pub fn from_rows(mut rows: Vec<ProductRecord>) -> Self {
        match rows.len() {
            0 => Self::NotFound,
            1 => match rows.pop() {
                Some(row) => Self::One(row),
                None => Self::NotFound,
            },
            _ => Self::Many(rows),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
    retry: RetryPolicy,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_retry(db, RetryPolicy::default())
    }

    #[must_use]
    pub fn with_retry(db: Db, retry: RetryPolicy) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
            retry,
        }
    }

    /// Read-after-write verification: re-read the row by (name, identifier)
    /// until the stored image matches the intended one or the retry budget
    /// runs out. The write has already committed, so a final mismatch is a
    /// soft condition: the caller gets the stored record plus `Unconfirmed`.
    async fn verify_write(
        &self,
        name: &str,
        product: ProductUuid,
        intended_image: Option<&str>,
        written: ProductRecord,
    ) -> Result<WriteOutcome, CatalogServiceError> {
        let mut last_read = self.read_back(name, product).await?;

        if image_matches(last_read.as_ref(), intended_image) {
            return Ok(confirmed(last_read, written));
        }

        for _ in self.retry.delays() {
            self.retry.pause().await;

            last_read = self.read_back(name, product).await?;

            if image_matches(last_read.as_ref(), intended_image) {
                return Ok(confirmed(last_read, written));
            }
        }

        warn!(
            product = %product,
            name,
            "stored image did not match intended value within the retry budget"
        );

        Ok(WriteOutcome {
            product: last_read.unwrap_or(written),
            verification: Verification::Unconfirmed,
        })
    }

    async fn read_back(
        &self,
        name: &str,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get(&mut tx, name, product).await?;

        tx.commit().await?;

        Ok(record)
    }
}

fn confirmed(read: Option<ProductRecord>, written: ProductRecord) -> WriteOutcome {
    WriteOutcome {
        product: read.unwrap_or(written),
        verification: Verification::Confirmed,
    }
}

/// Compare a re-read row's image against the intended value.
///
/// A missing row never matches: the verification read targets the identity
/// that was just written, so absence is itself a divergence.
fn image_matches(read: Option<&ProductRecord>, intended: Option<&str>) -> bool {
    read.is_some_and(|record| record.image.as_deref() == intended)
}

fn require_admin(session: &Session) -> Result<(), CatalogServiceError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(CatalogServiceError::Forbidden)
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn create_or_update(
        &self,
        session: &Session,
        draft: ProductDraft,
    ) -> Result<ProductRecord, CatalogServiceError> {
        require_admin(session)?;

        let attrs = draft.validate()?;

        let mut tx = self.db.begin().await?;

        let rows = self.repository.find_by_name(&mut tx, &attrs.name).await?;

        // Exactly one durable write either way: create when the name is
        // unknown, otherwise overwrite the canonical row and revive it.
        let record = match NameMatch::from_rows(rows) {
            NameMatch::NotFound => {
                self.repository
                    .create(&mut tx, ProductUuid::new(), &attrs)
                    .await?
            }
            NameMatch::One(existing) => {
                self.repository
                    .update(&mut tx, existing.uuid, &attrs, true)
                    .await?
            }
            NameMatch::Many(duplicates) => {
                let canonical = duplicates
                    .last()
                    .map(|record| record.uuid)
                    .ok_or(CatalogServiceError::NotFound)?;

                warn!(
                    name = %attrs.name,
                    count = duplicates.len(),
                    "create-or-update matched duplicate rows; writing canonical only"
                );

                self.repository
                    .update(&mut tx, canonical, &attrs, true)
                    .await?
            }
        };

        tx.commit().await?;

        Ok(record)
    }

    async fn update_by_identity(
        &self,
        session: &Session,
        previous_name: &str,
        draft: ProductDraft,
    ) -> Result<WriteOutcome, CatalogServiceError> {
        require_admin(session)?;

        let attrs = draft.validate()?;

        let mut tx = self.db.begin().await?;

        let rows = self.repository.find_by_name(&mut tx, previous_name).await?;

        let matched = match NameMatch::from_rows(rows) {
            NameMatch::NotFound => return Err(CatalogServiceError::NotFound),
            NameMatch::One(record) => vec![record],
            NameMatch::Many(records) => records,
        };

        // Rename conflict check happens before any write: the target name
        // must not belong to an active row outside the matched set.
        if attrs.name != previous_name {
            let taken = self
                .repository
                .find_active_by_name(&mut tx, &attrs.name)
                .await?
                .into_iter()
                .any(|other| matched.iter().all(|m| m.uuid != other.uuid));

            if taken {
                return Err(CatalogServiceError::Conflict);
            }
        }

        tx.commit().await?;

        if matched.len() > 1 {
            warn!(
                previous_name,
                count = matched.len(),
                "repairing duplicate product rows"
            );
        }

        // Every matched duplicate gets the same update, each in its own
        // transaction. A failure mid-loop leaves earlier rows updated; that
        // partial repair is surfaced as the propagated error, not rolled back.
        let mut written: Option<ProductRecord> = None;

        for record in &matched {
            let mut tx = self.db.begin().await?;

            let updated = self
                .repository
                .update(&mut tx, record.uuid, &attrs, false)
                .await?;

            tx.commit().await?;

            written = Some(updated);
        }

        let written = written.ok_or(CatalogServiceError::NotFound)?;

        // Canonical row: numerically greatest identifier among the matches.
        // `find_by_name` orders ascending, so that is the last one written.
        let canonical = written.uuid;

        self.verify_write(&attrs.name, canonical, attrs.image.as_deref(), written)
            .await
    }

    async fn deactivate(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<(), CatalogServiceError> {
        require_admin(session)?;

        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.deactivate_by_name(&mut tx, name).await?;

        if rows_affected == 0 {
            return Err(CatalogServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<ProductRecord>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_active(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }
}

/// Resolve an inbound write request into the operation it asks for and run it.
///
/// A request whose `nombreOriginal` differs from `name` dispatches to the
/// rename path; anything else is a create-or-update. The create path returns
/// the stored row directly, so its outcome is confirmed by construction.
///
/// # Errors
///
/// Propagates the error of the dispatched operation.
pub async fn apply_write_request<S>(
    service: &S,
    session: &Session,
    request: ProductWriteRequest,
) -> Result<WriteOutcome, CatalogServiceError>
where
    S: CatalogService + ?Sized,
{
    match WriteIntent::from(request) {
        WriteIntent::CreateOrUpdate(draft) => {
            let product = service.create_or_update(session, draft).await?;

            Ok(WriteOutcome {
                product,
                verification: Verification::Confirmed,
            })
        }
        WriteIntent::UpdateByIdentity {
            previous_name,
            draft,
        } => {
            service
                .update_by_identity(session, &previous_name, draft)
                .await
        }
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Create the product when the name is unknown, otherwise overwrite the
    /// existing record's attributes and revive it. Admin only.
    async fn create_or_update(
        &self,
        session: &Session,
        draft: ProductDraft,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Apply an edit (possibly a rename) to the record(s) currently known by
    /// `previous_name`, repairing same-named duplicates along the way, then
    /// verify the write by reading it back. Admin only.
    async fn update_by_identity(
        &self,
        session: &Session,
        previous_name: &str,
        draft: ProductDraft,
    ) -> Result<WriteOutcome, CatalogServiceError>;

    /// Soft-delete the active record(s) with the given name. Admin only.
    async fn deactivate(&self, session: &Session, name: &str)
    -> Result<(), CatalogServiceError>;

    /// All active products, most recently modified first. Unrestricted.
    async fn list_active(&self) -> Result<Vec<ProductRecord>, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn draft(name: &str, price: &str, stock: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: "Granos".to_string(),
            price: price.to_string(),
            stock: stock.to_string(),
            image: None,
            description: None,
            unit: None,
        }
    }

    #[test]
    fn name_match_classifies_row_counts() {
        let row = |uuid: ProductUuid| ProductRecord {
            uuid,
            name: "x".to_string(),
            category: "c".to_string(),
            price: 1.0,
            stock: 1,
            image: None,
            description: None,
            unit: None,
            active: true,
            created_at: jiff::Timestamp::UNIX_EPOCH,
            updated_at: jiff::Timestamp::UNIX_EPOCH,
        };

        assert!(matches!(NameMatch::from_rows(vec![]), NameMatch::NotFound));
        assert!(matches!(
            NameMatch::from_rows(vec![row(ProductUuid::new())]),
            NameMatch::One(_)
        ));
        assert!(matches!(
            NameMatch::from_rows(vec![row(ProductUuid::new()), row(ProductUuid::new())]),
            NameMatch::Many(_)
        ));
    }

    #[test]
    fn image_matches_requires_a_row() {
        assert!(
            !image_matches(None, None),
            "a missing row is a divergence even when no image was intended"
        );
    }

    #[test]
    fn image_matches_compares_stored_against_intended() {
        let record = ProductRecord {
            uuid: ProductUuid::new(),
            name: "x".to_string(),
            category: "c".to_string(),
            price: 1.0,
            stock: 1,
            image: Some("https://img.example.com/a.webp".to_string()),
            description: None,
            unit: None,
            active: true,
            created_at: jiff::Timestamp::UNIX_EPOCH,
            updated_at: jiff::Timestamp::UNIX_EPOCH,
        };

        assert!(image_matches(
            Some(&record),
            Some("https://img.example.com/a.webp")
        ));
        assert!(!image_matches(Some(&record), Some("https://other")));
        assert!(!image_matches(Some(&record), None));
    }

    #[tokio::test]
    async fn create_or_update_creates_missing_product() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("Arroz 5kg", "12.50", "40"))
            .await?;

        assert_eq!(product.name, "Arroz 5kg");
        assert_eq!(product.price, 12.5);
        assert_eq!(product.stock, 40);
        assert!(product.active);

        Ok(())
    }

    #[tokio::test]
    async fn create_or_update_overwrites_existing_by_name() -> TestResult {
        let ctx = TestContext::new().await;

        let first = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("Arroz 5kg", "12.50", "40"))
            .await?;

        let second = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("Arroz 5kg", "13.00", "35"))
            .await?;

        assert_eq!(second.uuid, first.uuid, "same name must hit the same row");
        assert_eq!(second.price, 13.0);
        assert_eq!(second.stock, 35);

        Ok(())
    }

    #[tokio::test]
    async fn create_or_update_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;

        let once = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("Harina", "8.00", "12"))
            .await?;

        let twice = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("Harina", "8.00", "12"))
            .await?;

        assert_eq!(twice.uuid, once.uuid);
        assert_eq!(twice.price, once.price);
        assert_eq!(twice.stock, once.stock);
        assert_eq!(twice.image, once.image);

        Ok(())
    }

    #[tokio::test]
    async fn create_or_update_revives_deactivated_product() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Azucar", "5.00", "10"))
            .await?;

        ctx.catalog.deactivate(&ctx.admin, "Azucar").await?;

        let revived = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("Azucar", "5.50", "20"))
            .await?;

        assert!(revived.active);
        assert_eq!(revived.price, 5.5);

        let listed = ctx.catalog.list_active().await?;

        assert!(
            listed.iter().any(|p| p.name == "Azucar"),
            "revived product should be listed again"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_or_update_rejects_non_admin() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .create_or_update(&ctx.customer, draft("Arroz 5kg", "12.50", "40"))
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_or_update_rejects_invalid_price_before_writing() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("Arroz 5kg", "abc", "40"))
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::Validation { field: "price", .. })),
            "expected price validation error, got {result:?}"
        );

        assert!(
            ctx.catalog.list_active().await?.is_empty(),
            "nothing should have been written"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_by_identity_renames_and_edits() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Aroz 5kg", "12.50", "40"))
            .await?;

        let outcome = ctx
            .catalog
            .update_by_identity(&ctx.admin, "Aroz 5kg", draft("Arroz 5kg", "13.00", "38"))
            .await?;

        assert_eq!(outcome.product.name, "Arroz 5kg");
        assert_eq!(outcome.product.price, 13.0);
        assert_eq!(outcome.verification, Verification::Confirmed);

        let listed = ctx.catalog.list_active().await?;

        assert!(listed.iter().any(|p| p.name == "Arroz 5kg"));
        assert!(!listed.iter().any(|p| p.name == "Aroz 5kg"));

        Ok(())
    }

    #[tokio::test]
    async fn update_by_identity_unknown_name_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .update_by_identity(&ctx.admin, "Nada", draft("Algo", "1.00", "1"))
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_by_identity_repairs_every_duplicate() -> TestResult {
        let ctx = TestContext::new().await;

        // Seed duplicate-name corruption directly; the service never creates
        // duplicates itself.
        let dup_a = ctx.seed_product("Fideos", "Pastas", 4.0, 10, true).await;
        let dup_b = ctx.seed_product("Fideos", "Pastas", 4.5, 12, true).await;
        let dup_c = ctx.seed_product("Fideos", "Pastas", 5.0, 14, true).await;

        let outcome = ctx
            .catalog
            .update_by_identity(&ctx.admin, "Fideos", draft("Fideos 500g", "6.00", "30"))
            .await?;

        assert_eq!(
            outcome.product.uuid,
            dup_a.max(dup_b).max(dup_c),
            "canonical record must be the one with the greatest identifier"
        );
        assert_eq!(outcome.verification, Verification::Confirmed);

        // No row was left stale under either name.
        for uuid in [dup_a, dup_b, dup_c] {
            let row = ctx.fetch_product(uuid).await;

            assert_eq!(row.name, "Fideos 500g", "row {uuid} was left stale");
            assert_eq!(row.price, 6.0);
            assert_eq!(row.stock, 30);
        }

        Ok(())
    }

    #[tokio::test]
    async fn rename_onto_taken_name_is_conflict_without_mutation() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("A", "1.00", "1"))
            .await?;

        let b = ctx
            .catalog
            .create_or_update(&ctx.admin, draft("B", "2.00", "2"))
            .await?;

        let result = ctx
            .catalog
            .update_by_identity(&ctx.admin, "B", draft("A", "9.00", "9"))
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::Conflict)),
            "expected Conflict, got {result:?}"
        );

        let stored = ctx.fetch_product(b.uuid).await;

        assert_eq!(stored.name, "B", "B must be unchanged after the conflict");
        assert_eq!(stored.price, 2.0);
        assert_eq!(stored.stock, 2);

        Ok(())
    }

    #[tokio::test]
    async fn rename_onto_own_previous_name_is_allowed() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Lentejas", "3.00", "5"))
            .await?;

        // Same-name edit through the rename path: no conflict with itself.
        let outcome = ctx
            .catalog
            .update_by_identity(&ctx.admin, "Lentejas", draft("Lentejas", "3.25", "8"))
            .await?;

        assert_eq!(outcome.product.price, 3.25);

        Ok(())
    }

    #[tokio::test]
    async fn stored_image_divergence_is_reported_as_unconfirmed() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Yerba", "7.00", "15"))
            .await?;

        // A meddling cache layer that rewrites image URLs on every update,
        // so the stored value can never match the intended one.
        sqlx::raw_sql(
            "CREATE FUNCTION rewrite_image() RETURNS trigger AS $$
             BEGIN
                 NEW.image := 'https://cdn.example.com/cached.webp';
                 RETURN NEW;
             END;
             $$ LANGUAGE plpgsql;
             CREATE TRIGGER rewrite_image_trg BEFORE UPDATE ON products
                 FOR EACH ROW EXECUTE FUNCTION rewrite_image();",
        )
        .execute(ctx.db.pool())
        .await?;

        let mut edited = draft("Yerba", "7.50", "15");
        edited.image = Some("https://img.example.com/yerba.webp".to_string());

        let outcome = ctx
            .catalog
            .update_by_identity(&ctx.admin, "Yerba", edited)
            .await?;

        assert!(
            !outcome.verification.is_confirmed(),
            "exhausted verification must surface as Unconfirmed, not an error"
        );
        assert_eq!(
            outcome.product.image.as_deref(),
            Some("https://cdn.example.com/cached.webp"),
            "outcome must carry the actually-stored image, not the intended one"
        );

        Ok(())
    }

    #[tokio::test]
    async fn write_request_with_changed_original_name_renames() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Aroz 5kg", "12.50", "40"))
            .await?;

        let request: ProductWriteRequest = serde_json::from_value(serde_json::json!({
            "name": "Arroz 5kg",
            "categoria": "Granos",
            "precio": "13.00",
            "stock": "38",
            "nombreOriginal": "Aroz 5kg",
        }))?;

        let outcome = apply_write_request(&ctx.catalog, &ctx.admin, request).await?;

        assert_eq!(outcome.product.name, "Arroz 5kg");
        assert_eq!(outcome.product.price, 13.0);

        let listed = ctx.catalog.list_active().await?;

        assert!(listed.iter().any(|p| p.name == "Arroz 5kg"));
        assert!(!listed.iter().any(|p| p.name == "Aroz 5kg"));

        Ok(())
    }

    #[tokio::test]
    async fn write_request_without_original_name_creates() -> TestResult {
        let ctx = TestContext::new().await;

        let request: ProductWriteRequest = serde_json::from_value(serde_json::json!({
            "name": "Polenta",
            "categoria": "Granos",
            "precio": "3.20",
            "stock": "25",
        }))?;

        let outcome = apply_write_request(&ctx.catalog, &ctx.admin, request).await?;

        assert_eq!(outcome.product.name, "Polenta");
        assert!(outcome.verification.is_confirmed());

        Ok(())
    }

    #[tokio::test]
    async fn deactivate_hides_product_from_listing() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Sal", "1.00", "100"))
            .await?;

        ctx.catalog.deactivate(&ctx.admin, "Sal").await?;

        let listed = ctx.catalog.list_active().await?;

        assert!(
            !listed.iter().any(|p| p.name == "Sal"),
            "deactivated product must not be listed"
        );

        Ok(())
    }

    #[tokio::test]
    async fn deactivate_unknown_name_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.deactivate(&ctx.admin, "Nada").await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_active_orders_by_most_recently_modified() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Primero", "1.00", "1"))
            .await?;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Segundo", "2.00", "2"))
            .await?;

        // Touch the first one again so it becomes the most recent.
        ctx.catalog
            .create_or_update(&ctx.admin, draft("Primero", "1.10", "1"))
            .await?;

        let listed = ctx.catalog.list_active().await?;
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names.first().copied(), Some("Primero"));

        Ok(())
    }

    #[tokio::test]
    async fn list_active_never_contains_inactive_rows() -> TestResult {
        let ctx = TestContext::new().await;

        // Seeded directly as inactive, with the freshest updated_at.
        ctx.seed_product("Fantasma", "Nada", 1.0, 1, false).await;

        ctx.catalog
            .create_or_update(&ctx.admin, draft("Real", "2.00", "2"))
            .await?;

        let listed = ctx.catalog.list_active().await?;

        assert!(
            !listed.iter().any(|p| p.name == "Fantasma"),
            "inactive row must never surface in List-Active"
        );

        Ok(())
    }

    #[tokio::test]
    async fn mock_catalog_service_is_usable_by_consumers() {
        let mut mock = MockCatalogService::new();

        mock.expect_list_active().returning(|| Ok(Vec::new()));

        let listed = mock.list_active().await;

        assert!(matches!(listed, Ok(ref v) if v.is_empty()));
    }
}
