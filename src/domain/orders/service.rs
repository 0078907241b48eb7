//! Orders service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::Session,
    database::Db,
    domain::{
        customers::repository::PgCustomersRepository,
        orders::{
            data::NewOrder,
            errors::OrdersServiceError,
            records::{OrderRecord, OrderStatus, OrderUuid},
            repository::PgOrdersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
    customers: PgCustomersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
            customers: PgCustomersRepository::new(),
        }
    }

    async fn transition_from_pending(
        &self,
        session: &Session,
        order: OrderUuid,
        target: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        require_admin(session)?;

        let mut tx = self.db.begin().await?;

        let current = self
            .repository
            .get_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if current.status != OrderStatus::Pending {
            return Err(OrdersServiceError::InvalidTransition {
                current: current.status,
            });
        }

        let updated = self
            .repository
            .set_status_from_pending(&mut tx, order, target)
            .await?
            .ok_or(OrdersServiceError::InvalidTransition {
                current: current.status,
            })?;

        tx.commit().await?;

        Ok(updated)
    }
}

fn require_admin(session: &Session) -> Result<(), OrdersServiceError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(OrdersServiceError::Forbidden)
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn place_order(
        &self,
        session: &Session,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        require_admin(session)?;

        let total = order.total();

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .create_order(
                &mut tx,
                OrderUuid::new(),
                &order.customer_name,
                total,
                &order.lines,
            )
            .await?;

        // The denormalized per-customer order count is recomputed in the same
        // transaction as any change to the order set.
        self.customers
            .recount_orders_for_name(&mut tx, &order.customer_name)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .get_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_orders(&mut tx).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn complete_order(
        &self,
        session: &Session,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        self.transition_from_pending(session, order, OrderStatus::Completed)
            .await
    }

    async fn cancel_order(
        &self,
        session: &Session,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        self.transition_from_pending(session, order, OrderStatus::Cancelled)
            .await
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Record a new pending order and recompute the owning customer's
    /// denormalized order count. Admin only.
    async fn place_order(
        &self,
        session: &Session,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order with its line items.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// All orders, newest first, each with its line items.
    async fn list_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Move a pending order to completed. Admin only.
    async fn complete_order(
        &self,
        session: &Session,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Move a pending order to cancelled (terminal). Admin only.
    async fn cancel_order(
        &self,
        session: &Session,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
