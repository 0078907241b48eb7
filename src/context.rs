//! App Context
//!
//! All shared clients are constructed here and handed to the hosting process
//! explicitly; nothing is a module-level singleton.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        catalog::{CatalogService, PgCatalogService},
        customers::{CustomersService, PgCustomersService},
        orders::{OrdersService, PgOrdersService},
    },
    storage::{HttpImageStore, ImageStore, ImageStoreConfig},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub orders: Arc<dyn OrdersService>,
    pub customers: Arc<dyn CustomersService>,
    pub auth: Arc<dyn AuthService>,
    pub images: Arc<dyn ImageStore>,
}

impl AppContext {
    /// Build application context from a database URL and image-store config.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        images: ImageStoreConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool.clone());

        Ok(Self {
            catalog: Arc::new(PgCatalogService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            customers: Arc::new(PgCustomersService::new(db)),
            auth: Arc::new(PgAuthService::new(pool)),
            images: Arc::new(HttpImageStore::new(images)),
        })
    }
}
