use clap::Args;
use stockroom_app::{
    database::{self, Db},
    domain::catalog::{CatalogService, PgCatalogService},
};

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    let products = service
        .list_active()
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    for product in products {
        println!(
            "{} {} [{}] price={} stock={}",
            product.uuid, product.name, product.category, product.price, product.stock
        );
    }

    Ok(())
}
