use clap::Args;
use stockroom_app::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::catalog::{CatalogService, PgCatalogService, data::ProductDraft},
};

#[derive(Debug, Args)]
pub(crate) struct UpsertArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Staff bearer token with the administrative role
    #[arg(long, env = "STOCKROOM_TOKEN", hide_env_values = true)]
    token: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    category: String,

    #[arg(long)]
    price: String,

    #[arg(long)]
    stock: String,

    /// Stable image URL, as returned by `catalog upload-image`
    #[arg(long)]
    image: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    unit: Option<String>,
}

pub(crate) async fn run(args: UpsertArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let session = PgAuthService::new(pool.clone())
        .authenticate_bearer(&args.token)
        .await
        .map_err(|error| format!("authentication failed: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    let product = service
        .create_or_update(
            &session,
            ProductDraft {
                name: args.name,
                category: args.category,
                price: args.price,
                stock: args.stock,
                image: args.image,
                description: args.description,
                unit: args.unit,
            },
        )
        .await
        .map_err(|error| format!("failed to write product: {error}"))?;

    println!("{} {}", product.uuid, product.name);

    Ok(())
}
