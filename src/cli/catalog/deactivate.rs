use clap::Args;
use stockroom_app::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::catalog::{CatalogService, PgCatalogService},
};

#[derive(Debug, Args)]
pub(crate) struct DeactivateArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Staff bearer token with the administrative role
    #[arg(long, env = "STOCKROOM_TOKEN", hide_env_values = true)]
    token: String,

    /// Product name to soft-delete
    #[arg(long)]
    name: String,
}

pub(crate) async fn run(args: DeactivateArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let session = PgAuthService::new(pool.clone())
        .authenticate_bearer(&args.token)
        .await
        .map_err(|error| format!("authentication failed: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    service
        .deactivate(&session, &args.name)
        .await
        .map_err(|error| format!("failed to deactivate product: {error}"))?;

    println!("deactivated: {}", args.name);

    Ok(())
}
