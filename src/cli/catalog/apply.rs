use std::path::PathBuf;

use clap::Args;
use stockroom_app::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::catalog::{PgCatalogService, apply_write_request, data::ProductWriteRequest},
};

#[derive(Debug, Args)]
pub(crate) struct ApplyArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Staff bearer token with the administrative role
    #[arg(long, env = "STOCKROOM_TOKEN", hide_env_values = true)]
    token: String,

    /// Path to a JSON write request, in the admin-console field names
    #[arg(long)]
    file: PathBuf,
}

pub(crate) async fn run(args: ApplyArgs) -> Result<(), String> {
    let raw = std::fs::read_to_string(&args.file)
        .map_err(|error| format!("failed to read {}: {error}", args.file.display()))?;

    let request: ProductWriteRequest = serde_json::from_str(&raw)
        .map_err(|error| format!("failed to parse write request: {error}"))?;

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let session = PgAuthService::new(pool.clone())
        .authenticate_bearer(&args.token)
        .await
        .map_err(|error| format!("authentication failed: {error}"))?;

    let service = PgCatalogService::new(Db::new(pool));

    let outcome = apply_write_request(&service, &session, request)
        .await
        .map_err(|error| format!("failed to apply write request: {error}"))?;

    if outcome.verification.is_confirmed() {
        println!("{} {}", outcome.product.uuid, outcome.product.name);
    } else {
        println!(
            "{} {} (stored image unconfirmed; inspect the record)",
            outcome.product.uuid, outcome.product.name
        );
    }

    Ok(())
}
